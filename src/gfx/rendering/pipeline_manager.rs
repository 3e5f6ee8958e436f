//! Render pipeline management for wgpu
//!
//! Shaders are loaded once by name, pipeline configurations are registered
//! up front and compiled together by [`PipelineManager::create_all_pipelines`].

use std::{collections::HashMap, sync::Arc};

use log::{debug, error};
use wgpu::*;

use crate::gfx::{
    resources::material::{Material, Side},
    scene::vertex::Vertex3D,
};

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub depth_write: bool,
    pub depth_bias: DepthBiasState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    /// Depth-only pipelines have no fragment stage
    pub vertex_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "shader.wgsl".to_string(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(Face::Back),
            depth_format: None,
            depth_write: true,
            depth_bias: DepthBiasState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8UnormSrgb,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            vertex_only: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_vertex_only(mut self) -> Self {
        self.vertex_only = true;
        self.color_targets = Vec::new();
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against a buffer of the given format
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Transparent surfaces test against depth but do not write it
    pub fn without_depth_write(mut self) -> Self {
        self.depth_write = false;
        self
    }

    /// Slope-scaled bias to keep lit surfaces from shadowing themselves
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        self.depth_bias = DepthBiasState {
            constant,
            slope_scale,
            clamp: 0.0,
        };
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }
}

/// Names of the scene pipelines, one per cull/blend combination
pub mod names {
    pub const SHADOW: &str = "Shadow";
    pub const PHONG: &str = "Phong";
    pub const PHONG_DOUBLE_SIDED: &str = "PhongDoubleSided";
    pub const PHONG_TRANSPARENT: &str = "PhongTransparent";
    pub const PHONG_TRANSPARENT_DOUBLE_SIDED: &str = "PhongTransparentDoubleSided";
}

/// Scene pipeline a material is drawn with
pub fn pipeline_for(material: &Material) -> &'static str {
    match (material.is_transparent(), material.side) {
        (false, Side::Front) => names::PHONG,
        (false, Side::Double) => names::PHONG_DOUBLE_SIDED,
        (true, Side::Front) => names::PHONG_TRANSPARENT,
        (true, Side::Double) => names::PHONG_TRANSPARENT_DOUBLE_SIDED,
    }
}

/// Manages render pipelines and the shader modules they are built from
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Registers a pipeline configuration without creating it
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pending_pipelines.push(name.to_string());
    }

    /// Loads and compiles a WGSL shader module
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shader_modules.insert(name.to_string(), shader_module);
    }

    /// Returns a created pipeline
    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Creates all pending pipelines
    ///
    /// Failed pipelines are logged and reported; they stay pending.
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let pending = std::mem::take(&mut self.pending_pipelines);

        for name in pending {
            let Some(config) = self.pipeline_configs.get(&name) else {
                continue;
            };
            match self.create_pipeline_from_config(&name, config) {
                Ok(pipeline) => {
                    debug!("Created pipeline '{}'", name);
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => {
                    error!("Failed to create pipeline '{}': {}", name, e);
                    errors.push(format!("Pipeline '{}': {}", name, e));
                    self.pending_pipelines.push(name);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, String> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| format!("Shader '{}' not found", config.shader))?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        let fragment_state = (!config.vertex_only).then(|| FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &config.color_targets,
            compilation_options: PipelineCompilationOptions::default(),
        });

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: config.depth_write,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        });

        Ok(self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: fragment_state,
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            }))
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending_pipelines.len(),
            loaded_shaders: self.shader_modules.len(),
        }
    }
}

/// Statistics about pipeline manager state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub loaded_shaders: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::MaterialDesc;

    #[test]
    fn materials_pick_pipeline_by_side_and_blend() {
        let table_top = Material::new(
            "side_table_top",
            &MaterialDesc::unlit(0x18453b).with_opacity(0.75).double_sided(),
        );
        assert_eq!(pipeline_for(&table_top), names::PHONG_TRANSPARENT_DOUBLE_SIDED);

        let glass = Material::new("glass", &MaterialDesc::phong(0xb0c4de).with_opacity(0.5));
        assert_eq!(pipeline_for(&glass), names::PHONG_TRANSPARENT);

        let screen = Material::new("tv_screen", &MaterialDesc::phong(0xffffff).double_sided());
        assert_eq!(pipeline_for(&screen), names::PHONG_DOUBLE_SIDED);

        // an opacity hint without the transparent flag stays opaque
        let floor = Material::new("floor", &MaterialDesc::phong(0xffffff).with_opacity_hint(0.5));
        assert_eq!(pipeline_for(&floor), names::PHONG);
    }

    #[test]
    fn vertex_only_config_drops_colour_targets() {
        let config = PipelineConfig::default()
            .with_shader("shadow")
            .with_vertex_only()
            .with_depth_format(TextureFormat::Depth32Float)
            .with_cull_mode(None)
            .with_depth_bias(2, 2.0);
        assert!(config.color_targets.is_empty());
        assert_eq!(config.depth_bias.constant, 2);
        assert!(config.depth_write);
        assert!(config.cull_mode.is_none());
    }
}
