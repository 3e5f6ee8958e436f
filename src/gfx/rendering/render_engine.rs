//! WGPU-based rendering engine
//!
//! Draws the scene graph every frame: a depth-only pass from the sun into
//! its shadow map (skipped while the shadow cache is valid), then a single
//! Blinn-Phong pass over opaque meshes followed by transparent meshes back
//! to front. Vertex buffers and material textures are uploaded lazily the
//! first time a node or material revision is seen.

use std::{collections::HashMap, sync::Arc};

use cgmath::{Matrix, Matrix4, SquareMatrix};
use log::{debug, info, warn};
use wgpu::util::DeviceExt;

use super::{
    pipeline_manager::{names, pipeline_for, PipelineConfig, PipelineManager},
    shadow_cache::{LightState, ShadowCache},
};
use crate::{
    assets::TextureImage,
    config::RenderConfig,
    error::{Result, SceneError},
    gfx::{
        resources::{
            global_bindings::{sun_view_proj, GlobalBindings, GlobalUBO, GlobalUBOContent},
            material::{Material, MaterialUniform},
            texture_resource::TextureResource,
        },
        scene::{DrawItem, NodeId, PlacedLight, Primitive, Scene, ShadowSettings},
    },
    render_loop::RenderSurface,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Per-draw uniform block, bound to slot 1
///
/// MUST match the `Model` struct in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    model: [[f32; 4]; 4],
    /// Inverse transpose of `model` for transforming normals
    normal: [[f32; 4]; 4],
    /// x: receives shadows
    flags: [f32; 4],
}

impl ModelUniform {
    pub fn new(world: Matrix4<f32>, receive_shadow: bool) -> Self {
        let normal = world
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: world.into(),
            normal: normal.into(),
            flags: [receive_shadow as u32 as f32, 0.0, 0.0, 0.0],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_ubo: UniformBuffer<ModelUniform>,
    bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    ubo: UniformBuffer<MaterialUniform>,
    texture: Option<TextureResource>,
    revision: u64,
    bind_group: wgpu::BindGroup,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    model_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    shadow_layout: BindGroupLayoutWithDesc,

    shadow_settings: ShadowSettings,
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,
    shadow_cache: ShadowCache,
    shadow_debug: bool,

    placeholder: TextureResource,
    meshes: HashMap<NodeId, GpuMesh>,
    materials: HashMap<String, GpuMaterial>,

    clear_color: wgpu::Color,
    max_point_lights: usize,
}

impl RenderEngine {
    /// Creates the device, surface and every pipeline for the given window
    ///
    /// Fails with [`SceneError::SurfaceUnavailable`] when no adapter, device
    /// or surface format can be obtained.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        render: &RenderConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| SceneError::SurfaceUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::SurfaceUnavailable(format!("no adapter: {e}")))?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SceneError::SurfaceUnavailable(format!("no device: {e}")))?;

        // Shading happens in linear space, so the surface must encode sRGB
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| SceneError::SurfaceUnavailable("surface has no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if render.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new_with_data(&device, &GlobalUBOContent::default());
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let model_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Model Bind Group Layout");
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Material Bind Group Layout");
        let shadow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::depth_texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(&device, "Shadow Bind Group Layout");

        let shadow_settings = ShadowSettings::default();
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_settings.map_size);
        let shadow_bind_group =
            Self::create_shadow_bind_group(&device, &shadow_layout, &shadow_map);

        let placeholder = TextureResource::from_image(
            &device,
            &queue,
            &TextureImage::placeholder(),
            "Placeholder",
        );

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("phong", include_str!("phong.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow_pass.wgsl"));

        // No culling in the shadow pass so open shapes (planes, discs) cast too
        pipeline_manager.register_pipeline(
            names::SHADOW,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    model_layout.layout.clone(),
                ]),
        );

        let scene_layouts = vec![
            global_bindings.bind_group_layout().clone(),
            model_layout.layout.clone(),
            material_layout.layout.clone(),
            shadow_layout.layout.clone(),
        ];
        let target = |blend| {
            vec![Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })]
        };
        for (name, cull, transparent) in [
            (names::PHONG, Some(wgpu::Face::Back), false),
            (names::PHONG_DOUBLE_SIDED, None, false),
            (names::PHONG_TRANSPARENT, Some(wgpu::Face::Back), true),
            (names::PHONG_TRANSPARENT_DOUBLE_SIDED, None, true),
        ] {
            let mut config = PipelineConfig::default()
                .with_label(name)
                .with_shader("phong")
                .with_cull_mode(cull)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(scene_layouts.clone());
            config = if transparent {
                config
                    .with_color_targets(target(wgpu::BlendState::ALPHA_BLENDING))
                    .without_depth_write()
            } else {
                config.with_color_targets(target(wgpu::BlendState::REPLACE))
            };
            pipeline_manager.register_pipeline(name, config);
        }

        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| SceneError::SurfaceUnavailable(errors.join("; ")))?;
        debug!("{:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            model_layout,
            material_layout,
            shadow_layout,
            shadow_settings,
            shadow_map,
            shadow_bind_group,
            shadow_cache: ShadowCache::new(),
            shadow_debug: std::env::var("PARLOUR_SHADOW_DEBUG").is_ok(),
            placeholder,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            clear_color: render.clear_color,
            max_point_lights: render.max_point_lights,
        })
    }

    fn create_shadow_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        shadow_map: &TextureResource,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(device, "Shadow Bind Group")
    }

    fn upload_mesh(
        &self,
        node: NodeId,
        primitive: &Primitive,
        world: Matrix4<f32>,
        receive: bool,
    ) -> GpuMesh {
        let vertices = primitive.geometry().to_vertices();
        let indices = &primitive.geometry().indices;
        let label = format!("{} #{}", primitive.shape().kind_name(), node.index());

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Vertex Buffer {label}")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Index Buffer {label}")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let model_ubo =
            UniformBuffer::new_with_data(&self.device, &ModelUniform::new(world, receive));
        let bind_group = BindGroupBuilder::new(&self.model_layout)
            .resource(model_ubo.binding_resource())
            .create(&self.device, "Model Bind Group");

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            model_ubo,
            bind_group,
        }
    }

    fn material_bind_group(
        &self,
        ubo: &UniformBuffer<MaterialUniform>,
        texture: Option<&TextureResource>,
        name: &str,
    ) -> wgpu::BindGroup {
        let texture = texture.unwrap_or(&self.placeholder);
        BindGroupBuilder::new(&self.material_layout)
            .resource(ubo.binding_resource())
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(&self.device, &format!("Material Bind Group {name}"))
    }

    /// Uploads the material's map if its revision moved on since last frame
    fn sync_material(&mut self, material: &Material) {
        let name = material.name.as_str();
        if !self.materials.contains_key(name) {
            let ubo = UniformBuffer::new_with_data(&self.device, &material.uniform());
            let bind_group = self.material_bind_group(&ubo, None, name);
            self.materials.insert(
                name.to_string(),
                GpuMaterial {
                    ubo,
                    texture: None,
                    revision: 0,
                    bind_group,
                },
            );
        }

        let revision = material.revision();
        let stale = self
            .materials
            .get(name)
            .is_some_and(|gpu| gpu.revision != revision);
        if stale {
            let texture = material.map().and_then(|image| {
                let max = self.device.limits().max_texture_dimension_2d;
                if image.width > max || image.height > max {
                    warn!(
                        "{}: {}x{} exceeds the {max}px texture limit, keeping placeholder",
                        image.source.display(),
                        image.width,
                        image.height
                    );
                    return None;
                }
                Some(TextureResource::from_image(&self.device, &self.queue, image, name))
            });
            if let Some(gpu) = self.materials.get(name) {
                let bind_group = self.material_bind_group(&gpu.ubo, texture.as_ref(), name);
                if let Some(gpu) = self.materials.get_mut(name) {
                    gpu.texture = texture;
                    gpu.revision = revision;
                    gpu.bind_group = bind_group;
                }
            }
            debug!("Uploaded map for material '{}' (revision {})", name, revision);
        }

        if let Some(gpu) = self.materials.get_mut(name) {
            gpu.ubo.update_content(&self.queue, material.uniform());
        }
    }

    fn prepare(&mut self, items: &[DrawItem<'_>]) {
        for item in items {
            match self.meshes.get_mut(&item.node) {
                Some(mesh) => mesh.model_ubo.update_content(
                    &self.queue,
                    ModelUniform::new(item.world, item.receive_shadow),
                ),
                None => {
                    let mesh = self.upload_mesh(
                        item.node,
                        item.primitive,
                        item.world,
                        item.receive_shadow,
                    );
                    self.meshes.insert(item.node, mesh);
                }
            }
            self.sync_material(item.material);
        }
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Forces the shadow map to be re-rendered next frame
    pub fn invalidate_shadow_cache(&mut self) {
        self.shadow_cache.invalidate();
    }

    fn sun_state(sun: Option<&PlacedLight>) -> Option<LightState> {
        sun.map(|sun| LightState::new(sun, sun_view_proj(sun)))
    }

    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, items: &[DrawItem<'_>]) {
        let Some(pipeline) = self.pipeline_manager.get_pipeline(names::SHADOW) else {
            warn!("Shadow pipeline not found");
            return;
        };
        let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_map.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        shadow_pass.set_pipeline(pipeline);
        shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

        for item in items.iter().filter(|item| item.cast_shadow) {
            if let Some(mesh) = self.meshes.get(&item.node) {
                shadow_pass.set_bind_group(1, &mesh.bind_group, &[]);
                shadow_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                shadow_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                shadow_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    fn encode_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        items: &[DrawItem<'_>],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
        render_pass.set_bind_group(3, &self.shadow_bind_group, &[]);

        let mut current_pipeline = None;
        for item in items {
            let (Some(mesh), Some(material)) = (
                self.meshes.get(&item.node),
                self.materials.get(&item.material.name),
            ) else {
                debug!("Skipping node {:?} - no GPU resources", item.node);
                continue;
            };

            let name = pipeline_for(item.material);
            if current_pipeline != Some(name) {
                let Some(pipeline) = self.pipeline_manager.get_pipeline(name) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                current_pipeline = Some(name);
            }

            render_pass.set_bind_group(1, &mesh.bind_group, &[]);
            render_pass.set_bind_group(2, &material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

impl RenderSurface for RenderEngine {
    fn configure_shadows(&mut self, settings: &ShadowSettings) {
        if *settings == self.shadow_settings {
            return;
        }
        if settings.map_size != self.shadow_settings.map_size {
            self.shadow_map =
                TextureResource::create_shadow_map(&self.device, settings.map_size.max(1));
            self.shadow_bind_group =
                Self::create_shadow_bind_group(&self.device, &self.shadow_layout, &self.shadow_map);
        }
        info!(
            "Shadow map {0}x{0}, near {1}, far {2}",
            settings.map_size, settings.near, settings.far
        );
        self.shadow_settings = *settings;
        self.shadow_cache.invalidate();
    }

    /// Zero-sized windows (minimised) keep the previous configuration
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn draw(&mut self, scene: &Scene) -> Result<()> {
        let lights = scene.lights()?;
        let items = scene.draw_order()?;

        let sun = lights
            .iter()
            .find(|l| !l.light.is_point() && l.light.cast_shadow);
        if let Some(sun) = sun {
            self.configure_shadows(&sun.light.shadow);
        }

        self.global_ubo.update_content(
            &self.queue,
            GlobalUBOContent::new(
                &scene.camera_manager.camera.uniform,
                &lights,
                self.max_point_lights,
            ),
        );
        self.prepare(&items);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(SceneError::SurfaceUnavailable("out of memory".into()));
            }
            Err(e) => {
                warn!("Skipping frame: {e}");
                return Ok(());
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let casters: Vec<(NodeId, Matrix4<f32>)> = items
            .iter()
            .filter(|item| item.cast_shadow)
            .map(|item| (item.node, item.world))
            .collect();
        let sun_state = Self::sun_state(sun);
        if self.shadow_cache.needs_update(sun_state.as_ref(), &casters) {
            if self.shadow_debug {
                info!("SHADOW DEBUG: Regenerating shadow map ({} casters)", casters.len());
            }
            if sun.is_some() {
                self.encode_shadow_pass(&mut encoder, &items);
            }
            self.shadow_cache.mark_valid(sun_state, &casters);
        } else if self.shadow_debug {
            info!("SHADOW DEBUG: Using cached shadow map");
        }

        self.encode_main_pass(&mut encoder, &surface_view, &items);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
