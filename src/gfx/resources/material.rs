//! Material system for the room's shaded surfaces
//!
//! Provides explicit material descriptions and centralized storage.
//! Materials are stored in [`MaterialManager`] and primitives reference them
//! by ID; the renderer mirrors each material's state into GPU resources.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::assets::TextureImage;

/// Material ID for referencing materials
pub type MaterialId = String;

/// Converts a `0xRRGGBB` colour to linear RGB
///
/// Hex colours are authored in sRGB; shading happens in linear space and the
/// surface converts back on output.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Which faces of a surface are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Lighting model applied to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Ambient + diffuse + specular from every light
    #[default]
    Phong,
    /// Flat colour, ignores lights
    Unlit,
}

/// Every recognised material option
///
/// - `color`: base colour, multiplied with the texture map when one is bound
/// - `opacity`: alpha used when `transparent` is set; opaque surfaces ignore it
/// - `emissive` / `emissive_intensity`: light emitted regardless of scene lights
/// - `side`: front faces only, or both
/// - `shading`: lit or unlit
/// - `map`: texture path, resolved later by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub color: u32,
    pub opacity: f32,
    pub transparent: bool,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub side: Side,
    pub shading: Shading,
    pub map: Option<PathBuf>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            opacity: 1.0,
            transparent: false,
            emissive: 0x000000,
            emissive_intensity: 1.0,
            side: Side::Front,
            shading: Shading::Phong,
            map: None,
        }
    }
}

impl MaterialDesc {
    /// Lit material with the given base colour
    pub fn phong(color: u32) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Unlit material with the given colour
    pub fn unlit(color: u32) -> Self {
        Self {
            color,
            shading: Shading::Unlit,
            ..Default::default()
        }
    }

    /// Builder pattern: make translucent with the given opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = true;
        self
    }

    /// Builder pattern: set opacity without enabling blending
    pub fn with_opacity_hint(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: set emissive colour and intensity
    pub fn with_emissive(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity.max(0.0);
        self
    }

    /// Builder pattern: render both faces
    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    /// Builder pattern: reference a texture map
    pub fn with_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.map = Some(path.into());
        self
    }
}

/// Current texture state of a material
///
/// Swapped as one value so a frame never observes half an assignment.
#[derive(Debug, Clone, Default)]
pub enum MapSlot {
    /// No texture yet; surfaces show their base colour
    #[default]
    Empty,
    Loaded {
        image: Arc<TextureImage>,
        revision: u64,
    },
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear base colour and effective alpha
    pub color: [f32; 4],
    /// Emissive colour pre-multiplied by intensity
    pub emissive: [f32; 4],
    /// x: unlit, y: has map
    pub flags: [f32; 4],
}

/// Material definition with shading properties
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub side: Side,
    pub shading: Shading,
    map_source: Option<PathBuf>,
    map: MapSlot,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", &MaterialDesc::default())
    }
}

impl Material {
    /// Creates a new material from its description
    pub fn new(name: &str, desc: &MaterialDesc) -> Self {
        Self {
            name: name.to_string(),
            color: hex_to_linear(desc.color),
            opacity: desc.opacity,
            transparent: desc.transparent,
            emissive: hex_to_linear(desc.emissive),
            emissive_intensity: desc.emissive_intensity,
            side: desc.side,
            shading: desc.shading,
            map_source: desc.map.clone(),
            map: MapSlot::Empty,
        }
    }

    /// Alpha the surface is drawn with
    pub fn alpha(&self) -> f32 {
        if self.transparent {
            self.opacity
        } else {
            1.0
        }
    }

    /// Whether this material needs blending and back-to-front ordering
    pub fn is_transparent(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }

    /// Texture path this material expects, if any
    pub fn map_source(&self) -> Option<&Path> {
        self.map_source.as_deref()
    }

    /// The texture currently bound, if loaded
    pub fn map(&self) -> Option<&Arc<TextureImage>> {
        match &self.map {
            MapSlot::Loaded { image, .. } => Some(image),
            MapSlot::Empty => None,
        }
    }

    /// Increments every time the texture changes; 0 while empty
    pub fn revision(&self) -> u64 {
        match &self.map {
            MapSlot::Loaded { revision, .. } => *revision,
            MapSlot::Empty => 0,
        }
    }

    /// Replaces the texture map
    ///
    /// Returns `false` and leaves the slot untouched when the same image is
    /// already bound.
    pub fn set_map(&mut self, image: Arc<TextureImage>) -> bool {
        if let MapSlot::Loaded { image: current, .. } = &self.map {
            if Arc::ptr_eq(current, &image) || **current == *image {
                return false;
            }
        }
        let revision = self.revision() + 1;
        self.map = MapSlot::Loaded { image, revision };
        true
    }

    /// Uniform block mirrored to the GPU
    pub fn uniform(&self) -> MaterialUniform {
        let [r, g, b] = self.color;
        let [er, eg, eb] = self.emissive;
        let e = self.emissive_intensity;
        MaterialUniform {
            color: [r, g, b, self.alpha()],
            emissive: [er * e, eg * e, eb * e, 0.0],
            flags: [
                (self.shading == Shading::Unlit) as u32 as f32,
                self.map().is_some() as u32 as f32,
                0.0,
                0.0,
            ],
        }
    }
}

/// Manages all materials in the scene
///
/// Centralized storage for all materials. Primitives reference materials by
/// ID; several primitives may share one material (both walls, all table legs).
#[derive(Debug, Clone)]
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds a material built from `desc`, replacing any material of the same name
    pub fn add_material(&mut self, name: &str, desc: &MaterialDesc) -> MaterialId {
        let material = Material::new(name, desc);
        self.materials.insert(name.to_string(), material);
        name.to_string()
    }

    /// Gets a material by ID
    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Gets a mutable material by ID
    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        &self.default_material
    }

    /// Gets material for an object with fallback to default
    pub fn get_material_for_object(&self, material_id: Option<&str>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    /// Materials that reference a texture which has not been bound yet
    pub fn unresolved_maps(&self) -> Vec<(MaterialId, PathBuf)> {
        let mut pending: Vec<_> = self
            .materials
            .iter()
            .filter(|(_, m)| m.map().is_none())
            .filter_map(|(id, m)| m.map_source().map(|p| (id.clone(), p.to_path_buf())))
            .collect();
        pending.sort();
        pending
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        let mut ids: Vec<_> = self.materials.keys().collect();
        ids.sort();
        ids
    }

    /// Iterates over every registered material
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(source: &str, rgba: [u8; 4]) -> Arc<TextureImage> {
        Arc::new(TextureImage::new(source, 1, 1, rgba.to_vec()))
    }

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn hex_colours_are_linearised() {
        let [r, g, b] = hex_to_linear(0xffffff);
        assert!(approx([r, g, b, 0.0], [1.0, 1.0, 1.0, 0.0]));
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let [r, g, b] = hex_to_linear(0x987654);
        assert!(r > g && g > b);
        assert!(r > 0.3 && r < 0.32);
    }

    #[test]
    fn opacity_only_applies_to_transparent_materials() {
        let glass = Material::new("glass", &MaterialDesc::phong(0xb0c4de).with_opacity(0.5));
        assert_eq!(glass.alpha(), 0.5);
        assert!(glass.is_transparent());

        let floor = Material::new("floor", &MaterialDesc::phong(0xffffcc).with_opacity_hint(0.5));
        assert_eq!(floor.alpha(), 1.0);
        assert!(!floor.is_transparent());
    }

    #[test]
    fn set_map_bumps_revision_once_per_distinct_image() {
        let mut m = Material::new("screen", &MaterialDesc::phong(0xffffff));
        assert_eq!(m.revision(), 0);
        assert!(m.set_map(image("tv.png", [1, 2, 3, 255])));
        assert_eq!(m.revision(), 1);
        assert!(!m.set_map(image("tv.png", [1, 2, 3, 255])));
        assert_eq!(m.revision(), 1);
        assert!(m.set_map(image("tv.png", [9, 9, 9, 255])));
        assert_eq!(m.revision(), 2);
        assert_eq!(m.uniform().flags[1], 1.0);
    }

    #[test]
    fn emissive_is_premultiplied() {
        let shade = Material::new(
            "shade",
            &MaterialDesc::phong(0xb0c4de).with_emissive(0xffffff, 0.75),
        );
        assert!(approx(shade.uniform().emissive, [0.75, 0.75, 0.75, 0.0]));
    }

    #[test]
    fn manager_falls_back_to_default() {
        let mut manager = MaterialManager::new();
        let id = manager.add_material("wood", &MaterialDesc::phong(0x987654));
        assert_eq!(manager.get_material_for_object(Some(&id)).name, "wood");
        assert_eq!(manager.get_material_for_object(Some("missing")).name, "default");
        assert_eq!(manager.get_material_for_object(None).name, "default");
    }

    #[test]
    fn unresolved_maps_lists_pending_textures() {
        let mut manager = MaterialManager::new();
        manager.add_material(
            "carpet",
            &MaterialDesc::phong(0xffffff).with_map("img/green_carpet.jpg"),
        );
        manager.add_material("wood", &MaterialDesc::phong(0x987654));
        assert_eq!(
            manager.unresolved_maps(),
            vec![("carpet".to_string(), PathBuf::from("img/green_carpet.jpg"))]
        );

        let carpet = manager.get_material_mut("carpet").unwrap();
        carpet.set_map(image("img/green_carpet.jpg", [0, 255, 0, 255]));
        assert!(manager.unresolved_maps().is_empty());
    }
}
