use std::path::PathBuf;

use crate::gfx::{
    resources::material::{MaterialDesc, MaterialId},
    scene::{graph::NodeId, graph::Transform, primitive::Shape},
};

/// Where a loaded texture ends up
#[derive(Debug, Clone, PartialEq)]
pub enum TextureTarget {
    /// Set as the map of an existing material
    Map { material: MaterialId },
    /// Register `desc` as a new textured material and bind it to every node
    Rebind {
        nodes: Vec<NodeId>,
        material: MaterialId,
        desc: MaterialDesc,
    },
    /// Attach a new textured mesh under `parent` once the texture resolves
    Decoration {
        parent: NodeId,
        name: String,
        shape: Shape,
        offset: Transform,
        material: MaterialId,
        desc: MaterialDesc,
    },
}

impl TextureTarget {
    /// Material that receives the texture
    pub fn material(&self) -> &str {
        match self {
            Self::Map { material }
            | Self::Rebind { material, .. }
            | Self::Decoration { material, .. } => material,
        }
    }
}

/// A texture file plus what to do with it
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    /// Relative to the asset root
    pub path: PathBuf,
    pub target: TextureTarget,
}

impl TextureRequest {
    pub fn map(path: impl Into<PathBuf>, material: impl Into<MaterialId>) -> Self {
        Self {
            path: path.into(),
            target: TextureTarget::Map {
                material: material.into(),
            },
        }
    }

    pub fn rebind(
        path: impl Into<PathBuf>,
        nodes: Vec<NodeId>,
        material: impl Into<MaterialId>,
        desc: MaterialDesc,
    ) -> Self {
        Self {
            path: path.into(),
            target: TextureTarget::Rebind {
                nodes,
                material: material.into(),
                desc,
            },
        }
    }

    pub fn decoration(
        path: impl Into<PathBuf>,
        parent: NodeId,
        name: impl Into<String>,
        shape: Shape,
        offset: Transform,
        desc: MaterialDesc,
    ) -> Self {
        let name = name.into();
        Self {
            path: path.into(),
            target: TextureTarget::Decoration {
                parent,
                material: name.clone(),
                name,
                shape,
                offset,
                desc,
            },
        }
    }
}
