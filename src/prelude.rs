//! # Parlour Prelude
//!
//! Commonly used types for building and running a room.
//!
//! ```no_run
//! use parlour::prelude::*;
//!
//! let mut handle = initialize(AppConfig::default())?;
//! let lamp = handle.objects().lamp;
//! handle
//!     .scene_mut()
//!     .graph
//!     .set_local_transform(lamp, Transform::from_translation(-1.0, 0.0, -1.5))?;
//! handle.run()?;
//! # Ok::<(), SceneError>(())
//! ```

pub use crate::app::{initialize, SceneHandle};
pub use crate::assets::{AssetLoader, TextureRequest, TextureTarget};
pub use crate::config::{AppConfig, AssetConfig, CameraConfig, RenderConfig, WindowConfig};
pub use crate::error::{Result, SceneError};
pub use crate::furniture::{Archetype, Couch, Lamp, SideTable, SnowGlobe, Television, TvTable};
pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::resources::material::MaterialDesc;
pub use crate::gfx::scene::{Light, NodeId, Scene, Shape, Transform};
pub use crate::render_loop::{LoopState, RenderLoop, RenderSurface};
pub use crate::room::Room;
