//! Parlour
//!
//! A procedurally built living room rendered with wgpu and winit. Furniture
//! is assembled from parametric primitives in a scene graph, textures stream
//! in while the room is already on screen, and an orbit camera looks around.
//!
//! ```no_run
//! let handle = parlour::initialize(parlour::config::AppConfig::from_env())?;
//! handle.run()?;
//! # Ok::<(), parlour::SceneError>(())
//! ```

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod furniture;
pub mod gfx;
pub mod prelude;
pub mod render_loop;
pub mod room;
pub mod wgpu_utils;

pub use app::{initialize, SceneHandle};
pub use error::{Result, SceneError};
