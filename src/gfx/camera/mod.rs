//! Orbit camera driven by mouse input
//!
//! The camera orbits a target point on a sphere (Y up). Input moves are
//! optionally damped and applied a fraction per frame by
//! [`CameraManager::advance`].

pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraManager, CameraUniform};
pub use orbit_camera::OrbitCamera;
