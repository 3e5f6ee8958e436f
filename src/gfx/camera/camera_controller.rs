use log::debug;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Maps mouse and keyboard input onto an [`OrbitCamera`]
///
/// Left drag orbits, shift + left drag pans, the wheel zooms when enabled.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_zoom: bool,
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            enable_zoom: true,
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            pan_speed: config.pan_speed,
            enable_zoom: config.enable_zoom,
            ..Self::new(config.rotate_speed, config.zoom_speed)
        }
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) {
        if self.apply_device_event(event, camera) {
            window.request_redraw();
        }
    }

    /// Returns true when the camera moved
    fn apply_device_event(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta } if self.enable_zoom => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                if self.is_shift_held {
                    camera.pan((
                        -delta.0 as f32 * self.pan_speed,
                        delta.1 as f32 * self.pan_speed,
                    ));
                } else {
                    camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                    camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                }
                true
            }
            _ => false,
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => {
                if self.is_shift_held {
                    debug!("Resetting camera to its starting view");
                    camera.reset_to_default();
                }
            }
            _ => (),
        }
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> (CameraController, OrbitCamera) {
        let config = CameraConfig {
            enable_damping: false,
            ..CameraConfig::default()
        };
        (
            CameraController::from_config(&config),
            OrbitCamera::from_config(&config, 1.5),
        )
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let (mut controller, mut camera) = undamped();
        let yaw = camera.yaw;
        let drag = DeviceEvent::MouseMotion { delta: (40.0, 0.0) };
        let moved = controller.apply_device_event(&drag, &mut camera);
        assert!(!moved);
        assert_eq!(camera.yaw, yaw);
    }

    #[test]
    fn drag_orbits() {
        let (mut controller, mut camera) = undamped();
        controller.apply_device_event(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        assert!(controller.is_rotating());
        let yaw = camera.yaw;
        let drag = DeviceEvent::MouseMotion { delta: (40.0, 0.0) };
        assert!(controller.apply_device_event(&drag, &mut camera));
        assert!(camera.yaw < yaw);
    }

    #[test]
    fn wheel_respects_enable_zoom() {
        let (mut controller, mut camera) = undamped();
        controller.enable_zoom = false;
        let distance = camera.distance;
        let wheel = DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
        };
        assert!(!controller.apply_device_event(&wheel, &mut camera));
        assert_eq!(camera.distance, distance);

        controller.enable_zoom = true;
        assert!(controller.apply_device_event(&wheel, &mut camera));
        assert!(camera.distance < distance);
    }
}
