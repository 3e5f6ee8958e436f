use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Below this the remaining orbit motion is dropped
const SETTLE_EPSILON: f32 = 1e-5;

/// Orbit motion still to be applied when damping is on
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingMotion {
    yaw: f32,
    pitch: f32,
    pan: Vector3<f32>,
}

impl PendingMotion {
    fn zero() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            pan: Vector3::zero(),
        }
    }

    fn is_settled(&self) -> bool {
        self.yaw.abs() < SETTLE_EPSILON
            && self.pitch.abs() < SETTLE_EPSILON
            && self.pan.magnitude() < SETTLE_EPSILON
    }
}

/// Y-up perspective camera orbiting a target point
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    /// Fraction of pending motion applied per frame; `None` applies input at once
    pub damping: Option<f32>,
    /// Keep pans on the ground plane instead of the view plane
    pub ground_panning: bool,
    pending: PendingMotion,
    home: (f32, f32, f32, Vector3<f32>),
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            damping: None,
            ground_panning: true,
            pending: PendingMotion::zero(),
            home: (distance, pitch, yaw, target),
        };
        camera.update();
        camera
    }

    /// Places the camera at `config.position`, looking at `config.target`
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let offset = config.position - config.target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        let mut camera = Self::new(distance, pitch, yaw, config.target.to_vec(), aspect);
        camera.fovy = Deg(config.fov_y_degrees).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.bounds.min_distance = Some(config.min_distance);
        camera.bounds.max_distance = Some(config.max_distance);
        camera.damping = config
            .enable_damping
            .then_some(config.damping_factor.clamp(f32::EPSILON, 1.0));
        camera.ground_panning = !config.screen_space_panning;
        camera.update_view_proj();
        camera
    }

    pub fn reset_to_default(&mut self) {
        let (distance, pitch, yaw, target) = self.home;
        self.distance = distance;
        self.pitch = pitch;
        self.yaw = yaw;
        self.target = target;
        self.pending = PendingMotion::zero();

        self.update(); // Recalculate eye position
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.1)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        if self.damping.is_some() {
            self.pending.pitch += delta;
        } else {
            self.set_pitch(self.pitch + delta);
        }
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        if self.damping.is_some() {
            self.pending.yaw += delta;
        } else {
            self.set_yaw(self.yaw + delta);
        }
    }

    /// Pans the target relative to the current view direction
    ///
    /// `delta.0` moves along the camera's right vector. `delta.1` moves
    /// forward across the ground plane, or up the screen when ground panning
    /// is off.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let second = if self.ground_panning {
            self.up.cross(right).normalize()
        } else {
            right.cross(forward).normalize()
        };

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;
        let movement = (right * delta.0 + second * delta.1) * pan_scale;

        if self.damping.is_some() {
            self.pending.pan += movement;
        } else {
            self.target += movement;
            self.update();
        }
    }

    /// Applies one frame of damped motion; returns true while still moving
    pub fn advance(&mut self) -> bool {
        let Some(factor) = self.damping else {
            return false;
        };
        if self.pending.is_settled() {
            self.pending = PendingMotion::zero();
            return false;
        }

        let step = PendingMotion {
            yaw: self.pending.yaw * factor,
            pitch: self.pending.pitch * factor,
            pan: self.pending.pan * factor,
        };
        self.pending.yaw -= step.yaw;
        self.pending.pitch -= step.pitch;
        self.pending.pan -= step.pan;

        self.target += step.pan;
        self.pitch = (self.pitch + step.pitch).clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.set_yaw(self.yaw + step.yaw);
        true
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}
