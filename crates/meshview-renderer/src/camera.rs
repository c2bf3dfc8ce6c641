//! Camera Controller
//!
//! Orbit camera around a target point with damped rotate/pan/dolly input,
//! plus the imperative [`CameraControl`] surface (reset, zoom-to-fit, state
//! queries) the viewer and host UIs drive it through.
//!
//! Camera configuration is resolved in three layers: adaptive defaults
//! derived from the model size, then caller overrides, then fixed safety
//! defaults for anything still unset.

use std::f64::consts::PI;

use glam::{DMat4, DQuat, DVec3, EulerRot};
use meshview_core::Aabb;
use meshview_core::adaptive::CameraParameters;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_POSITION: DVec3 = DVec3::new(3.0, 3.0, 3.0);
pub const DEFAULT_MIN_DISTANCE: f64 = 2.0;
pub const DEFAULT_MAX_DISTANCE: f64 = 200.0;
pub const DEFAULT_ZOOM_SPEED: f64 = 0.75;
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.1;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.1;
pub const DEFAULT_ROTATE_SPEED: f64 = 0.5;
pub const DEFAULT_PAN_SPEED: f64 = 0.75;
/// Vertical field of view in degrees
pub const DEFAULT_FOV: f64 = 45.0;

/// Keeps the polar angle off the poles where the azimuth is undefined
const POLE_EPSILON: f64 = 1e-6;
const MOTION_EPSILON: f64 = 1e-9;

/// Caller-facing camera options, every field optional
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfig {
    pub initial_position: Option<[f64; 3]>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub min_polar_angle: Option<f64>,
    pub max_polar_angle: Option<f64>,
    pub zoom_speed: Option<f64>,
    pub enable_damping: Option<bool>,
    pub damping_factor: Option<f64>,
    pub screen_space_panning: Option<bool>,
    /// Interpolation weight of a single `reset()` step
    pub smoothing_factor: Option<f64>,
    pub rotate_speed: Option<f64>,
    pub pan_speed: Option<f64>,
    /// Vertical field of view in degrees
    pub fov: Option<f64>,
}

impl CameraConfig {
    /// Defaults implied by the model size
    pub fn adaptive(params: &CameraParameters) -> Self {
        Self {
            initial_position: Some(params.position.to_array()),
            max_distance: Some(DEFAULT_MAX_DISTANCE.max(params.distance * 2.0)),
            ..Self::default()
        }
    }

    /// Field-wise overlay: values set on `self` win over `base`
    pub fn or(&self, base: &CameraConfig) -> Self {
        Self {
            initial_position: self.initial_position.or(base.initial_position),
            min_distance: self.min_distance.or(base.min_distance),
            max_distance: self.max_distance.or(base.max_distance),
            min_polar_angle: self.min_polar_angle.or(base.min_polar_angle),
            max_polar_angle: self.max_polar_angle.or(base.max_polar_angle),
            zoom_speed: self.zoom_speed.or(base.zoom_speed),
            enable_damping: self.enable_damping.or(base.enable_damping),
            damping_factor: self.damping_factor.or(base.damping_factor),
            screen_space_panning: self.screen_space_panning.or(base.screen_space_panning),
            smoothing_factor: self.smoothing_factor.or(base.smoothing_factor),
            rotate_speed: self.rotate_speed.or(base.rotate_speed),
            pan_speed: self.pan_speed.or(base.pan_speed),
            fov: self.fov.or(base.fov),
        }
    }

    /// Fill anything still unset with the safety defaults
    pub fn resolve(&self) -> ResolvedCameraConfig {
        let min_distance = self.min_distance.unwrap_or(DEFAULT_MIN_DISTANCE).max(0.0);
        let max_distance = self.max_distance.unwrap_or(DEFAULT_MAX_DISTANCE).max(min_distance);
        let min_polar_angle = self.min_polar_angle.unwrap_or(0.0).clamp(0.0, PI);
        let max_polar_angle = self.max_polar_angle.unwrap_or(PI).clamp(min_polar_angle, PI);

        ResolvedCameraConfig {
            initial_position: self
                .initial_position
                .map(DVec3::from_array)
                .unwrap_or(DEFAULT_INITIAL_POSITION),
            min_distance,
            max_distance,
            min_polar_angle,
            max_polar_angle,
            zoom_speed: self.zoom_speed.unwrap_or(DEFAULT_ZOOM_SPEED),
            enable_damping: self.enable_damping.unwrap_or(true),
            damping_factor: self
                .damping_factor
                .unwrap_or(DEFAULT_DAMPING_FACTOR)
                .clamp(0.0, 1.0),
            screen_space_panning: self.screen_space_panning.unwrap_or(true),
            smoothing_factor: self
                .smoothing_factor
                .unwrap_or(DEFAULT_SMOOTHING_FACTOR)
                .clamp(0.0, 1.0),
            rotate_speed: self.rotate_speed.unwrap_or(DEFAULT_ROTATE_SPEED),
            pan_speed: self.pan_speed.unwrap_or(DEFAULT_PAN_SPEED),
            fov: self.fov.unwrap_or(DEFAULT_FOV),
        }
    }
}

/// Camera options with every value decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCameraConfig {
    pub initial_position: DVec3,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    pub zoom_speed: f64,
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub screen_space_panning: bool,
    pub smoothing_factor: f64,
    pub rotate_speed: f64,
    pub pan_speed: f64,
    pub fov: f64,
}

impl Default for ResolvedCameraConfig {
    fn default() -> Self {
        CameraConfig::default().resolve()
    }
}

/// Adaptive defaults, then caller overrides, then safety defaults
pub fn merge_camera_config(
    adaptive: Option<&CameraParameters>,
    caller: &CameraConfig,
) -> ResolvedCameraConfig {
    let adaptive = adaptive.map(CameraConfig::adaptive).unwrap_or_default();
    caller.or(&adaptive).resolve()
}

/// Query-only snapshot of the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub target: DVec3,
    pub position: DVec3,
    /// Lens zoom, distinct from orbit distance
    pub zoom: f64,
    /// Camera orientation as XYZ Euler angles in radians
    pub rotation: DVec3,
    pub distance: f64,
}

/// Imperative camera surface
pub trait CameraControl {
    /// Single interpolation step back to the initial position and origin
    fn reset(&mut self);

    /// Re-sync orbit state after the camera was moved externally
    fn update(&mut self);

    /// `None` until the controls are mounted
    fn camera_state(&self) -> Option<CameraState>;

    fn set_target(&mut self, target: DVec3);

    fn set_position(&mut self, position: DVec3);

    /// Frame `bounds` along the current view direction
    fn zoom_to_fit(&mut self, bounds: &Aabb);
}

/// Spherical coordinates around the orbit target, polar angle from +Y
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f64,
    theta: f64,
    phi: f64,
}

impl Spherical {
    fn from_offset(offset: DVec3) -> Self {
        let radius = offset.length();
        if radius < MOTION_EPSILON {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> DVec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        DVec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controls in the usual perspective-camera convention: +Y up, the
/// camera always looks at `target`.
///
/// Input accumulates into pending deltas that [`OrbitControls::update`]
/// applies. With damping on only a `damping_factor` share is applied per
/// update and the remainder decays, so motion eases out over frames.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub position: DVec3,
    pub target: DVec3,
    pub zoom: f64,
    config: ResolvedCameraConfig,
    delta: Spherical,
    pan_offset: DVec3,
    scale: f64,
}

impl OrbitControls {
    pub fn new(config: ResolvedCameraConfig) -> Self {
        let mut controls = Self {
            position: config.initial_position,
            target: DVec3::ZERO,
            zoom: 1.0,
            config,
            delta: Spherical::default(),
            pan_offset: DVec3::ZERO,
            scale: 1.0,
        };
        controls.update();
        controls
    }

    pub fn config(&self) -> &ResolvedCameraConfig {
        &self.config
    }

    /// Swap limits and speeds without moving the camera
    pub fn configure(&mut self, config: ResolvedCameraConfig) {
        self.config = config;
    }

    /// Vertical field of view in radians
    pub fn fov_radians(&self) -> f64 {
        self.config.fov.to_radians()
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn forward(&self) -> DVec3 {
        (self.target - self.position).normalize_or(DVec3::NEG_Z)
    }

    pub fn right(&self) -> DVec3 {
        self.forward().cross(DVec3::Y).normalize_or(DVec3::X)
    }

    pub fn up(&self) -> DVec3 {
        self.right().cross(self.forward()).normalize_or(DVec3::Y)
    }

    /// Whether pending input would still move the camera
    pub fn is_moving(&self) -> bool {
        self.delta.theta.abs() > MOTION_EPSILON
            || self.delta.phi.abs() > MOTION_EPSILON
            || self.pan_offset.length_squared() > MOTION_EPSILON * MOTION_EPSILON
            || (self.scale - 1.0).abs() > MOTION_EPSILON
    }

    /// Drop pending input
    pub fn stop(&mut self) {
        self.delta = Spherical::default();
        self.pan_offset = DVec3::ZERO;
        self.scale = 1.0;
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.delta.phi -= angle;
    }

    /// Drag rotation in pixels; a drag across the full viewport height is one
    /// full turn at rotate speed 1
    pub fn rotate(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        if viewport_height <= 0.0 {
            return;
        }
        let speed = self.config.rotate_speed;
        self.rotate_left(2.0 * PI * dx / viewport_height * speed);
        self.rotate_up(2.0 * PI * dy / viewport_height * speed);
    }

    pub fn pan_left(&mut self, distance: f64) {
        self.pan_offset -= self.right() * distance;
    }

    pub fn pan_up(&mut self, distance: f64) {
        let axis = if self.config.screen_space_panning {
            self.up()
        } else {
            DVec3::Y.cross(self.right())
        };
        self.pan_offset += axis * distance;
    }

    /// Drag panning in pixels, scaled so the point under the cursor follows it
    pub fn pan(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        if viewport_height <= 0.0 {
            return;
        }
        let target_distance = self.distance() * (self.fov_radians() / 2.0).tan();
        let speed = self.config.pan_speed;
        self.pan_left(2.0 * dx * target_distance / viewport_height * speed);
        self.pan_up(2.0 * dy * target_distance / viewport_height * speed);
    }

    fn zoom_scale(&self) -> f64 {
        0.95_f64.powf(self.config.zoom_speed)
    }

    pub fn dolly_in(&mut self, factor: f64) {
        if factor > 0.0 {
            self.scale *= factor;
        }
    }

    pub fn dolly_out(&mut self, factor: f64) {
        if factor > 0.0 {
            self.scale /= factor;
        }
    }

    /// Wheel zoom, positive steps move closer
    pub fn zoom(&mut self, steps: f64) {
        let factor = self.zoom_scale().powf(steps.abs());
        if steps >= 0.0 {
            self.dolly_in(factor);
        } else {
            self.dolly_out(factor);
        }
    }

    /// Apply pending input and clamps. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let previous = self.position;
        let config = self.config;
        let mut spherical = Spherical::from_offset(self.position - self.target);

        let weight = if config.enable_damping {
            config.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.delta.theta * weight;
        spherical.phi += self.delta.phi * weight;

        spherical.phi = spherical
            .phi
            .clamp(config.min_polar_angle, config.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);
        spherical.radius =
            (spherical.radius * self.scale).clamp(config.min_distance, config.max_distance);

        self.target += self.pan_offset * weight;
        self.position = self.target + spherical.to_offset();

        if config.enable_damping {
            let decay = 1.0 - config.damping_factor;
            self.delta.theta *= decay;
            self.delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.delta = Spherical::default();
            self.pan_offset = DVec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(self.position) > MOTION_EPSILON * MOTION_EPSILON
    }

    pub fn state(&self) -> CameraState {
        let rotation = if self.distance() > MOTION_EPSILON {
            let view = DMat4::look_at_rh(self.position, self.target, DVec3::Y);
            let (x, y, z) = DQuat::from_mat4(&view.inverse()).to_euler(EulerRot::XYZ);
            DVec3::new(x, y, z)
        } else {
            DVec3::ZERO
        };

        CameraState {
            target: self.target,
            position: self.position,
            zoom: self.zoom,
            rotation,
            distance: self.distance(),
        }
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(ResolvedCameraConfig::default())
    }
}

/// [`CameraControl`] implementation over optional orbit controls.
///
/// Controls exist only after [`CameraController::mount`]; before that every
/// operation is a no-op and [`CameraControl::camera_state`] returns `None`.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    config: ResolvedCameraConfig,
    controls: Option<OrbitControls>,
}

impl CameraController {
    pub fn new(config: ResolvedCameraConfig) -> Self {
        Self {
            config,
            controls: None,
        }
    }

    /// Create the orbit controls at the initial position
    pub fn mount(&mut self) {
        if self.controls.is_none() {
            self.controls = Some(OrbitControls::new(self.config));
            log::debug!("Camera mounted at {}", self.config.initial_position);
        }
    }

    pub fn unmount(&mut self) {
        self.controls = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.controls.is_some()
    }

    pub fn config(&self) -> &ResolvedCameraConfig {
        &self.config
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.as_ref()
    }

    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.controls.as_mut()
    }

    /// Install a new configuration and move the camera to its initial
    /// position looking at the origin
    pub fn apply_config(&mut self, config: ResolvedCameraConfig) {
        self.config = config;
        if let Some(controls) = self.controls.as_mut() {
            controls.configure(config);
            controls.stop();
            controls.position = config.initial_position;
            controls.target = DVec3::ZERO;
            controls.update();
        }
        log::debug!(
            "Camera configured: initial position {}, distance {}..{}",
            config.initial_position,
            config.min_distance,
            config.max_distance
        );
    }

    /// Once-per-frame damping step
    pub fn tick(&mut self) -> bool {
        self.controls.as_mut().is_some_and(OrbitControls::update)
    }
}

impl CameraControl for CameraController {
    fn reset(&mut self) {
        let config = self.config;
        if let Some(controls) = self.controls.as_mut() {
            controls.stop();
            controls.position = controls
                .position
                .lerp(config.initial_position, config.smoothing_factor);
            controls.target = controls.target.lerp(DVec3::ZERO, config.smoothing_factor);
            controls.update();
        }
    }

    fn update(&mut self) {
        if let Some(controls) = self.controls.as_mut() {
            controls.update();
        }
    }

    fn camera_state(&self) -> Option<CameraState> {
        self.controls.as_ref().map(OrbitControls::state)
    }

    fn set_target(&mut self, target: DVec3) {
        if let Some(controls) = self.controls.as_mut() {
            controls.target = target;
            controls.update();
        }
    }

    fn set_position(&mut self, position: DVec3) {
        if let Some(controls) = self.controls.as_mut() {
            controls.position = position;
            controls.update();
        }
    }

    fn zoom_to_fit(&mut self, bounds: &Aabb) {
        let Some(controls) = self.controls.as_mut() else {
            return;
        };
        if bounds.is_empty() {
            log::debug!("Ignoring zoom-to-fit on empty bounds");
            return;
        }

        let center = bounds.center();
        let distance = bounds.max_dimension() / (2.0 * (controls.fov_radians() / 2.0).tan());
        let direction = (controls.position - controls.target)
            .normalize_or(DEFAULT_INITIAL_POSITION.normalize());

        controls.stop();
        controls.position = center + direction * distance;
        controls.target = center;
        controls.update();
    }
}
