//! Perspective camera with damped orbit controls.
//!
//! The controller stores user input as a pending spherical delta. Each
//! [`OrbitControls::update`] applies a fraction of it (`damping_factor`) and
//! decays the rest, which gives the camera its glide after the pointer is
//! released.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};

use crate::config::CameraSettings;

/// Converts OpenGL-style clip space (z in -1..1) to wgpu's (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const POLAR_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: f32, height: f32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// `width / height`, falling back to 1 for a zero-height viewport.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height > 0.0 { width / height } else { 1.0 }
}

/// Radius and angles around the orbit target, y up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle measured from +y.
    phi: f32,
    /// Azimuth around y, measured from +z towards +x.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending: Spherical,
    scale: f32,
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending: Spherical::default(),
            scale: 1.0,
        }
    }

    /// Pointer drag by `(dx, dy)` pixels on a viewport `height` pixels tall.
    pub fn handle_drag(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        let per_pixel = 2.0 * PI * self.rotate_speed / height;
        self.pending.theta -= dx * per_pixel;
        self.pending.phi -= dy * per_pixel;
    }

    /// Wheel input in notches; positive values move the camera closer.
    pub fn handle_scroll(&mut self, notches: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        self.scale *= step.powf(notches);
    }

    pub fn is_settled(&self) -> bool {
        self.pending.theta.abs() < 1e-6 && self.pending.phi.abs() < 1e-6 && self.scale == 1.0
    }

    /// Advance the camera one frame towards the pending input.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_offset(offset);

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.pending.theta * factor;
        spherical.phi += self.pending.phi * factor;
        spherical.phi = spherical.phi.clamp(POLAR_EPS, PI - POLAR_EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = Point3::from_vec(camera.target.to_vec() + spherical.to_offset());

        if self.enable_damping {
            self.pending.theta *= 1.0 - self.damping_factor;
            self.pending.phi *= 1.0 - self.damping_factor;
        } else {
            self.pending = Spherical::default();
        }
        self.scale = 1.0;
    }
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    pub camera: Camera,
    pub projection: Projection,
    pub controls: OrbitControls,
}

impl CameraRig {
    pub fn new(settings: &CameraSettings, width: f32, height: f32) -> Self {
        Self {
            camera: Camera {
                position: settings.position,
                target: settings.target,
            },
            projection: Projection::new(
                width,
                height,
                cgmath::Deg(settings.fov_deg),
                settings.near,
                settings.far,
            ),
            controls: OrbitControls::new(settings.damping_factor),
        }
    }

    pub fn update(&mut self) {
        self.controls.update(&mut self.camera);
    }

    pub fn uniform(&self) -> CameraUniform {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&self.camera, &self.projection);
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        let view = camera.view_matrix();
        self.view = view.into();
        self.view_proj = (projection.calc_matrix() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(&CameraSettings::default(), 800.0, 600.0)
    }

    fn distance(camera: &Camera) -> f32 {
        (camera.position - camera.target).magnitude()
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vector3::new(4.0, 2.0, 4.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn update_without_input_keeps_the_camera() {
        let mut rig = rig();
        let start = rig.camera.position;
        rig.update();
        assert!((rig.camera.position - start).magnitude() < 1e-5);
        assert!(rig.controls.is_settled());
    }

    #[test]
    fn drag_glides_and_settles() {
        let mut rig = rig();
        let radius = distance(&rig.camera);
        rig.controls.handle_drag(100.0, 0.0, 600.0);

        rig.update();
        let first = rig.camera.position;
        rig.update();
        let second = rig.camera.position;
        assert!((first - second).magnitude() > 0.0, "damping keeps moving");
        assert!((distance(&rig.camera) - radius).abs() < 1e-4, "rotation keeps the radius");

        for _ in 0..1000 {
            rig.update();
        }
        assert!(rig.controls.is_settled());
    }

    #[test]
    fn scroll_moves_closer() {
        let mut rig = rig();
        let radius = distance(&rig.camera);
        rig.controls.handle_scroll(1.0);
        rig.update();
        assert!((distance(&rig.camera) - radius * 0.95).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut rig = rig();
        rig.controls.enable_damping = false;
        rig.controls.handle_drag(0.0, 10_000.0, 600.0);
        rig.update();
        assert!(rig.camera.position.y > 0.0);
        assert!(rig.camera.position.x.is_finite());
    }

    #[test]
    fn aspect_follows_viewport() {
        let rig = rig();
        assert!((rig.projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(aspect_ratio(10.0, 0.0), 1.0);
    }
}
