//! Fixed look-at camera shared by both render passes.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Perspective camera defined by eye position, target, and projection
/// parameters. The camera never moves at runtime; only its aspect ratio
/// tracks the window.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Build a camera from config values and an initial viewport size.
    #[must_use]
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Vec3::from_array(config.eye),
            target: Vec3::from_array(config.target),
            up: Vec3::from_array(config.up),
            aspect: 1.0,
            fovy: config.fovy_deg,
            znear: config.znear,
            zfar: config.zfar,
        };
        camera.set_aspect(width, height);
        camera
    }

    /// Track the viewport so the projection follows window resizes.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * view
    }
}

/// GPU uniform buffer holding the combined view-projection matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    /// Update the matrix from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn reference_camera() -> Camera {
        Camera::from_config(&CameraConfig::default(), 640, 480)
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = reference_camera();
        let ndc = camera.build_matrix().project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn aspect_follows_viewport() {
        let mut camera = reference_camera();
        assert!((camera.aspect - 640.0 / 480.0).abs() < 1e-6);
        camera.set_aspect(800, 400);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        // Degenerate sizes must not divide by zero.
        camera.set_aspect(100, 0);
        assert!(camera.aspect.is_finite());
    }

    #[test]
    fn points_behind_far_plane_leave_unit_depth() {
        let camera = reference_camera();
        let matrix = camera.build_matrix();
        // Just past the eye, along the view direction.
        let near_point = matrix.project_point3(Vec3::new(0.0, -0.9, 0.0));
        let far_point = matrix.project_point3(Vec3::new(0.0, 150.0, 0.0));
        assert!((0.0..=1.0).contains(&near_point.z));
        assert!(far_point.z > 1.0);
    }

    #[test]
    fn uniform_tracks_camera() {
        let camera = reference_camera();
        let mut uniform = CameraUniform::new();
        assert_eq!(uniform.view_proj, Mat4::IDENTITY.to_cols_array_2d());
        uniform.update_view_proj(&camera);
        assert_eq!(
            uniform.view_proj,
            camera.build_matrix().to_cols_array_2d()
        );
    }
}
