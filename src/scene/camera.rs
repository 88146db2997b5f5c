use glam::{Mat4, Vec3};

/// Distance of the eye from the orbit center.
pub const ORBIT_RADIUS: f32 = 10.0;
/// Radians per pixel of mouse travel.
pub const MOUSE_SENSITIVITY: f32 = 0.005;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Eye offset for the given orbit angles (radians).
pub fn forward_vector(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw_sin, yaw_cos) = yaw.sin_cos();
    let (pitch_sin, pitch_cos) = pitch.sin_cos();
    Vec3::new(
        ORBIT_RADIUS * yaw_cos,
        ORBIT_RADIUS * pitch_sin,
        ORBIT_RADIUS * yaw_sin * pitch_cos,
    )
}

/// Orbit camera: the eye sits at `forward` and looks at `position`.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // degrees
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            forward: forward_vector(0.0, 0.0),
            up: Vec3::Y,
            fov: 45.0,
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.forward
    }

    pub fn refresh_forward(&mut self) {
        self.forward = forward_vector(self.yaw, self.pitch);
    }

    /// Applies a drag of `dx`, `dy` pixels (`dy` positive upwards).
    /// Each axis is updated only when it actually moved.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        if dx != 0.0 {
            self.yaw += dx * MOUSE_SENSITIVITY;
        }
        if dy != 0.0 {
            self.pitch = (self.pitch + dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.refresh_forward();
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.position, self.up)
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.build_projection_matrix() * self.build_view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_initialization() {
        let camera = Camera::new(Vec3::ZERO, 800.0 / 600.0);
        assert_eq!(camera.position, Vec3::ZERO);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
        assert_eq!(camera.up, Vec3::Y);
        assert_eq!(camera.fov, 45.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
        // Usable before any mouse input arrives.
        assert_eq!(camera.forward, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_forward_vector_at_rest() {
        let forward = forward_vector(0.0, 0.0);
        assert_relative_eq!(forward.x, 10.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_forward_vector_formula() {
        let samples = [
            (0.3_f32, -0.2_f32),
            (1.2, 0.7),
            (-2.5, 1.1),
            (std::f32::consts::PI, -1.4),
        ];
        for (yaw, pitch) in samples {
            let forward = forward_vector(yaw, pitch);
            assert_relative_eq!(forward.x, 10.0 * yaw.cos(), epsilon = 1e-5);
            assert_relative_eq!(forward.y, 10.0 * pitch.sin(), epsilon = 1e-5);
            assert_relative_eq!(forward.z, 10.0 * yaw.sin() * pitch.cos(), epsilon = 1e-5);
            // No hidden state.
            assert_eq!(forward, forward_vector(yaw, pitch));
        }
    }

    #[test]
    fn test_mouse_movement() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);

        camera.process_mouse(10.0, 0.0);
        assert_relative_eq!(camera.yaw, 0.05, epsilon = 1e-6);
        assert_eq!(camera.pitch, 0.0);

        camera.process_mouse(0.0, 20.0);
        assert_relative_eq!(camera.yaw, 0.05, epsilon = 1e-6);
        assert_relative_eq!(camera.pitch, 0.1, epsilon = 1e-6);

        // Diagonal drags move both angles.
        camera.process_mouse(-10.0, -20.0);
        assert_relative_eq!(camera.yaw, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.pitch, 0.0, epsilon = 1e-6);

        assert_eq!(camera.forward, forward_vector(camera.yaw, camera.pitch));
    }

    #[test]
    fn test_pitch_clamping() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.process_mouse(0.0, 10_000.0);
        assert_relative_eq!(camera.pitch, 89.0_f32.to_radians(), epsilon = 1e-5);

        camera.process_mouse(0.0, -100_000.0);
        assert_relative_eq!(camera.pitch, -89.0_f32.to_radians(), epsilon = 1e-5);
    }

    #[test]
    fn test_view_looks_at_target() {
        let camera = Camera::new(Vec3::ZERO, 1.0);
        let view = camera.build_view_matrix();

        // The orbit center lies straight ahead on -Z in view space.
        let center = view.transform_point3(Vec3::ZERO);
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.z, -10.0, epsilon = 1e-5);

        // The eye maps to the view-space origin.
        let eye = view.transform_point3(camera.eye());
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn test_view_matrix_changes() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        let initial_matrix = camera.build_view_projection_matrix();

        camera.process_mouse(40.0, 0.0);
        let rotated_matrix = camera.build_view_projection_matrix();
        assert_ne!(initial_matrix, rotated_matrix);

        camera.aspect = 2.0;
        assert_ne!(rotated_matrix, camera.build_view_projection_matrix());
    }
}
