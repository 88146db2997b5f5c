use glam::{Mat4, Vec3};

/// Placement of one drawable. Every draw builds its matrix from identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let scale = Mat4::from_scale(self.scale);
        translation * scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
