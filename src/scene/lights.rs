use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

/// Key and fill lights plus the size of the cubes marking them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub key: PointLight,
    pub fill: PointLight,
    pub marker_scale: Vec3,
}

impl LightRig {
    pub fn new() -> Self {
        Self {
            key: PointLight {
                position: Vec3::new(-1.0, 1.0, -6.0),
                color: Vec3::new(0.0, 1.0, 0.0),
            },
            fill: PointLight {
                position: Vec3::new(3.0, 0.0, 0.0),
                color: Vec3::ONE,
            },
            marker_scale: Vec3::splat(0.3),
        }
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}
