pub mod camera;
pub mod lights;
pub mod transform;
pub mod zoom;

pub use camera::Camera;
pub use lights::{LightRig, PointLight};
pub use transform::Transform;
pub use zoom::ZoomState;

use glam::{Mat4, Vec3};

use crate::config::{ViewerConfig, ZoomTarget};
use crate::model::geometry::{CHAIR_VERTEX_COUNT, MARKER_VERTEX_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneObject {
    Chair,
    KeyLight,
    FillLight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub object: SceneObject,
    pub model: Mat4,
    pub vertex_count: u32,
}

/// Everything the renderer needs for one frame, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub viewport: Viewport,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
    pub lights: LightRig,
    pub draws: [DrawCall; 3],
}

/// Camera, lights and window state shared by the input handlers and the
/// renderer.
pub struct SceneState {
    pub camera: Camera,
    pub lights: LightRig,
    pub chair: Transform,
    pub viewport: Viewport,
    pub zoom: ZoomState,
    pub zoom_target: ZoomTarget,
}

impl SceneState {
    pub fn new(width: u32, height: u32) -> Self {
        let viewport = Viewport { width, height };
        Self {
            camera: Camera::new(Vec3::ZERO, viewport.aspect()),
            lights: LightRig::new(),
            chair: Transform::new(),
            viewport,
            zoom: ZoomState::new(),
            zoom_target: ZoomTarget::Detached,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut scene = Self::new(config.width, config.height);
        scene.zoom_target = config.zoom_target;
        scene
    }

    /// Returns false and leaves the state alone for a zero-sized window.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.viewport = Viewport { width, height };
        self.camera.aspect = self.viewport.aspect();
        true
    }

    pub fn chair_transform(&self) -> Transform {
        match self.zoom_target {
            ZoomTarget::Detached => self.chair,
            ZoomTarget::Chair => Transform {
                scale: self.chair.scale * self.zoom.scale,
                ..self.chair
            },
        }
    }

    fn marker_draw(&self, object: SceneObject, position: Vec3) -> DrawCall {
        let transform = Transform::from_position_scale(position, self.lights.marker_scale);
        DrawCall {
            object,
            model: transform.to_matrix(),
            vertex_count: MARKER_VERTEX_COUNT as u32,
        }
    }

    pub fn frame(&self) -> FramePlan {
        let chair = DrawCall {
            object: SceneObject::Chair,
            model: self.chair_transform().to_matrix(),
            vertex_count: CHAIR_VERTEX_COUNT as u32,
        };

        FramePlan {
            viewport: self.viewport,
            view: self.camera.build_view_matrix(),
            projection: self.camera.build_projection_matrix(),
            view_position: self.camera.eye(),
            lights: self.lights,
            draws: [
                chair,
                self.marker_draw(SceneObject::KeyLight, self.lights.key.position),
                self.marker_draw(SceneObject::FillLight, self.lights.fill.position),
            ],
        }
    }
}
