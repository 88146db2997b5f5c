pub const ZOOM_STEP: f32 = 0.1;
pub const MIN_ZOOM: f32 = 0.2;

/// Uniform scale accumulated by the zoom drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub scale: f32,
}

impl ZoomState {
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    pub fn grow(&mut self) {
        self.scale += ZOOM_STEP;
    }

    pub fn shrink(&mut self) {
        self.scale = (self.scale - ZOOM_STEP).max(MIN_ZOOM);
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zoom_steps() {
        let mut zoom = ZoomState::new();
        zoom.grow();
        zoom.grow();
        assert_relative_eq!(zoom.scale, 1.2, epsilon = 1e-6);
        zoom.shrink();
        assert_relative_eq!(zoom.scale, 1.1, epsilon = 1e-6);
    }

    #[test]
    fn test_zoom_floor() {
        let mut zoom = ZoomState::new();
        for _ in 0..50 {
            zoom.shrink();
        }
        assert_eq!(zoom.scale, MIN_ZOOM);
    }
}
