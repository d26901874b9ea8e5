//! The viewport rectangle: visibility gating and edge tests.

use glam::Vec2;

use crate::math::Rect;

/// The world-space window the host presents. Read by the default entity draw
/// (visibility) and by game logic (keeping things on screen); the engine
/// itself never moves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Top-left corner in world pixels.
    pub pos: Vec2,
    pub size: Vec2,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    pub fn viewport(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Visibility test used to gate the default sprite draw.
    pub fn in_view(&self, bounds: Rect) -> bool {
        bounds.overlaps(&self.viewport())
    }

    /// True if any side of `bounds` sticks out past the viewport edge.
    pub fn hits_edge(&self, bounds: Rect) -> bool {
        let view = self.viewport();
        if bounds.left() < view.left() {
            return true;
        }
        if bounds.top() < view.top() {
            return true;
        }
        if bounds.right() > view.right() {
            return true;
        }
        if bounds.bottom() > view.bottom() {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_view_matches_overlap() {
        let camera = Camera::new(256.0, 240.0);
        assert!(camera.in_view(Rect::new(10.0, 10.0, 16.0, 16.0)));
        assert!(camera.in_view(Rect::new(-8.0, 0.0, 16.0, 16.0)));
        assert!(!camera.in_view(Rect::new(-40.0, 0.0, 16.0, 16.0)));
        assert!(!camera.in_view(Rect::new(0.0, 300.0, 16.0, 16.0)));
    }

    #[test]
    fn edge_hits_on_every_side() {
        let camera = Camera::new(100.0, 100.0);
        assert!(camera.hits_edge(Rect::new(-1.0, 10.0, 10.0, 10.0)));
        assert!(camera.hits_edge(Rect::new(10.0, -1.0, 10.0, 10.0)));
        assert!(camera.hits_edge(Rect::new(95.0, 10.0, 10.0, 10.0)));
        assert!(camera.hits_edge(Rect::new(10.0, 95.0, 10.0, 10.0)));
    }

    #[test]
    fn fully_inside_does_not_hit_edges() {
        let camera = Camera::new(100.0, 100.0);
        assert!(!camera.hits_edge(Rect::new(10.0, 10.0, 10.0, 10.0)));
        // Exactly flush with the border still counts as inside.
        assert!(!camera.hits_edge(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn moved_camera_shifts_the_tests() {
        let mut camera = Camera::new(100.0, 100.0);
        camera.pos = Vec2::new(100.0, 0.0);
        assert!(!camera.in_view(Rect::new(0.0, 0.0, 16.0, 16.0)));
        assert!(camera.in_view(Rect::new(120.0, 10.0, 16.0, 16.0)));
        assert!(camera.hits_edge(Rect::new(90.0, 10.0, 16.0, 16.0)));
    }
}
