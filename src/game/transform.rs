//! Transform and Bounding Box
//!
//! Every simulated entity has a position and velocity in screen space
//! (x to the right, y downward). Collision uses an axis-aligned box centered
//! on the position: world rectangle = position ± half-size.

use macroquad::math::{Rect, Vec2};

/// Position, velocity and presentation scale/rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Units per second
    pub velocity: Vec2,
    pub scale: Vec2,
    /// Degrees, presentation only
    pub rotation: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Position and velocity contain no NaN/Inf.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned collision box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub size: Vec2,
    pub half_size: Vec2,
}

impl BoundingBox {
    /// Negative sizes are clamped to zero so the world rectangle never
    /// has negative extent.
    pub fn new(width: f32, height: f32) -> Self {
        let size = Vec2::new(width.max(0.0), height.max(0.0));
        Self {
            size,
            half_size: size * 0.5,
        }
    }

    pub fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    /// World-space rectangle for a box centered on `position`.
    pub fn rect_at(&self, position: Vec2) -> Rect {
        let min = position - self.half_size;
        Rect::new(min.x, min.y, self.size.x, self.size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_centered_on_position() {
        let bounds = BoundingBox::new(80.0, 40.0);
        let rect = bounds.rect_at(Vec2::new(100.0, 100.0));
        assert_eq!(rect.x, 60.0);
        assert_eq!(rect.y, 80.0);
        assert_eq!(rect.w, 80.0);
        assert_eq!(rect.h, 40.0);
        assert_eq!(rect.center(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let bounds = BoundingBox::new(-5.0, 10.0);
        assert_eq!(bounds.size.x, 0.0);
        assert_eq!(bounds.half_size.x, 0.0);
        let rect = bounds.rect_at(Vec2::ZERO);
        assert!(rect.w >= 0.0 && rect.h >= 0.0);
    }

    #[test]
    fn test_translate() {
        let mut t = Transform::from_position(Vec2::new(1.0, 2.0));
        t.translate(Vec2::new(3.0, -2.0));
        assert_eq!(t.position, Vec2::new(4.0, 0.0));
        assert!(t.is_finite());
    }
}
