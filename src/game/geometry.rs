//! Overlap and Segment Tests
//!
//! AABB overlap per axis for the collision resolver, and a segment
//! intersection test used for line-of-sight checks against tiles.

use macroquad::math::{Rect, Vec2};

/// Cross products smaller than this are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Overlap of two rectangles on each axis, clamped to >= 0.
/// Zero on either axis means the rectangles do not intersect.
pub fn overlap(a: Rect, b: Rect) -> Vec2 {
    let x = a.right().min(b.right()) - a.left().max(b.left());
    let y = a.bottom().min(b.bottom()) - a.top().max(b.top());
    Vec2::new(x.max(0.0), y.max(0.0))
}

/// True when both overlap components are positive.
pub fn intersects(a: Rect, b: Rect) -> bool {
    let o = overlap(a, b);
    o.x > 0.0 && o.y > 0.0
}

/// Which axis a collision is resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The axis with the smaller overlap. Ties resolve on Y so that a body
    /// landing on a corner settles on top instead of sliding off.
    pub fn of_least_overlap(overlap: Vec2) -> Axis {
        if overlap.x < overlap.y {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

/// -1.0 when `from` lies before `to` on the axis, else 1.0.
/// Coincident centers push toward the negative side.
pub fn separation_sign(from: f32, to: f32) -> f32 {
    if from <= to {
        -1.0
    } else {
        1.0
    }
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn intervals_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
    a0.min(a1) <= b0.max(b1) && b0.min(b1) <= a0.max(a1)
}

/// Parametric segment intersection test.
///
/// Near-parallel segments take the collinear branch, which reports a hit
/// when the segments' bounding intervals overlap on both axes.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let denom = cross(d1, d2);

    if denom.abs() < PARALLEL_EPSILON {
        return intervals_overlap(a1.x, a2.x, b1.x, b2.x)
            && intervals_overlap(a1.y, a2.y, b1.y, b2.y);
    }

    let offset = b1 - a1;
    let t = cross(offset, d2) / denom;
    let u = cross(offset, d1) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// The four edges of a rectangle: top, right, bottom, left.
pub fn rect_edges(rect: Rect) -> [(Vec2, Vec2); 4] {
    let tl = Vec2::new(rect.left(), rect.top());
    let tr = Vec2::new(rect.right(), rect.top());
    let br = Vec2::new(rect.right(), rect.bottom());
    let bl = Vec2::new(rect.left(), rect.bottom());
    [(tl, tr), (tr, br), (br, bl), (bl, tl)]
}

/// True if the segment crosses any edge of any blocking rectangle.
/// Stops at the first hit.
pub fn path_blocked<I>(start: Vec2, end: Vec2, blockers: I) -> bool
where
    I: IntoIterator<Item = Rect>,
{
    blockers.into_iter().any(|rect| {
        rect_edges(rect)
            .iter()
            .any(|&(e1, e2)| segments_intersect(start, end, e1, e2))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x - w / 2.0, y - h / 2.0, w, h)
    }

    #[test]
    fn test_overlap_per_axis() {
        let player = centered(100.0, 100.0, 80.0, 80.0);
        let tile = centered(100.0, 184.0, 96.0, 96.0);
        let o = overlap(player, tile);
        assert_eq!(o.x, 80.0);
        assert!((o.y - 4.0).abs() < 1e-4);
        assert_eq!(Axis::of_least_overlap(o), Axis::Y);
    }

    #[test]
    fn test_disjoint_rects_clamp_to_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        let o = overlap(a, b);
        assert_eq!(o.x, 0.0);
        assert!(o.y > 0.0);
        assert!(!intersects(a, b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(a, b));
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_out_of_range() {
        // Lines cross at (5,5) but the second segment stops short
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(4.0, 6.0),
        ));
    }

    #[test]
    fn test_collinear_overlap() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(15.0, 0.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_parallel_offset_segments() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        ));
    }

    #[test]
    fn test_sight_line_along_tile_top_is_blocked() {
        // Tile spans x 100..132, y 200..232; the sight line runs along y = 200
        let tile = Rect::new(100.0, 200.0, 32.0, 32.0);
        let start = Vec2::new(50.0, 200.0);
        let end = Vec2::new(120.0, 200.0);
        assert!(path_blocked(start, end, [tile]));
    }

    #[test]
    fn test_clear_path() {
        let tile = Rect::new(100.0, 200.0, 32.0, 32.0);
        assert!(!path_blocked(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0), [tile]));
        assert!(path_blocked(Vec2::new(0.0, 216.0), Vec2::new(300.0, 216.0), [tile]));
    }
}
