//! Axis-aligned rectangle math
//!
//! All spatial queries in the simulation go through `Rect`: intersection
//! tests, overlap areas for picking the most-touched brick, and contact
//! side determination. Pure functions, no side effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side of a rectangle involved in a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// The side across the same axis (Left <-> Right, Top <-> Bottom).
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// An axis-aligned rectangle. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w >= 0.0 && h >= 0.0);
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Whether two rectangles overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Overlap rectangle of two rectangles, or `None` when disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// Which side of `target` a moving rectangle touched, derived from the
/// overlap rectangle's aspect: a wide overlap means vertical contact
/// (Top/Bottom), a tall one horizontal (Left/Right).
pub fn contact_side(moving: &Rect, target: &Rect, overlap: &Rect) -> Side {
    if overlap.size.x > overlap.size.y {
        if moving.top() < target.top() {
            Side::Top
        } else {
            Side::Bottom
        }
    } else if moving.left() < target.left() {
        Side::Left
    } else {
        Side::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center() {
        let r = Rect::new(10.0, 20.0, 50.0, 20.0);
        assert_eq!(r.center(), Vec2::new(35.0, 30.0));
    }

    #[test]
    fn test_intersects_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_intersection_rect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(6.0, 4.0, 10.0, 10.0);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Rect::new(6.0, 4.0, 4.0, 6.0));
    }

    #[test]
    fn test_contact_side_vertical() {
        // Ball above the brick, wide shallow overlap -> Top
        let brick = Rect::new(100.0, 100.0, 50.0, 20.0);
        let ball = Rect::new(110.0, 88.0, 16.0, 16.0);
        let overlap = ball.intersection(&brick).unwrap();
        assert!(overlap.size.x > overlap.size.y);
        assert_eq!(contact_side(&ball, &brick, &overlap), Side::Top);

        // Ball below -> Bottom
        let ball = Rect::new(110.0, 116.0, 16.0, 16.0);
        let overlap = ball.intersection(&brick).unwrap();
        assert_eq!(contact_side(&ball, &brick, &overlap), Side::Bottom);
    }

    #[test]
    fn test_contact_side_horizontal() {
        // Ball left of the brick, tall narrow overlap -> Left
        let brick = Rect::new(100.0, 100.0, 50.0, 20.0);
        let ball = Rect::new(88.0, 102.0, 16.0, 16.0);
        let overlap = ball.intersection(&brick).unwrap();
        assert!(overlap.size.y > overlap.size.x);
        assert_eq!(contact_side(&ball, &brick, &overlap), Side::Left);

        // Ball right of the brick -> Right
        let ball = Rect::new(146.0, 102.0, 16.0, 16.0);
        let overlap = ball.intersection(&brick).unwrap();
        assert_eq!(contact_side(&ball, &brick, &overlap), Side::Right);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Top.opposite(), Side::Bottom);
    }

    proptest! {
        #[test]
        fn prop_intersection_within_both(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.0f32..200.0, ah in 0.0f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.0f32..200.0, bh in 0.0f32..200.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            if let Some(overlap) = a.intersection(&b) {
                prop_assert!(a.intersects(&b));
                prop_assert!(overlap.area() <= a.area() + 1e-3);
                prop_assert!(overlap.area() <= b.area() + 1e-3);
                prop_assert!(overlap.left() >= a.left() - 1e-3);
                prop_assert!(overlap.right() <= a.right() + 1e-3);
            } else {
                prop_assert!(!a.intersects(&b));
            }
        }

        #[test]
        fn prop_intersection_commutative(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
        ) {
            let a = Rect::new(ax, ay, 50.0, 20.0);
            let b = Rect::new(bx, by, 16.0, 16.0);
            prop_assert_eq!(a.intersection(&b), b.intersection(&a));
        }
    }
}
