/// Axis-aligned rectangles in pixel space.
///
/// `x`/`y` is the top-left corner, `y` grows downward. Intersection is
/// strict: rectangles that only share an edge do not overlap, so a body
/// resting exactly on a surface is not "inside" it.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 { self.x }
    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }
    #[inline]
    pub fn top(&self) -> f32 { self.y }
    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn set_left(&mut self, left: f32) { self.x = left; }
    pub fn set_right(&mut self, right: f32) { self.x = right - self.w; }
    pub fn set_top(&mut self, top: f32) { self.y = top; }
    pub fn set_bottom(&mut self, bottom: f32) { self.y = bottom - self.h; }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 64.0, 64.0);
        let below = Rect::new(0.0, 64.0, 64.0, 15.0);
        let beside = Rect::new(64.0, 0.0, 64.0, 64.0);
        assert!(!a.intersects(&below));
        assert!(!a.intersects(&beside));
    }

    #[test]
    fn partial_overlap_intersects_both_ways() {
        let a = Rect::new(0.0, 0.0, 64.0, 64.0);
        let b = Rect::new(63.5, 10.0, 64.0, 64.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(10.0, 10.0, 64.0, 64.0);
        r.set_bottom(640.0);
        assert_eq!(r.top(), 576.0);
        r.set_right(960.0);
        assert_eq!(r.left(), 896.0);
        assert_eq!((r.w, r.h), (64.0, 64.0));
    }
}
