//! Geometry APIs
//!
//! DOMRect as reported by `getBoundingClientRect`.

/// DOMRect - rectangle geometry in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    /// Vertical midpoint
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Grow outward by `margin` on every side
    pub fn inflate(&self, margin: f64) -> DOMRect {
        DOMRect::from_xywh(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = DOMRect::from_xywh(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center_y(), 40.0);
        assert!(r.contains_point(15.0, 25.0));
        assert!(!r.contains_point(5.0, 25.0));
    }

    #[test]
    fn test_inflate() {
        let r = DOMRect::from_xywh(10.0, 10.0, 100.0, 20.0).inflate(4.0);
        assert_eq!(r, DOMRect::from_xywh(6.0, 6.0, 108.0, 28.0));
    }
}
