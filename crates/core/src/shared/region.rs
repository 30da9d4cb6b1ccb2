/// Width/height pair in pixels, used for classifier minimum sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions by `ratio`, truncating toward zero.
    pub fn scaled(width: u32, height: u32, ratio: f64) -> Self {
        Self {
            width: scale(width as i32, ratio),
            height: scale(height as i32, ratio),
        }
    }
}

/// Axis-aligned rectangle in image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Moves the region from the coordinate frame of a crop into the frame
    /// the crop was taken from, given the crop's top-left corner.
    pub fn offset_by(&self, origin: &Region) -> Region {
        Region {
            x: self.x + origin.x,
            y: self.y + origin.y,
            ..*self
        }
    }

    /// Keeps the top-left corner and width, scaling the height by `ratio`.
    pub fn top_band(&self, ratio: f64) -> Region {
        Region {
            height: scale(self.height, ratio),
            ..*self
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with a `width` x `height` frame anchored at the origin.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(width as i32);
        let y2 = self.bottom().min(height as i32);
        let clamped = Region::new(x1, y1, x2 - x1, y2 - y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

fn scale(value: i32, ratio: f64) -> i32 {
    (value as f64 * ratio) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_offset_by_adds_origin_corner() {
        let eye = Region::new(10, 10, 30, 30);
        let face = Region::new(100, 50, 200, 200);
        assert_eq!(eye.offset_by(&face), Region::new(110, 60, 30, 30));
    }

    #[rstest]
    #[case(Region::new(0, 0, 10, 10), Region::new(0, 0, 1, 1))]
    #[case(Region::new(5, 7, 3, 4), Region::new(-2, 9, 1, 1))]
    #[case(Region::new(150, 10, 30, 30), Region::new(100, 50, 200, 200))]
    fn test_offset_by_keeps_size(#[case] local: Region, #[case] origin: Region) {
        let moved = local.offset_by(&origin);
        assert_eq!(moved.x, local.x + origin.x);
        assert_eq!(moved.y, local.y + origin.y);
        assert_eq!((moved.width, moved.height), (local.width, local.height));
    }

    #[rstest]
    #[case::exact(200, 0.6, 120)]
    #[case::truncated(101, 0.6, 60)]
    #[case::zero(0, 0.6, 0)]
    fn test_top_band_height(#[case] height: i32, #[case] ratio: f64, #[case] expected: i32) {
        let band = Region::new(3, 4, 50, height).top_band(ratio);
        assert_eq!(band, Region::new(3, 4, 50, expected));
    }

    #[rstest]
    #[case::vga(640, 480, Size::new(160, 120))]
    #[case::odd(641, 479, Size::new(160, 119))]
    #[case::tiny(3, 3, Size::new(0, 0))]
    fn test_scaled_size_truncates(#[case] w: u32, #[case] h: u32, #[case] expected: Size) {
        assert_eq!(Size::scaled(w, h, 0.25), expected);
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[test]
    fn test_clamp_trims_overhang() {
        let r = Region::new(-5, 90, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(Region::new(0, 90, 15, 10)));
    }

    #[rstest]
    #[case::outside(Region::new(200, 200, 10, 10))]
    #[case::zero_width(Region::new(0, 0, 0, 10))]
    #[case::negative_height(Region::new(0, 0, 10, -1))]
    fn test_clamp_empty_is_none(#[case] r: Region) {
        assert!(r.clamp_to(100, 100).is_none());
    }
}
