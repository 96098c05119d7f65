//! Layout rectangles and their mapping onto the shared drawing surface.
//!
//! Layout sources report CSS-pixel boxes with a top-left origin. Draw
//! regions are device-pixel boxes measured from the bottom-left of the
//! surface. Rounding happens per edge, so elements that touch in layout
//! produce regions that touch but never overlap.

use glam::Mat4;

/// Element box in CSS pixels, as returned by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ElementRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Something whose on-screen box can be read every frame.
pub trait LayoutProvider {
    fn bounding_rect(&self) -> ElementRect;

    /// Device pixels per CSS pixel.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Device-pixel region, origin at the bottom-left of the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportRect {
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Region for `element` inside a surface whose element box is `surface`.
    /// `vertical_extent` stretches the region upward from the element's
    /// bottom edge.
    pub fn from_layout(
        element: ElementRect,
        surface: ElementRect,
        pixel_ratio: f32,
        vertical_extent: f32,
    ) -> Self {
        let px = |v: f32| (v * pixel_ratio).round() as i32;
        let left = px(element.left - surface.left);
        let right = px(element.right - surface.left);
        let from_bottom = surface.bottom - element.bottom;
        let bottom = px(from_bottom);
        let top = px(from_bottom + element.height() * vertical_extent);
        Self {
            left,
            bottom,
            width: (right - left).max(0) as u32,
            height: (top - bottom).max(0) as u32,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn top(&self) -> i32 {
        self.bottom + self.height as i32
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> Option<f32> {
        (!self.is_degenerate()).then(|| self.width as f32 / self.height as f32)
    }

    pub fn intersects(&self, other: &ViewportRect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.bottom < other.top()
            && other.bottom < self.top()
    }

    /// Part of this region that lies on the surface, or `None` if nothing
    /// does.
    pub fn clamp_to(&self, surface: SurfaceSize) -> Option<ViewportRect> {
        let x0 = self.left.max(0);
        let y0 = self.bottom.max(0);
        let x1 = self.right().min(surface.width as i32);
        let y1 = self.top().min(surface.height as i32);
        (x1 > x0 && y1 > y0).then(|| ViewportRect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// `(x, y, width, height)` with a top-left origin, as GPU APIs expect.
    /// Only meaningful for regions already clamped to the surface.
    pub fn top_left_origin(&self, surface: SurfaceSize) -> (u32, u32, u32, u32) {
        let y = surface.height as i32 - self.top();
        (self.left.max(0) as u32, y.max(0) as u32, self.width, self.height)
    }

    /// Clip-space transform that makes a projection built for `self` land
    /// correctly when rasterized into the smaller `visible` region.
    pub fn clip_correction(&self, visible: &ViewportRect) -> Mat4 {
        if visible == self || visible.is_degenerate() {
            return Mat4::IDENTITY;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        let (cw, ch) = (visible.width as f32, visible.height as f32);
        let sx = w / cw;
        let sy = h / ch;
        let tx = (2.0 * (self.left - visible.left) as f32 + w) / cw - 1.0;
        let ty = (2.0 * (self.bottom - visible.bottom) as f32 + h) / ch - 1.0;
        Mat4::from_cols(
            glam::Vec4::new(sx, 0.0, 0.0, 0.0),
            glam::Vec4::new(0.0, sy, 0.0, 0.0),
            glam::Vec4::new(0.0, 0.0, 1.0, 0.0),
            glam::Vec4::new(tx, ty, 0.0, 1.0),
        )
    }
}
