//! Window-backed layout: the window is the shared surface and each scene owns
//! one cell of a grid laid over it.

use disco_core::{ElementRect, LayoutProvider};
use std::cell::Cell;
use std::rc::Rc;

/// Window size in logical pixels plus the scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowMetrics {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

pub type SharedMetrics = Rc<Cell<WindowMetrics>>;

/// Columns and rows for `count` cells: one row up to three, then square-ish.
pub fn grid_shape(count: usize) -> (usize, usize) {
    if count == 0 {
        return (1, 1);
    }
    let cols = if count <= 3 {
        count
    } else {
        (count as f32).sqrt().ceil() as usize
    };
    (cols, count.div_ceil(cols))
}

#[derive(Clone)]
pub enum WindowLayout {
    /// The whole window.
    Surface(SharedMetrics),
    /// Cell `index` of a grid of `count` cells, row-major from the top-left.
    Cell {
        metrics: SharedMetrics,
        index: usize,
        count: usize,
    },
}

impl WindowLayout {
    pub fn cells(metrics: &SharedMetrics, count: usize) -> Vec<WindowLayout> {
        (0..count)
            .map(|index| WindowLayout::Cell {
                metrics: metrics.clone(),
                index,
                count,
            })
            .collect()
    }

    fn metrics(&self) -> WindowMetrics {
        match self {
            WindowLayout::Surface(m) | WindowLayout::Cell { metrics: m, .. } => m.get(),
        }
    }

    /// Whether the logical point `(x, y)` falls inside this box.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let r = self.bounding_rect();
        x >= r.left && x < r.right && y >= r.top && y < r.bottom
    }
}

impl LayoutProvider for WindowLayout {
    fn bounding_rect(&self) -> ElementRect {
        let m = self.metrics();
        match *self {
            WindowLayout::Surface(_) => ElementRect::from_size(0.0, 0.0, m.width, m.height),
            WindowLayout::Cell { index, count, .. } => {
                let (cols, rows) = grid_shape(count);
                let w = m.width / cols as f32;
                let h = m.height / rows as f32;
                let (col, row) = (index % cols, index / cols);
                ElementRect::new(
                    col as f32 * w,
                    row as f32 * h,
                    (col + 1) as f32 * w,
                    (row + 1) as f32 * h,
                )
            }
        }
    }

    fn pixel_ratio(&self) -> f32 {
        self.metrics().scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(width: f32, height: f32) -> SharedMetrics {
        Rc::new(Cell::new(WindowMetrics {
            width,
            height,
            scale: 1.0,
        }))
    }

    #[test]
    fn grid_shape_keeps_three_in_a_row() {
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(3), (3, 1));
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(5), (3, 2));
    }

    #[test]
    fn cells_tile_the_window_without_gaps() {
        let m = metrics(900.0, 600.0);
        let cells = WindowLayout::cells(&m, 4);
        let area: f32 = cells
            .iter()
            .map(|c| {
                let r = c.bounding_rect();
                r.width() * r.height()
            })
            .sum();
        assert!((area - 900.0 * 600.0).abs() < 1e-2);
        assert!(cells[3].contains(899.0, 599.0));
        assert!(!cells[0].contains(450.0, 10.0));
    }

    #[test]
    fn cells_follow_window_resizes() {
        let m = metrics(300.0, 100.0);
        let cell = WindowLayout::cells(&m, 3).remove(2);
        assert_eq!(cell.bounding_rect().left, 200.0);
        m.set(WindowMetrics {
            width: 600.0,
            height: 100.0,
            scale: 2.0,
        });
        assert_eq!(cell.bounding_rect().left, 400.0);
        assert_eq!(cell.pixel_ratio(), 2.0);
    }
}
