//! Mapping between the image's natural pixel space and the display surface.

use kurbo::{Affine, Point, Size};
use serde::{Deserialize, Serialize};

/// Fraction of the window width available to the surface.
pub const WINDOW_WIDTH_FRACTION: f64 = 0.8;

/// Padding between the toolbar and the bottom of the window.
pub const CONTAINER_PADDING: f64 = 20.0;

/// Uniform scale from natural to display space.
///
/// Entities are always stored in natural space; only this transform changes
/// when the window resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    /// Display pixels per natural pixel.
    pub scale: f64,
    /// Size of the background at full resolution.
    pub natural_size: Size,
    /// Size of the display surface.
    pub display_size: Size,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity(Size::ZERO)
    }
}

impl ViewportTransform {
    /// A 1:1 transform, used for export and when no background is loaded.
    ///
    /// The size is rounded down to whole pixels like [`Self::fit_to_budget`].
    pub fn identity(size: Size) -> Self {
        let size = Size::new(size.width.floor(), size.height.floor());
        Self {
            scale: 1.0,
            natural_size: size,
            display_size: size,
        }
    }

    /// Whole-pixel dimensions of a surface of `size`, at least 1x1.
    pub fn pixel_size(size: Size) -> (u32, u32) {
        (size.width.floor().max(1.0) as u32, size.height.floor().max(1.0) as u32)
    }

    /// Largest aspect-preserving scale that fits `natural` inside `budget`.
    ///
    /// The display size is rounded down to whole pixels so the surface never
    /// exceeds the budget.
    pub fn fit_to_budget(natural: Size, budget: Size) -> Self {
        if natural.width <= 0.0 || natural.height <= 0.0 {
            return Self::identity(budget);
        }

        let budget = Size::new(budget.width.max(1.0), budget.height.max(1.0));
        let scale = (budget.width / natural.width).min(budget.height / natural.height);
        let display_size = Size::new(
            (natural.width * scale).floor().max(1.0),
            (natural.height * scale).floor().max(1.0),
        );

        Self {
            scale,
            natural_size: natural,
            display_size,
        }
    }

    /// Get the affine transform from natural to display coordinates.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale)
    }

    /// Convert a display point to natural coordinates.
    pub fn to_natural(&self, display_point: Point) -> Point {
        Point::new(display_point.x / self.scale, display_point.y / self.scale)
    }

    /// Convert a natural point to display coordinates.
    pub fn to_display(&self, natural_point: Point) -> Point {
        self.transform() * natural_point
    }
}

/// Display budget for a browser-style window: 80% of the width and the
/// height left under the toolbar.
pub fn window_budget(window: Size, toolbar_height: f64) -> Size {
    Size::new(
        window.width * WINDOW_WIDTH_FRACTION,
        (window.height - toolbar_height - CONTAINER_PADDING).max(1.0),
    )
}
