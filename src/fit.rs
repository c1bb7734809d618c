//! Aspect-preserving "contain" placement of content inside a fixed container.
//!
//! [`fit`] scales content so it touches the container on one axis and centres
//! it on the other. The unfilled strip is left for the caller to paint as
//! letterbox or pillarbox bars.

use thiserror::Error;

/// Placement of content inside a container, in container units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A [`FitResult`] snapped to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FitError {
    /// Content with a zero, negative or non-finite side has no usable aspect ratio.
    #[error("degenerate content dimensions {width}x{height}")]
    DegenerateContent { width: f64, height: f64 },

    #[error("invalid container dimensions {width}x{height}")]
    InvalidContainer { width: f64, height: f64 },
}

fn positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Compute the contain-fit of `content_width`x`content_height` inside
/// `container_width`x`container_height`.
///
/// Content narrower than the container's ratio is fitted to the full height
/// and centred horizontally; anything else, including an exactly matching
/// ratio, is fitted to the full width and centred vertically. For a square
/// container the threshold is a content ratio of `1`, so square content always
/// takes the width-first branch.
pub fn fit(
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> Result<FitResult, FitError> {
    if !positive_finite(container_width) || !positive_finite(container_height) {
        return Err(FitError::InvalidContainer {
            width: container_width,
            height: container_height,
        });
    }
    let degenerate = FitError::DegenerateContent {
        width: content_width,
        height: content_height,
    };
    if !positive_finite(content_width) || !positive_finite(content_height) {
        return Err(degenerate);
    }

    let aspect = content_width / content_height;
    let container_aspect = container_width / container_height;
    if !positive_finite(aspect) {
        return Err(degenerate);
    }

    let result = if aspect < container_aspect {
        let width = container_height * aspect;
        FitResult {
            width,
            height: container_height,
            offset_x: ((container_width - width) / 2.0).max(0.0),
            offset_y: 0.0,
        }
    } else {
        let height = container_width / aspect;
        FitResult {
            width: container_width,
            height,
            offset_x: 0.0,
            offset_y: ((container_height - height) / 2.0).max(0.0),
        }
    };

    if [result.width, result.height, result.offset_x, result.offset_y]
        .iter()
        .all(|v| v.is_finite())
        && result.width > 0.0
        && result.height > 0.0
    {
        Ok(result)
    } else {
        Err(degenerate)
    }
}

impl FitResult {
    /// Snap to the pixel grid of a `container_w`x`container_h` surface.
    ///
    /// The rect is never empty and never leaves the container.
    pub fn to_pixel_rect(&self, container_w: u32, container_h: u32) -> PixelRect {
        let container_w = container_w.max(1);
        let container_h = container_h.max(1);
        let width = (self.width.round() as u32).clamp(1, container_w);
        let height = (self.height.round() as u32).clamp(1, container_h);
        let x = (self.offset_x.max(0.0).round() as u32).min(container_w - width);
        let y = (self.offset_y.max(0.0).round() as u32).min(container_h - height);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}
