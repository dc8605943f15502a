//! Fixed-height list windowing.
//!
//! Given a scroll offset and the list geometry, [`compute_window`] picks the
//! contiguous index range that has to be materialized. Items outside the
//! range are never built, so rendering cost depends on the viewport and the
//! overscan margin, not on the total item count.

use crate::error::ValidationError;
use std::ops::Range;

/// Default overscan margin, in items, on each side of the visible range.
pub const DEFAULT_OVERSCAN: usize = 8;

/// Index range to materialize plus its position in the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    /// First materialized index (inclusive).
    pub start: usize,
    /// Last materialized index (exclusive).
    pub end: usize,
    /// Distance from the top of the full list to item `start`.
    pub offset_px: u64,
}

impl Window {
    /// Number of materialized items.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }
}

/// Total height of a list with `item_count` rows of `item_height`.
pub fn total_height(item_height: u64, item_count: usize) -> u64 {
    item_height.saturating_mul(item_count as u64)
}

/// Largest scroll offset that still fills the viewport.
pub fn max_scroll_offset(item_height: u64, viewport_height: u64, item_count: usize) -> u64 {
    total_height(item_height, item_count).saturating_sub(viewport_height)
}

/// Compute the window of items to materialize.
///
/// `scroll_offset` past the end of the list is clamped to the last full
/// viewport. `overscan` extra items are added on each side of the visible
/// range and the result is clipped to `[0, item_count)`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidValue` when `item_height` is zero.
pub fn compute_window(
    scroll_offset: u64,
    item_height: u64,
    viewport_height: u64,
    item_count: usize,
    overscan: usize,
) -> Result<Window, ValidationError> {
    if item_height == 0 {
        return Err(ValidationError::InvalidValue {
            field: "item_height".to_string(),
            reason: "must be > 0".to_string(),
        });
    }
    if item_count == 0 {
        return Ok(Window::default());
    }

    let offset = scroll_offset.min(max_scroll_offset(item_height, viewport_height, item_count));
    let first_visible = usize::try_from(offset / item_height)
        .unwrap_or(usize::MAX)
        .min(item_count);
    let visible_end = if viewport_height == 0 {
        first_visible
    } else {
        let bottom = offset.saturating_add(viewport_height);
        usize::try_from(bottom.div_ceil(item_height))
            .unwrap_or(usize::MAX)
            .min(item_count)
    };

    let start = first_visible.saturating_sub(overscan);
    let end = visible_end.saturating_add(overscan).min(item_count);

    Ok(Window {
        start,
        end,
        offset_px: item_height.saturating_mul(start as u64),
    })
}
