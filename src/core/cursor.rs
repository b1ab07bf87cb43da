//! Linear cursor offsets.
//!
//! Positions on a wrapping surface are tracked as `row * width + col`, which lets a wrapped
//! multi-row region be edited as a flat sequence.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

impl CursorPos {
    pub fn from_offset(offset: usize, width: usize) -> Self {
        let width = width.max(1);
        Self {
            row: offset / width,
            col: offset % width,
        }
    }

    pub fn to_offset(self, width: usize) -> usize {
        self.row * width.max(1) + self.col
    }
}

/// Signed distance between two linear offsets.
pub fn offset_delta(from: usize, to: usize) -> isize {
    to as isize - from as isize
}

/// Apply a signed delta to an offset, saturating at zero.
pub fn shift_offset(offset: usize, delta: isize) -> usize {
    if delta < 0 {
        offset.saturating_sub(delta.unsigned_abs())
    } else {
        offset.saturating_add(delta as usize)
    }
}
