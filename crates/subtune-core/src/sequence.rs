//! Position edits on an ordered sequence.
//!
//! Positions are 0-based and arrive signed, as a remote caller sends them.
//! Every edit validates its index before touching the sequence, so a failed
//! edit leaves the sequence exactly as it was.

use crate::error::{Error, Result};

/// Convert a caller-supplied position into a valid index for `len` items.
pub fn checked_index(index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| Error::index_out_of_range(index, len))
}

/// Remove the item at `index`, shifting later items left.
pub fn remove_at<T>(items: &mut Vec<T>, index: i64) -> Result<T> {
    let i = checked_index(index, items.len())?;
    Ok(items.remove(i))
}

/// Swap the item at `index` with its predecessor.
///
/// Returns `false` without changing anything when `index` is already first.
pub fn move_up<T>(items: &mut [T], index: i64) -> Result<bool> {
    let i = checked_index(index, items.len())?;
    if i == 0 {
        return Ok(false);
    }
    items.swap(i, i - 1);
    Ok(true)
}

/// Swap the item at `index` with its successor.
///
/// Returns `false` without changing anything when `index` is already last.
pub fn move_down<T>(items: &mut [T], index: i64) -> Result<bool> {
    let i = checked_index(index, items.len())?;
    if i + 1 == items.len() {
        return Ok(false);
    }
    items.swap(i, i + 1);
    Ok(true)
}
