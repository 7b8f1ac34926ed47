//! Drag-and-drop reordering of positioned collections (variants, photos).

use crate::error::CoreError;
use crate::product::{Photo, Variant};

/// An item carrying an explicit sort position.
pub trait Positioned {
    fn position(&self) -> u32;
    fn set_position(&mut self, position: u32);
}

impl Positioned for Variant {
    fn position(&self) -> u32 {
        self.sort_order
    }

    fn set_position(&mut self, position: u32) {
        self.sort_order = position;
    }
}

impl Positioned for Photo {
    fn position(&self) -> u32 {
        self.sort_order
    }

    fn set_position(&mut self, position: u32) {
        self.sort_order = position;
    }
}

/// Move the item at `from` to `to`, then renumber every position to match
/// its index. Moving an item onto itself changes nothing.
pub fn reorder<T: Positioned>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), CoreError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(CoreError::Validation(format!(
            "Cannot move item {from} to {to} in a list of {len}"
        )));
    }
    if from == to {
        return Ok(());
    }

    let item = items.remove(from);
    items.insert(to, item);
    reindex(items);
    Ok(())
}

/// Assign positions `0..n` in current order.
pub fn reindex<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as u32);
    }
}

/// Order items by their stored position (stable for ties).
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by_key(|item| item.position());
}
