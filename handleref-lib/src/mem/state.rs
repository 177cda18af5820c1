//! Lifetime arbitration for a block shared by one handle and its references.
//!
//! ```text
//! LiveOwned --owner released, refs > 0--> Invalidated --last ref released--> Freed
//! LiveOwned --owner released, refs == 0-----------------------------------> Freed
//! ```
//!
//! While the owner drops the object it holds one extra count on the block,
//! so references released from inside the object's destructor can never free
//! the block underneath it.

use super::{block::header::BlockHeader, ref_counter_update::RefCounterUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    LiveOwned,
    Invalidated,
}

impl BlockState {
    #[inline(always)]
    pub fn of<H: BlockHeader>(header: &H) -> Self {
        if header.is_invalidated() {
            BlockState::Invalidated
        } else {
            BlockState::LiveOwned
        }
    }
}

/// What to do with a block after an owner or a reference let go of it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Keep,
    Free,
}

/// A block is freed when nobody counts on it and its object is gone.
#[inline(always)]
pub fn resolve<H: BlockHeader>(header: &H) -> Resolution {
    if header.is_invalidated() && header.ref_count() == 0 {
        Resolution::Free
    } else {
        Resolution::Keep
    }
}

/// A reference let go of the block.
#[inline(always)]
pub fn release<H: BlockHeader>(header: &H) -> Resolution {
    header.ref_counter_update(RefCounterUpdate::Release);
    resolve(header)
}

/// Pins and invalidates the block before the owner drops the object.
/// Returns the number of references that observe the invalidation.
pub fn begin_teardown<H: BlockHeader>(header: &H) -> usize {
    let refs = header.ref_counter_update(RefCounterUpdate::AddRef);
    header.invalidate();
    refs
}

/// Drops the pin taken by `begin_teardown`.
#[inline(always)]
pub fn end_teardown<H: BlockHeader>(header: &H) -> Resolution {
    release(header)
}

#[cfg(test)]
mod test {
    use core::cell::Cell;

    use wasm_bindgen_test::wasm_bindgen_test;

    use crate::mem::{
        block::{header::BlockHeader, split_header::SplitHeader},
        ref_counter_update::RefCounterUpdate,
    };

    use super::{begin_teardown, end_teardown, release, resolve, BlockState, Resolution};

    fn owner_without_refs<H: BlockHeader>() {
        let h = H::default();
        assert_eq!(BlockState::of(&h), BlockState::LiveOwned);
        assert_eq!(resolve(&h), Resolution::Keep);
        assert_eq!(begin_teardown(&h), 0);
        assert_eq!(BlockState::of(&h), BlockState::Invalidated);
        assert_eq!(end_teardown(&h), Resolution::Free);
    }

    fn owner_with_refs<H: BlockHeader>() {
        let h = H::default();
        h.ref_counter_update(RefCounterUpdate::AddRef);
        h.ref_counter_update(RefCounterUpdate::AddRef);
        assert_eq!(begin_teardown(&h), 2);
        assert_eq!(end_teardown(&h), Resolution::Keep);
        assert_eq!(BlockState::of(&h), BlockState::Invalidated);
        assert_eq!(release(&h), Resolution::Keep);
        assert_eq!(release(&h), Resolution::Free);
        assert_eq!(BlockState::of(&h), BlockState::Invalidated);
    }

    fn refs_without_owner_release<H: BlockHeader>() {
        let h = H::default();
        h.ref_counter_update(RefCounterUpdate::AddRef);
        assert_eq!(release(&h), Resolution::Keep);
        assert_eq!(h.ref_count(), 0);
        assert_eq!(BlockState::of(&h), BlockState::LiveOwned);
    }

    fn ref_released_during_teardown<H: BlockHeader>() {
        let h = H::default();
        h.ref_counter_update(RefCounterUpdate::AddRef);
        assert_eq!(begin_teardown(&h), 1);
        // the object's destructor drops the only reference
        assert_eq!(release(&h), Resolution::Keep);
        assert_eq!(end_teardown(&h), Resolution::Free);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_split() {
        owner_without_refs::<SplitHeader>();
        owner_with_refs::<SplitHeader>();
        refs_without_owner_release::<SplitHeader>();
        ref_released_during_teardown::<SplitHeader>();
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_packed() {
        owner_without_refs::<Cell<usize>>();
        owner_with_refs::<Cell<usize>>();
        refs_without_owner_release::<Cell<usize>>();
        ref_released_during_teardown::<Cell<usize>>();
    }
}
