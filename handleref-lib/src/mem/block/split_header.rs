use core::cell::Cell;

use crate::mem::ref_counter_update::RefCounterUpdate;

use super::header::BlockHeader;

/// A header that keeps the count and the flag in separate fields.
#[derive(Debug, Default)]
pub struct SplitHeader {
    count: Cell<usize>,
    invalidated: Cell<bool>,
}

impl BlockHeader for SplitHeader {
    #[inline(always)]
    fn ref_counter_update(&self, val: RefCounterUpdate) -> usize {
        let result = self.count.get();
        match val {
            RefCounterUpdate::Read => {}
            RefCounterUpdate::AddRef => {
                assert!(result < usize::MAX, "reference count overflow");
                self.count.set(result + 1);
            }
            RefCounterUpdate::Release => {
                assert!(result > 0, "reference count underflow");
                self.count.set(result - 1);
            }
        }
        result
    }
    #[inline(always)]
    fn invalidate(&self) {
        self.invalidated.set(true);
    }
    #[inline(always)]
    fn is_invalidated(&self) -> bool {
        self.invalidated.get()
    }
}
