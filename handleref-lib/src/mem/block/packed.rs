use core::cell::Cell;

use crate::mem::ref_counter_update::RefCounterUpdate;

use super::header::BlockHeader;

/// The top bit of the counter is the invalidated flag.
pub const INVALID_BIT: usize = 1 << (usize::BITS - 1);

const COUNT_MASK: usize = !INVALID_BIT;

impl BlockHeader for Cell<usize> {
    #[inline(always)]
    fn ref_counter_update(&self, val: RefCounterUpdate) -> usize {
        let value = self.get();
        let count = value & COUNT_MASK;
        match val {
            RefCounterUpdate::Read => {}
            RefCounterUpdate::AddRef => {
                assert!(count < COUNT_MASK, "reference count overflow");
                self.set(value + 1);
            }
            RefCounterUpdate::Release => {
                assert!(count > 0, "reference count underflow");
                self.set(value - 1);
            }
        }
        count
    }
    #[inline(always)]
    fn invalidate(&self) {
        self.set(self.get() | INVALID_BIT);
    }
    #[inline(always)]
    fn is_invalidated(&self) -> bool {
        self.get() & INVALID_BIT != 0
    }
}
