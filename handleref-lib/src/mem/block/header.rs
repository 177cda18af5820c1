use crate::mem::ref_counter_update::RefCounterUpdate;

/// Bookkeeping shared by a handle and its references: a count of live
/// references and an invalidated flag.
///
/// The flag is sticky. Once `invalidate` has been called `is_invalidated`
/// returns `true` for the rest of the block's life.
pub trait BlockHeader: Default {
    // required
    /// Applies `i` to the reference count and returns the count before the update.
    fn ref_counter_update(&self, i: RefCounterUpdate) -> usize;
    fn invalidate(&self);
    fn is_invalidated(&self) -> bool;
    //
    #[inline(always)]
    fn ref_count(&self) -> usize {
        self.ref_counter_update(RefCounterUpdate::Read)
    }
}
