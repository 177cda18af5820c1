use core::{
    fmt::{self, Debug},
    marker::PhantomData,
    ptr::{null, NonNull},
};

use super::{
    block::{header::BlockHeader, Block},
    error::HandleError,
    global::Global,
    manager::Dealloc,
    object_ref::ObjectRef,
    ref_counter_update::RefCounterUpdate,
    state::{self, BlockState, Resolution},
};

/// A weak observer of an object owned by a `Handle`.
///
/// A reference never keeps the object alive. Once the owner drops the object
/// `is_valid` returns `false`, `as_ptr` returns null and `get` returns `None`
/// for good.
pub struct Reference<T, D: Dealloc = Global> {
    block: Option<NonNull<Block<T, D>>>,
    _0: PhantomData<D>,
}

impl<T, D: Dealloc> Reference<T, D> {
    /// `p` must point to a live block.
    pub(crate) unsafe fn new(p: NonNull<Block<T, D>>) -> Self {
        (*p.as_ptr())
            .header
            .ref_counter_update(RefCounterUpdate::AddRef);
        Self {
            block: Some(p),
            _0: PhantomData,
        }
    }
    #[inline(always)]
    fn valid_block(&self) -> Option<&Block<T, D>> {
        // a bound block lives at least as long as `self`
        let block = unsafe { &*self.block?.as_ptr() };
        match BlockState::of(&block.header) {
            BlockState::LiveOwned => Some(block),
            BlockState::Invalidated => None,
        }
    }
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.valid_block().is_some()
    }
    /// The object address, or null once the object is gone.
    pub fn as_ptr(&self) -> *const T {
        self.valid_block().map_or(null(), |b| b.object_ptr())
    }
    pub fn try_get(&self) -> Result<ObjectRef<'_, T, D>, HandleError> {
        let block = self.valid_block().ok_or(HandleError::Invalidated)?;
        unsafe { ObjectRef::new(block) }
    }
    /// Borrows the object if it is still alive.
    ///
    /// Panics if the owner holds a mutable borrow of the object.
    pub fn get(&self) -> Option<ObjectRef<'_, T, D>> {
        match self.try_get() {
            Ok(r) => Some(r),
            Err(HandleError::Invalidated) => None,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, D: Dealloc> Clone for Reference<T, D> {
    fn clone(&self) -> Self {
        match self.block {
            Some(p) => unsafe { Self::new(p) },
            None => Self::default(),
        }
    }
    /// Releases the old binding before binding to `source`'s block.
    fn clone_from(&mut self, source: &Self) {
        if self.block == source.block {
            return;
        }
        *self = Self::default();
        if let Some(p) = source.block {
            *self = unsafe { Self::new(p) };
        }
    }
}

impl<T, D: Dealloc> Default for Reference<T, D> {
    #[inline(always)]
    fn default() -> Self {
        Self {
            block: None,
            _0: PhantomData,
        }
    }
}

impl<T, D: Dealloc> Drop for Reference<T, D> {
    fn drop(&mut self) {
        if let Some(p) = self.block.take() {
            unsafe {
                if state::release(&(*p.as_ptr()).header) == Resolution::Free {
                    Block::delete(p);
                }
            }
        }
    }
}

impl<T: Debug, D: Dealloc> Debug for Reference<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Ok(v) => f.debug_tuple("Reference").field(&*v).finish(),
            Err(HandleError::Invalidated) => f.write_str("Reference(<invalid>)"),
            Err(_) => f.write_str("Reference(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod test {
    use core::cell::Cell;

    use wasm_bindgen_test::wasm_bindgen_test;

    use crate::mem::{
        error::HandleError, global::Global, handle::Handle, local::Local, manager::Manager,
    };

    use super::Reference;

    #[test]
    #[wasm_bindgen_test]
    fn test_free_invalidates() {
        let mut h = Handle::make(5).unwrap();
        let r = h.ref_();
        assert!(r.is_valid());
        assert_eq!(*r.get().unwrap(), 5);
        assert_eq!(r.as_ptr(), h.get().unwrap() as *const i32);
        h.free();
        assert!(!r.is_valid());
        assert!(r.get().is_none());
        assert!(r.as_ptr().is_null());
        assert_eq!(r.try_get().err(), Some(HandleError::Invalidated));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_default() {
        let r = Reference::<i32, Global>::default();
        assert!(!r.is_valid());
        assert!(r.as_ptr().is_null());
        assert!(r.get().is_none());
        let c = r.clone();
        assert!(!c.is_valid());
        assert_eq!(format!("{:?}", c), "Reference(<invalid>)");
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_clone_and_move() {
        let h = Handle::make(7).unwrap();
        let r1 = h.ref_();
        let r2 = r1.clone();
        assert_eq!(h.ref_count(), 2);
        let r3 = r2;
        assert_eq!(h.ref_count(), 2);
        assert_eq!(format!("{:?}", r3), "Reference(7)");
        drop(r1);
        assert_eq!(h.ref_count(), 1);
        drop(h);
        assert!(!r3.is_valid());
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_clone_from() {
        let local = Local::default();
        let h1 = local.handle_new(1).unwrap();
        let h2 = local.handle_new(2).unwrap();
        let mut r = h1.ref_();
        drop(h1);
        assert_eq!(local.block_count(), 2);
        r.clone_from(&h2.ref_());
        // the invalidated block lost its last reference
        assert_eq!(local.block_count(), 1);
        assert_eq!(*r.get().unwrap(), 2);
        assert_eq!(h2.ref_count(), 1);
        let same = h2.ref_();
        r.clone_from(&same);
        assert_eq!(h2.ref_count(), 2);
        r.clone_from(&Reference::default());
        assert!(!r.is_valid());
        assert_eq!(h2.ref_count(), 1);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_no_owner_release() {
        let local = Local::default();
        let h = local.handle_new(1).unwrap();
        {
            let _r = h.ref_();
        }
        assert_eq!(h.ref_count(), 0);
        assert_eq!(local.block_count(), 1);
        assert_eq!(*h, 1);
        drop(h);
        assert_eq!(local.block_count(), 0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_many_refs_any_order() {
        let local = Local::default();
        let h = local.handle_new(42u32).unwrap();
        let mut refs: Vec<_> = (0..1000).map(|_| h.ref_()).collect();
        assert_eq!(h.ref_count(), 1000);
        let mut i = 7;
        while !refs.is_empty() {
            i = (i * 31 + 17) % refs.len().max(1);
            drop(refs.swap_remove(i % refs.len()));
        }
        assert_eq!(h.ref_count(), 0);
        assert_eq!(local.block_count(), 1);
        drop(h);
        assert_eq!(local.block_count(), 0);
        assert_eq!(local.size(), 0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_refs_outlive_handle() {
        let local = Local::default();
        let h = local.handle_new(42u32).unwrap();
        let mut refs: Vec<_> = (0..100).map(|_| h.ref_()).collect();
        drop(h);
        assert_eq!(local.block_count(), 1);
        assert!(refs.iter().all(|r| !r.is_valid()));
        let copy = refs[10].clone();
        assert!(!copy.is_valid());
        refs.reverse();
        refs.truncate(1);
        assert_eq!(local.block_count(), 1);
        drop(refs);
        assert_eq!(local.block_count(), 1);
        drop(copy);
        assert_eq!(local.block_count(), 0);
    }

    struct SelfRef<'a> {
        me: Reference<SelfRef<'a>, &'a Local>,
        seen_valid: &'a Cell<Option<bool>>,
    }

    impl Drop for SelfRef<'_> {
        fn drop(&mut self) {
            self.seen_valid.set(Some(self.me.is_valid()));
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_self_reference() {
        let local = Local::default();
        let seen_valid = Cell::new(None);
        {
            let mut h = local
                .handle_new(SelfRef {
                    me: Reference::default(),
                    seen_valid: &seen_valid,
                })
                .unwrap();
            let me = h.ref_();
            h.borrow_mut().me = me;
            assert_eq!(h.ref_count(), 1);
        }
        assert_eq!(seen_valid.get(), Some(false));
        assert_eq!(local.block_count(), 0);
    }
}
