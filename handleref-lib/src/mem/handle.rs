use core::{
    fmt::{self, Debug},
    marker::PhantomData,
    mem::{replace, swap},
    ops::Deref,
    ptr::NonNull,
};

use log::trace;

use super::{
    block::{header::BlockHeader, Block},
    error::HandleError,
    global::{Global, GLOBAL},
    manager::{Dealloc, Manager},
    object_ref::ObjectMut,
    reference::Reference,
    state::{self, Resolution},
};

/// The exclusive owner of an object allocated by a memory manager.
///
/// Dropping, freeing or overwriting a non-empty handle drops the object at
/// once, however many `Reference`s observe it. Those references become
/// invalid and stay invalid.
///
/// A handle and its references share non-atomic bookkeeping, so none of them
/// is `Send` or `Sync`.
pub struct Handle<T, D: Dealloc = Global> {
    block: Option<NonNull<Block<T, D>>>,
    _0: PhantomData<(T, D)>,
}

impl<T> Handle<T, Global> {
    pub fn make(value: T) -> Result<Self, HandleError> {
        GLOBAL.handle_new(value)
    }
    pub fn make_with(f: impl FnOnce() -> T) -> Result<Self, HandleError> {
        GLOBAL.handle_new_with(f)
    }
}

impl<T, D: Dealloc> Handle<T, D> {
    pub const fn empty() -> Self {
        Self {
            block: None,
            _0: PhantomData,
        }
    }
    /// `p` must point to an initialized block that nothing else owns.
    #[inline(always)]
    pub(crate) unsafe fn from_block(p: NonNull<Block<T, D>>) -> Self {
        Self {
            block: Some(p),
            _0: PhantomData,
        }
    }
    #[inline(always)]
    fn block(&self) -> Option<&Block<T, D>> {
        // the block and its object live as long as `self` owns them
        self.block.map(|p| unsafe { &*p.as_ptr() })
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }
    pub fn get(&self) -> Option<&T> {
        self.block().map(|b| unsafe { b.object() })
    }
    pub fn try_borrow_mut(&mut self) -> Result<ObjectMut<'_, T, D>, HandleError> {
        let block = self.block().ok_or(HandleError::Empty)?;
        unsafe { ObjectMut::new(block) }
    }
    /// Panics if the handle is empty or the object is borrowed through a reference.
    pub fn borrow_mut(&mut self) -> ObjectMut<'_, T, D> {
        match self.try_borrow_mut() {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    }
    pub fn try_ref(&self) -> Result<Reference<T, D>, HandleError> {
        let p = self.block.ok_or(HandleError::Empty)?;
        Ok(unsafe { Reference::new(p) })
    }
    /// Panics if the handle is empty.
    pub fn ref_(&self) -> Reference<T, D> {
        match self.try_ref() {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    }
    /// The number of live references bound to the owned object.
    pub fn ref_count(&self) -> usize {
        self.block().map_or(0, |b| b.header.ref_count())
    }
    /// Moves the ownership out of `self`, leaving it empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        replace(self, Self::empty())
    }
    pub fn swap(&mut self, other: &mut Self) {
        swap(self, other)
    }
    /// Drops the object now and leaves the handle empty. Does nothing on an
    /// empty handle.
    ///
    /// Panics, keeping the object and the ownership, if the object is
    /// borrowed through a reference.
    pub fn free(&mut self) {
        if let Some(block) = self.block() {
            if block.is_borrowed() {
                panic!("{}", HandleError::Borrowed);
            }
        }
        if let Some(p) = self.block.take() {
            unsafe { Self::teardown(p) }
        }
    }
    unsafe fn teardown(p: NonNull<Block<T, D>>) {
        let block = &*p.as_ptr();
        let refs = state::begin_teardown(&block.header);
        if refs > 0 {
            trace!("invalidate block {:p} observed by {} references", p, refs);
        }
        // released even if the object's destructor panics
        let _pin = TeardownPin(p);
        block.drop_object();
    }
}

/// The count `begin_teardown` holds on a block while its object is dropped.
struct TeardownPin<T, D: Dealloc>(NonNull<Block<T, D>>);

impl<T, D: Dealloc> Drop for TeardownPin<T, D> {
    fn drop(&mut self) {
        unsafe {
            if state::end_teardown(&(*self.0.as_ptr()).header) == Resolution::Free {
                Block::delete(self.0);
            }
        }
    }
}

impl<T, D: Dealloc> Default for Handle<T, D> {
    #[inline(always)]
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, D: Dealloc> Drop for Handle<T, D> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<T, D: Dealloc> Deref for Handle<T, D> {
    type Target = T;
    /// Panics if the handle is empty.
    fn deref(&self) -> &T {
        match self.get() {
            Some(v) => v,
            None => panic!("{}", HandleError::Empty),
        }
    }
}

impl<T: Debug, D: Dealloc> Debug for Handle<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => f.debug_tuple("Handle").field(v).finish(),
            None => f.write_str("Handle(<empty>)"),
        }
    }
}
