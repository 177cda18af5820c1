use core::{
    fmt::{self, Debug},
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use super::{block::Block, error::HandleError, manager::Dealloc};

/// A shared borrow of an object, obtained through a `Reference`.
///
/// The owning handle refuses to destroy the object while one of these is alive.
pub struct ObjectRef<'a, T, D: Dealloc> {
    block: &'a Block<T, D>,
}

impl<'a, T, D: Dealloc> ObjectRef<'a, T, D> {
    /// The object in `block` must be alive.
    pub(crate) unsafe fn new(block: &'a Block<T, D>) -> Result<Self, HandleError> {
        if block.try_borrow() {
            Ok(Self { block })
        } else {
            Err(HandleError::BorrowedMut)
        }
    }
}

impl<T, D: Dealloc> Deref for ObjectRef<'_, T, D> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { self.block.object() }
    }
}

impl<T, D: Dealloc> Drop for ObjectRef<'_, T, D> {
    fn drop(&mut self) {
        self.block.release_borrow();
    }
}

impl<T: Debug, D: Dealloc> Debug for ObjectRef<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

/// An exclusive borrow of an object, obtained through its `Handle`.
pub struct ObjectMut<'a, T, D: Dealloc> {
    block: &'a Block<T, D>,
    _0: PhantomData<&'a mut T>,
}

impl<'a, T, D: Dealloc> ObjectMut<'a, T, D> {
    /// The object in `block` must be alive.
    pub(crate) unsafe fn new(block: &'a Block<T, D>) -> Result<Self, HandleError> {
        if block.try_borrow_mut() {
            Ok(Self {
                block,
                _0: PhantomData,
            })
        } else {
            Err(HandleError::Borrowed)
        }
    }
}

impl<T, D: Dealloc> Deref for ObjectMut<'_, T, D> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { self.block.object() }
    }
}

impl<T, D: Dealloc> DerefMut for ObjectMut<'_, T, D> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { self.block.object_mut() }
    }
}

impl<T, D: Dealloc> Drop for ObjectMut<'_, T, D> {
    fn drop(&mut self) {
        self.block.release_borrow_mut();
    }
}

impl<T: Debug, D: Dealloc> Debug for ObjectMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}
