pub mod header;
pub mod packed;
pub mod split_header;

use core::{
    alloc::Layout,
    cell::{Cell, UnsafeCell},
    mem::MaybeUninit,
    ptr::{drop_in_place, NonNull},
};

use log::trace;

use super::manager::Dealloc;

/// Block = (Header, Borrow flag, Object)
///
/// The object slot is initialized from construction until the owning handle
/// tears it down. The header outlives the object while references exist.
#[repr(C)]
pub struct Block<T, D: Dealloc> {
    pub header: D::BlockHeader,
    // > 0: shared borrows, -1: exclusive borrow
    borrow: Cell<isize>,
    object: UnsafeCell<MaybeUninit<T>>,
}

impl<T, D: Dealloc> Block<T, D> {
    pub const LAYOUT: Layout = Layout::new::<Self>();
    #[inline(always)]
    pub fn new(value: T) -> Self {
        Self {
            header: D::BlockHeader::default(),
            borrow: Cell::new(0),
            object: UnsafeCell::new(MaybeUninit::new(value)),
        }
    }
    #[inline(always)]
    pub fn object_ptr(&self) -> *mut T {
        self.object.get().cast()
    }
    /// The object must not have been dropped yet.
    #[inline(always)]
    pub unsafe fn object(&self) -> &T {
        &*self.object_ptr()
    }
    /// The object must not have been dropped yet and the caller must hold the
    /// exclusive borrow.
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn object_mut(&self) -> &mut T {
        &mut *self.object_ptr()
    }
    pub unsafe fn drop_object(&self) {
        drop_in_place(self.object_ptr());
    }
    /// Releases the block memory. The object must already be dropped.
    pub unsafe fn delete(p: NonNull<Self>) {
        trace!("release block {:p}", p);
        drop_in_place(&mut (*p.as_ptr()).header);
        D::dealloc(p.as_ptr() as *mut u8, Self::LAYOUT);
    }
    //
    pub fn try_borrow(&self) -> bool {
        let b = self.borrow.get();
        if b < 0 {
            return false;
        }
        self.borrow.set(b + 1);
        true
    }
    pub fn release_borrow(&self) {
        self.borrow.set(self.borrow.get() - 1);
    }
    pub fn try_borrow_mut(&self) -> bool {
        if self.borrow.get() != 0 {
            return false;
        }
        self.borrow.set(-1);
        true
    }
    pub fn release_borrow_mut(&self) {
        self.borrow.set(0);
    }
    #[inline(always)]
    pub fn is_borrowed(&self) -> bool {
        self.borrow.get() != 0
    }
}
