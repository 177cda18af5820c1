use core::{alloc::Layout, cell::Cell, marker::PhantomData, ptr::null_mut};

use super::{
    block::split_header::SplitHeader,
    field_layout::align_to,
    manager::{Dealloc, Manager},
};

/// A bump allocator over a caller-owned buffer. Memory is never reused and
/// allocation fails once the buffer is exhausted.
#[derive(Debug)]
pub struct Arena<'a> {
    begin: *mut u8,
    len: usize,
    offset: Cell<usize>,
    _0: PhantomData<&'a mut [u8]>,
}

impl<'a> Arena<'a> {
    pub fn new(range: &'a mut [u8]) -> Self {
        Self {
            begin: range.as_mut_ptr(),
            len: range.len(),
            offset: Cell::new(0),
            _0: PhantomData,
        }
    }
    pub fn remaining(&self) -> usize {
        self.len - self.offset.get()
    }
}

impl Dealloc for &Arena<'_> {
    type BlockHeader = SplitHeader;
    #[inline(always)]
    unsafe fn dealloc(_: *mut u8, _: Layout) {}
}

impl<'a> Manager for &'a Arena<'a> {
    type Dealloc = Self;
    unsafe fn alloc(self, layout: Layout) -> *mut u8 {
        let base = self.begin as usize;
        let current = align_to(base + self.offset.get(), layout.align()) - base;
        let end = current + layout.size();
        if end > self.len {
            return null_mut();
        }
        self.offset.set(end);
        self.begin.add(current)
    }
}
