use core::{
    alloc::Layout,
    cell::Cell,
    ptr::null_mut,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::{
    field_layout::FieldLayout,
    global::{Global, GLOBAL},
    manager::{Dealloc, Manager},
};

/// A manager that counts its live blocks and bytes.
///
/// Every allocation is prefixed with a pointer back to the `Local` it came
/// from, so deallocation needs no manager instance.
#[derive(Debug)]
pub struct Local {
    counter: AtomicUsize,
    size: AtomicUsize,
}

impl Default for Local {
    #[inline(always)]
    fn default() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            size: AtomicUsize::new(0),
        }
    }
}

type Header = *const Local;

type HeaderLayout = FieldLayout<Header, u8>;

impl Local {
    fn layout(block_layout: Layout) -> (HeaderLayout, Layout) {
        let header_layout = HeaderLayout::align_to(block_layout.align());
        let layout = header_layout.layout(block_layout.size());
        (header_layout, layout)
    }
    /// The number of blocks allocated and not yet released.
    pub fn block_count(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
    /// The number of bytes allocated and not yet released, prefixes included.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }
}

impl Dealloc for &Local {
    type BlockHeader = Cell<usize>;
    unsafe fn dealloc(block_p: *mut u8, block_layout: Layout) {
        let (header_layout, layout) = Local::layout(block_layout);
        let p = header_layout.from_adjacent_mut(block_p);
        {
            let local = &**p;
            local.counter.fetch_sub(1, Ordering::Relaxed);
            local.size.fetch_sub(layout.size(), Ordering::Relaxed);
        }
        Global::dealloc(p as *mut u8, layout);
    }
}

impl<'a> Manager for &'a Local {
    type Dealloc = Self;
    unsafe fn alloc(self, block_layout: Layout) -> *mut u8 {
        let (header_layout, layout) = Local::layout(block_layout);
        let p = GLOBAL.alloc(layout) as *mut Header;
        if p.is_null() {
            return null_mut();
        }
        self.counter.fetch_add(1, Ordering::Relaxed);
        self.size.fetch_add(layout.size(), Ordering::Relaxed);
        p.write(self);
        header_layout.to_adjacent_mut(p)
    }
}
