use core::alloc::Layout;
use std::alloc::{alloc, dealloc};

use super::{
    block::split_header::SplitHeader,
    manager::{Dealloc, Manager},
};

#[derive(Debug, Clone, Copy)]
pub struct Global();

pub const GLOBAL: Global = Global();

impl Dealloc for Global {
    type BlockHeader = SplitHeader;
    #[inline(always)]
    unsafe fn dealloc(ptr: *mut u8, layout: Layout) {
        dealloc(ptr, layout)
    }
}

impl Manager for Global {
    type Dealloc = Global;
    #[inline(always)]
    unsafe fn alloc(self, layout: Layout) -> *mut u8 {
        alloc(layout)
    }
}
