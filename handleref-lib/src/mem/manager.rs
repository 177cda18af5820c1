use core::{alloc::Layout, ptr::NonNull};

use log::debug;

use super::{block::header::BlockHeader, block::Block, error::HandleError, handle::Handle};

pub trait Dealloc {
    type BlockHeader: BlockHeader;
    unsafe fn dealloc(ptr: *mut u8, layout: Layout);
}

/// Block = (Header, Object)
pub trait Manager: Sized {
    // required:
    type Dealloc: Dealloc;
    /// Returns a null pointer when the memory can't be allocated.
    unsafe fn alloc(self, layout: Layout) -> *mut u8;
    // optional:
    /// Allocate a block for a new object and construct the object with `f`.
    /// `f` is not called when the allocation fails.
    fn handle_new_with<T>(
        self,
        f: impl FnOnce() -> T,
    ) -> Result<Handle<T, Self::Dealloc>, HandleError> {
        let layout = Block::<T, Self::Dealloc>::LAYOUT;
        unsafe {
            let Some(p) = NonNull::new(self.alloc(layout) as *mut Block<T, Self::Dealloc>) else {
                debug!(
                    "allocation of {} bytes aligned to {} failed",
                    layout.size(),
                    layout.align()
                );
                return Err(HandleError::out_of_memory(layout));
            };
            p.as_ptr().write(Block::new(f()));
            Ok(Handle::from_block(p))
        }
    }
    fn handle_new<T>(self, value: T) -> Result<Handle<T, Self::Dealloc>, HandleError> {
        self.handle_new_with(|| value)
    }
}
