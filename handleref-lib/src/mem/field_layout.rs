use core::{
    alloc::Layout,
    marker::PhantomData,
    mem::{align_of, size_of},
};

#[inline(always)]
const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

#[inline(always)]
pub const fn align_to(offset: usize, align: usize) -> usize {
    let mask = align - 1;
    (offset + mask) & !mask
}

/// Layout of a `T` field followed by an adjacent `A` field.
pub struct FieldLayout<T, A> {
    pub align: usize,
    pub size: usize,
    _0: PhantomData<(T, A)>,
}

impl<T, A> FieldLayout<T, A> {
    pub const fn align_to(adjacent_align: usize) -> FieldLayout<T, A> {
        assert!(adjacent_align.is_power_of_two());
        assert!(adjacent_align >= align_of::<A>());
        FieldLayout {
            align: max(align_of::<T>(), adjacent_align),
            size: align_to(size_of::<T>(), adjacent_align),
            _0: PhantomData,
        }
    }
    #[inline(always)]
    pub const fn layout(&self, adjacent_size: usize) -> Layout {
        unsafe { Layout::from_size_align_unchecked(self.size + adjacent_size, self.align) }
    }
    #[inline(always)]
    pub unsafe fn to_adjacent_mut(&self, p: *mut T) -> *mut A {
        (p as *mut u8).add(self.size) as *mut A
    }
    #[inline(always)]
    pub unsafe fn from_adjacent_mut(&self, p: *mut A) -> *mut T {
        (p as *mut u8).sub(self.size) as *mut T
    }
}
