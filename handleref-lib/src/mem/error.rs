use core::{alloc::Layout, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    OutOfMemory { size: usize, align: usize },
    Empty,
    Invalidated,
    Borrowed,
    BorrowedMut,
}

impl HandleError {
    pub fn out_of_memory(layout: Layout) -> Self {
        HandleError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

impl Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleError::OutOfMemory { size, align } => write!(
                f,
                "out of memory: cannot allocate {size} bytes aligned to {align}"
            ),
            HandleError::Empty => f.write_str("empty handle"),
            HandleError::Invalidated => f.write_str("invalid reference"),
            HandleError::Borrowed => f.write_str("object is borrowed through a reference"),
            HandleError::BorrowedMut => f.write_str("object is mutably borrowed"),
        }
    }
}

impl std::error::Error for HandleError {}

#[cfg(test)]
mod test {
    use core::alloc::Layout;

    use wasm_bindgen_test::wasm_bindgen_test;

    use super::HandleError;

    #[test]
    #[wasm_bindgen_test]
    fn test_display() {
        let e = HandleError::out_of_memory(Layout::from_size_align(8, 8).unwrap());
        assert_eq!(e, HandleError::OutOfMemory { size: 8, align: 8 });
        assert_eq!(
            e.to_string(),
            "out of memory: cannot allocate 8 bytes aligned to 8"
        );
        assert_eq!(HandleError::Empty.to_string(), "empty handle");
        assert_eq!(HandleError::Invalidated.to_string(), "invalid reference");
    }
}
