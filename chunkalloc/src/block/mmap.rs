use std::io::Error;
use std::ptr;

#[cfg(target_family = "unix")]
use libc::{mmap, munmap, MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};

#[cfg(target_family = "windows")]
use winapi::um::memoryapi::{VirtualAlloc, VirtualFree};
#[cfg(target_family = "windows")]
use winapi::um::winnt::{MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE};

use super::{zero_sized, Block, ChunkAllocator};

/// A block backed by its own anonymous memory mapping.
///
/// On Unix platforms this maps private anonymous memory with `mmap`, on Windows the memory is
/// reserved and committed in one `VirtualAlloc` call. In both cases the OS rounds the mapping up
/// to whole pages and hands it out zeroed, so large blocks never touch the heap and are
/// returned to the OS as soon as they are dropped.
pub struct MmapBlock {
    ptr: *mut u8,
    size: usize,
}

unsafe impl Send for MmapBlock {}

// Mappings always start on a page boundary. 4 Kb is the smallest page size on every supported
// platform.
const PAGE_ALIGN: usize = 4096;

unsafe impl Block for MmapBlock {
    const ALIGN: usize = PAGE_ALIGN;

    #[cfg(target_family = "unix")]
    fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(zero_sized());
        }
        let ptr = unsafe {
            mmap(
                ptr::null_mut(),
                size,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANON,
                -1,
                0,
            )
        };
        if ptr == MAP_FAILED {
            Err(Error::last_os_error())
        } else {
            Ok(Self {
                ptr: ptr as *mut u8,
                size,
            })
        }
    }

    #[cfg(target_family = "windows")]
    fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(zero_sized());
        }
        let ptr = unsafe {
            VirtualAlloc(
                ptr::null_mut(),
                size,
                MEM_RESERVE | MEM_COMMIT,
                PAGE_READWRITE,
            )
        };
        if ptr.is_null() {
            Err(Error::last_os_error())
        } else {
            Ok(Self {
                ptr: ptr as *mut u8,
                size,
            })
        }
    }

    fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    fn len(&self) -> usize {
        self.size
    }
}

#[cfg(target_family = "unix")]
impl Drop for MmapBlock {
    fn drop(&mut self) {
        let result = unsafe { munmap(self.ptr as *mut libc::c_void, self.size) };
        debug_assert_eq!(result, 0);
    }
}

#[cfg(target_family = "windows")]
impl Drop for MmapBlock {
    fn drop(&mut self) {
        let result = unsafe { VirtualFree(self.ptr as *mut winapi::ctypes::c_void, 0, MEM_RELEASE) };
        debug_assert_ne!(result, 0);
    }
}

/// Allocates every block as a separate [MmapBlock](struct.MmapBlock.html).
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapAllocator;

impl ChunkAllocator for MmapAllocator {
    type Block = MmapBlock;

    fn allocate(&self, size: usize) -> Result<MmapBlock, Error> {
        MmapBlock::new(size)
    }
}
