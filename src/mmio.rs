//! Memory-mapped peripheral register access.
//!
//! Owns one open `/dev/mem` descriptor and one mapped 4 KiB register block,
//! exposed as an indexed array of 32-bit registers through the [`Registers`]
//! trait.
//!
//! ## Access contract
//!
//! Every register access is a direct observation or mutation of hardware
//! state. All reads and writes go through `ptr::read_volatile` /
//! `ptr::write_volatile`, so the compiler may not elide, cache, or reorder
//! them the way it would ordinary memory traffic. Callers must never keep a
//! software copy of hardware-controlled bits; re-read the register instead.
//!
//! There is no bounds checking beyond the fixed block size — offsets must
//! stay within [`BLOCK_WORDS`].

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::ptr;

use crate::error::Error;

/// Size of the mapped register block in bytes.
pub const BLOCK_SIZE: usize = 4 * 1024;

/// Size of the mapped register block in 32-bit words.
pub const BLOCK_WORDS: usize = BLOCK_SIZE / 4;

/// Word-granularity register access.
///
/// Implemented by [`Peripheral`] over real hardware, and by RAM-backed
/// fakes in tests so the pin layer can be exercised on the host.
pub trait Registers {
    /// Read the 32-bit register at `index` words into the block.
    fn read(&self, index: usize) -> u32;

    /// Write the 32-bit register at `index` words into the block.
    ///
    /// Takes `&self`: a register write mutates hardware, not this handle.
    fn write(&self, index: usize, value: u32);
}

/// An open `/dev/mem` descriptor plus one mapped register block.
///
/// Resources are released exactly once, on drop; the mapping is never
/// accessible afterwards because the handle is consumed with it.
pub struct Peripheral {
    // Held only so the descriptor is closed when the mapping goes away.
    _fd: OwnedFd,
    base: *mut u32,
}

impl Peripheral {
    /// Open `/dev/mem` and map [`BLOCK_SIZE`] bytes at the given physical
    /// address.
    ///
    /// Requires root. A mapping failure closes the already-opened
    /// descriptor before returning.
    pub fn map(phys_addr: u64) -> Result<Self, Error> {
        // O_SYNC keeps the kernel from write-combining device accesses.
        let raw = unsafe { libc::open(c"/dev/mem".as_ptr(), libc::O_RDWR | libc::O_SYNC) };
        if raw < 0 {
            return Err(Error::DeviceOpen(io::Error::last_os_error()));
        }
        // SAFETY: `raw` is a freshly opened, valid descriptor we own.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: length and descriptor are valid; the kernel picks the
        // virtual address. MAP_SHARED because this is device memory.
        let map = unsafe {
            libc::mmap(
                ptr::null_mut(),
                BLOCK_SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                phys_addr as libc::off_t,
            )
        };
        if map == libc::MAP_FAILED {
            // `fd` drops here, closing the descriptor.
            return Err(Error::MemoryMap(io::Error::last_os_error()));
        }

        Ok(Self {
            _fd: fd,
            base: map.cast::<u32>(),
        })
    }
}

impl Registers for Peripheral {
    fn read(&self, index: usize) -> u32 {
        debug_assert!(index < BLOCK_WORDS);
        // SAFETY: `base` points at a live BLOCK_SIZE mapping and `index`
        // stays inside it per the module contract.
        unsafe { ptr::read_volatile(self.base.add(index)) }
    }

    fn write(&self, index: usize, value: u32) {
        debug_assert!(index < BLOCK_WORDS);
        // SAFETY: as above.
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}

impl Drop for Peripheral {
    fn drop(&mut self) {
        // SAFETY: `base` is the address returned by mmap, unmapped exactly
        // once. The descriptor closes when `_fd` drops right after.
        unsafe {
            libc::munmap(self.base.cast::<libc::c_void>(), BLOCK_SIZE);
        }
    }
}
