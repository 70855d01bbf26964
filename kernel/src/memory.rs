//! Memory management: the identity map, and typed access to memory-mapped registers.

use core::{marker::PhantomData, ops::Deref};

#[path = "_arch/aarch64/mmu.rs"]
mod arch_mmu;

pub use arch_mmu::*;

/// A register block of type `T` at a fixed MMIO address.
pub struct MMIOWrapper<T> {
    start_addr: usize,
    _marker: PhantomData<T>,
}

impl<T> MMIOWrapper<T> {
    /// # Safety
    ///
    /// - `start_addr` must be the base of a live device whose registers are laid out as `T`.
    pub const unsafe fn new(start_addr: usize) -> Self {
        Self {
            start_addr,
            _marker: PhantomData,
        }
    }
}

impl<T> Deref for MMIOWrapper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.start_addr as *const _) }
    }
}
