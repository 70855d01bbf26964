//! From https://stackoverflow.com/questions/68785276/bare-metal-spinlock-implementation-in-rust
//!
//! Exclusive load/store only behaves on the Pi once the MMU is on, data caching is enabled and the
//! lock sits in normal cacheable memory. None of that holds while the prekernel runs, so the boot
//! core uses a lock that never contends. Secondary cores are parked before any Rust code runs.

use core::sync::atomic::AtomicU8;
use lock_api::{GuardSend, RawMutex};

pub struct PhantomSpinlock(pub AtomicU8);

unsafe impl RawMutex for PhantomSpinlock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: PhantomSpinlock = PhantomSpinlock(AtomicU8::new(0));

    type GuardMarker = GuardSend;

    fn lock(&self) {
        while !self.try_lock() {}
    }

    #[inline(never)]
    fn try_lock(&self) -> bool {
        true
    }

    unsafe fn unlock(&self) {}
}

#[cfg(test)]
mod tests {
    use crate::synchronization::Spinlock;

    #[test]
    fn test_phantom_spinlock() {
        let l = Spinlock::new(32_u32);
        {
            let mut guard = l.lock();
            *guard = guard.pow(2);
        }
        assert_eq!(*l.lock(), 1024);
        // Never contends: a second guard can be taken while the first is alive.
        let _a = l.lock();
        assert!(l.try_lock().is_some());
    }
}
