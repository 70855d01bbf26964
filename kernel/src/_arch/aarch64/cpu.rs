//! Architectural processor code.
//!
//! # Orientation
//!
//! Since arch modules are imported into generic modules using the path attribute, the path of
//! this file is:
//!
//! crate::cpu::arch_cpu

#[path = "cpu/registers.rs"]
pub mod registers;

#[path = "cpu/port.rs"]
mod port;
pub use port::*;

#[path = "cpu/descent.rs"]
pub mod descent;

#[cfg(target_arch = "aarch64")]
#[path = "cpu/hardware.rs"]
mod hardware;
#[cfg(target_arch = "aarch64")]
pub use hardware::BootCpu;

#[cfg(test)]
#[path = "cpu/fake.rs"]
pub mod fake;

#[cfg(target_arch = "aarch64")]
use aarch64_cpu::asm;

/// Pause execution on the core.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub fn wait_forever() -> ! {
    loop {
        asm::wfe()
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------
#[cfg(all(target_arch = "aarch64", feature = "build_qemu"))]
use qemu_exit::QEMUExit;

#[cfg(all(target_arch = "aarch64", feature = "build_qemu"))]
const QEMU_EXIT_HANDLE: qemu_exit::AArch64 = qemu_exit::AArch64::new();

/// Make the host QEMU binary execute `exit(1)`.
#[cfg(all(target_arch = "aarch64", feature = "build_qemu"))]
pub fn qemu_exit_failure() -> ! {
    QEMU_EXIT_HANDLE.exit_failure()
}
