//! The seam between bring-up logic and the privileged instructions it needs.
//!
//! Everything that descends exception levels or programs the MMU talks to the core through
//! [`SystemRegisters`]. On the board this is [`BootCpu`](super::BootCpu), which issues real
//! `msr`/`mrs`/`eret`; under test it is a fake that records every access.

use super::registers::*;
use crate::{errno::ErrorCode, exception::ExceptionLevel, memory::PhysicalAddress, println};
use core::fmt;

pub trait SystemRegisters {
    fn current_el(&self) -> CurrentLevel;

    fn write_scr_el3(&self, value: &SecureConfiguration);
    fn write_spsr_el3(&self, value: &SavedStatusEl3);

    fn write_hcr_el2(&self, value: &HypervisorConfiguration);
    fn write_cnthctl_el2(&self, value: &CounterTimerHypControl);
    fn write_cntvoff_el2(&self, offset: u64);
    fn write_spsr_el2(&self, value: &SavedStatusEl2);

    /// `eret` out of `from`. Execution resumes right after the call, one level down, using the
    /// current stack.
    ///
    /// The saved status of `from` must have been written first.
    fn return_to_lower_level(&self, from: ExceptionLevel);

    fn read_sctlr_el1(&self) -> SystemControl;
    fn write_sctlr_el1(&self, value: &SystemControl);
    fn write_mair_el1(&self, value: &MemoryAttributes);
    fn write_tcr_el1(&self, value: &TranslationControl);
    fn read_id_aa64mmfr0_el1(&self) -> MemoryModelFeatures;
    fn write_ttbr0_el1(&self, table: PhysicalAddress);
    fn write_ttbr1_el1(&self, table: PhysicalAddress);

    /// Full data synchronization barrier followed by an instruction barrier.
    fn synchronize(&self);

    /// Park the core. Never returns.
    fn halt(&self) -> !;
}

/// Whether an `eret` into a `t` mode must first copy the live stack pointer into SP_EL0.
///
/// `spsel` is the raw SPSel register. At 0 the core already runs on SP_EL0, where
/// `msr sp_el0` is UNDEFINED.
pub fn hands_stack_to_sp_el0(spsel: u64) -> bool {
    spsel & 1 == 1
}

/// Report an unrecoverable bring-up failure on the console and park the core.
pub fn fatal<C: SystemRegisters + ?Sized>(cpu: &C, args: fmt::Arguments) -> ! {
    println!("FATAL: {}", args);
    cpu.halt()
}

/// Bring-up steps that cannot fail gracefully.
pub trait OrHalt<T> {
    fn or_halt<C: SystemRegisters + ?Sized>(self, cpu: &C, context: &str) -> T;
}

impl<T> OrHalt<T> for Result<T, ErrorCode> {
    fn or_halt<C: SystemRegisters + ?Sized>(self, cpu: &C, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => fatal(cpu, format_args!("{}: {:?}", context, e)),
        }
    }
}
