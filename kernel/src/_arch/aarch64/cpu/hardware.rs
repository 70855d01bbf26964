//! The boot core itself.

use super::{hands_stack_to_sp_el0, registers as view, SystemRegisters};
use crate::{exception::ExceptionLevel, memory::PhysicalAddress, sys_coproc_write_raw};
use aarch64_cpu::{
    asm::{barrier, wfi},
    registers::*,
};
use core::arch::asm;
use tock_registers::interfaces::{Readable, Writeable};

/// SPSR_EL3, which `aarch64-cpu` does not expose.
struct SpsrEl3Reg;

impl Writeable for SpsrEl3Reg {
    type T = u64;
    type R = ();

    sys_coproc_write_raw!(u64, "SPSR_EL3", "x");
}

static SPSR_EL3: SpsrEl3Reg = SpsrEl3Reg;

/// [`SystemRegisters`] backed by `msr`/`mrs` on the executing core.
pub struct BootCpu;

impl BootCpu {
    pub const fn new() -> Self {
        Self
    }
}

impl SystemRegisters for BootCpu {
    fn current_el(&self) -> view::CurrentLevel {
        view::CurrentLevel::from_raw(CurrentEL.get())
    }

    fn write_scr_el3(&self, value: &view::SecureConfiguration) {
        SCR_EL3.set(value.value());
    }

    fn write_spsr_el3(&self, value: &view::SavedStatusEl3) {
        SPSR_EL3.set(value.value());
    }

    fn write_hcr_el2(&self, value: &view::HypervisorConfiguration) {
        HCR_EL2.set(value.value());
    }

    fn write_cnthctl_el2(&self, value: &view::CounterTimerHypControl) {
        CNTHCTL_EL2.set(value.value());
    }

    fn write_cntvoff_el2(&self, offset: u64) {
        CNTVOFF_EL2.set(offset);
    }

    fn write_spsr_el2(&self, value: &view::SavedStatusEl2) {
        SPSR_EL2.set(value.value());
    }

    /// The return address is the label right after `eret`. The saved status selects the `t` stack
    /// of the lower level, so SP_EL0 takes over the live stack if the core is not on it already.
    #[inline(never)]
    fn return_to_lower_level(&self, from: ExceptionLevel) {
        let copy_stack = hands_stack_to_sp_el0(SPSel.get()) as u64;

        match from {
            ExceptionLevel::EL3 => unsafe {
                asm!(
                    "cbz {copy}, 3f",
                    "mov {tmp}, sp",
                    "msr sp_el0, {tmp}",
                    "3:",
                    "adr {tmp}, 2f",
                    "msr elr_el3, {tmp}",
                    "eret",
                    "2:",
                    copy = in(reg) copy_stack,
                    tmp = out(reg) _,
                )
            },
            ExceptionLevel::EL2 => unsafe {
                asm!(
                    "cbz {copy}, 3f",
                    "mov {tmp}, sp",
                    "msr sp_el0, {tmp}",
                    "3:",
                    "adr {tmp}, 2f",
                    "msr elr_el2, {tmp}",
                    "eret",
                    "2:",
                    copy = in(reg) copy_stack,
                    tmp = out(reg) _,
                )
            },
            // Nothing below EL2 is left by the descent.
            ExceptionLevel::EL1 | ExceptionLevel::EL0 => {}
        }
    }

    fn read_sctlr_el1(&self) -> view::SystemControl {
        view::SystemControl::read_back(SCTLR_EL1.get())
    }

    fn write_sctlr_el1(&self, value: &view::SystemControl) {
        SCTLR_EL1.set(value.value());
    }

    fn write_mair_el1(&self, value: &view::MemoryAttributes) {
        MAIR_EL1.set(value.value());
    }

    fn write_tcr_el1(&self, value: &view::TranslationControl) {
        TCR_EL1.set(value.value());
    }

    fn read_id_aa64mmfr0_el1(&self) -> view::MemoryModelFeatures {
        view::MemoryModelFeatures::from_raw(ID_AA64MMFR0_EL1.get())
    }

    fn write_ttbr0_el1(&self, table: PhysicalAddress) {
        TTBR0_EL1.set(table.value() as u64);
    }

    fn write_ttbr1_el1(&self, table: PhysicalAddress) {
        TTBR1_EL1.set(table.value() as u64);
    }

    fn synchronize(&self) {
        barrier::dsb(barrier::ISH);
        barrier::isb(barrier::SY);
    }

    fn halt(&self) -> ! {
        loop {
            wfi()
        }
    }
}
