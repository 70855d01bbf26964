//! In-memory stand-in for the boot core, for host tests.

use super::{hands_stack_to_sp_el0, registers::*, SystemRegisters};
use crate::{exception::ExceptionLevel, memory::PhysicalAddress};
use core::cell::{Cell, RefCell};

/// One observable register access, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Scr(u64),
    SpsrEl3(u64),
    Hcr(u64),
    Cnthctl(u64),
    Cntvoff(u64),
    SpsrEl2(u64),
    /// The live stack pointer was copied into SP_EL0 ahead of an `eret`.
    StackToSpEl0,
    Eret {
        from: ExceptionLevel,
        to: ExceptionLevel,
    },
    Sctlr(u64),
    Mair(u64),
    Tcr(u64),
    Ttbr0(u64),
    Ttbr1(u64),
    Synchronize,
}

/// 4 KiB granule supported, 40-bit PA.
const DEFAULT_ID_AA64MMFR0_EL1: u64 = 0b0010;

/// Stack selection is tracked only as the SPSel bit: an `eret` into a `t` mode clears it, and the
/// stack handoff before each `eret` follows [`hands_stack_to_sp_el0`]. The stacks themselves are
/// not modelled.
pub struct FakeCpu {
    current_el: Cell<u64>,
    spsel: Cell<u64>,
    daif: Cell<u64>,
    spsr_el3: Cell<u64>,
    spsr_el2: Cell<u64>,
    sctlr_el1: Cell<u64>,
    id_aa64mmfr0_el1: Cell<u64>,
    broken_eret: Cell<bool>,
    log: RefCell<Vec<Access>>,
}

impl FakeCpu {
    /// A core fresh out of reset at `level`, with every exception masked.
    pub fn at(level: ExceptionLevel) -> Self {
        Self {
            current_el: Cell::new((level.number() as u64) << 2),
            spsel: Cell::new(1),
            daif: Cell::new(0b1111),
            spsr_el3: Cell::new(0),
            spsr_el2: Cell::new(0),
            sctlr_el1: Cell::new(0),
            id_aa64mmfr0_el1: Cell::new(DEFAULT_ID_AA64MMFR0_EL1),
            broken_eret: Cell::new(false),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn with_id_aa64mmfr0_el1(self, raw: u64) -> Self {
        self.id_aa64mmfr0_el1.set(raw);
        self
    }

    pub fn with_sctlr_el1(self, raw: u64) -> Self {
        self.sctlr_el1.set(raw);
        self
    }

    /// `eret` is recorded but leaves the level untouched.
    pub fn with_broken_eret(self) -> Self {
        self.broken_eret.set(true);
        self
    }

    pub fn level(&self) -> ExceptionLevel {
        ExceptionLevel::from_current_el(&self.current_el())
    }

    pub fn daif(&self) -> u64 {
        self.daif.get()
    }

    pub fn spsel(&self) -> u64 {
        self.spsel.get()
    }

    pub fn sctlr_el1(&self) -> u64 {
        self.sctlr_el1.get()
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    fn record(&self, access: Access) {
        self.log.borrow_mut().push(access);
    }
}

impl SystemRegisters for FakeCpu {
    fn current_el(&self) -> CurrentLevel {
        CurrentLevel::from_raw(self.current_el.get())
    }

    fn write_scr_el3(&self, value: &SecureConfiguration) {
        self.record(Access::Scr(value.value()));
    }

    fn write_spsr_el3(&self, value: &SavedStatusEl3) {
        self.spsr_el3.set(value.value());
        self.record(Access::SpsrEl3(value.value()));
    }

    fn write_hcr_el2(&self, value: &HypervisorConfiguration) {
        self.record(Access::Hcr(value.value()));
    }

    fn write_cnthctl_el2(&self, value: &CounterTimerHypControl) {
        self.record(Access::Cnthctl(value.value()));
    }

    fn write_cntvoff_el2(&self, offset: u64) {
        self.record(Access::Cntvoff(offset));
    }

    fn write_spsr_el2(&self, value: &SavedStatusEl2) {
        self.spsr_el2.set(value.value());
        self.record(Access::SpsrEl2(value.value()));
    }

    fn return_to_lower_level(&self, from: ExceptionLevel) {
        assert_eq!(self.level(), from, "eret issued from the wrong level");

        let spsr = match from {
            ExceptionLevel::EL3 => self.spsr_el3.get(),
            ExceptionLevel::EL2 => self.spsr_el2.get(),
            _ => panic!("no saved status modelled for {}", from),
        };
        if hands_stack_to_sp_el0(self.spsel.get()) {
            self.record(Access::StackToSpEl0);
        }
        let target = ExceptionLevel::from_current_el(&CurrentLevel::from_raw(spsr & 0b1100));
        self.record(Access::Eret { from, to: target });

        if self.broken_eret.get() {
            return;
        }
        self.current_el.set((target.number() as u64) << 2);
        self.spsel.set(spsr & 1);
        self.daif.set((spsr >> 6) & 0b1111);
    }

    fn read_sctlr_el1(&self) -> SystemControl {
        SystemControl::read_back(self.sctlr_el1.get())
    }

    fn write_sctlr_el1(&self, value: &SystemControl) {
        self.sctlr_el1.set(value.value());
        self.record(Access::Sctlr(value.value()));
    }

    fn write_mair_el1(&self, value: &MemoryAttributes) {
        self.record(Access::Mair(value.value()));
    }

    fn write_tcr_el1(&self, value: &TranslationControl) {
        self.record(Access::Tcr(value.value()));
    }

    fn read_id_aa64mmfr0_el1(&self) -> MemoryModelFeatures {
        MemoryModelFeatures::from_raw(self.id_aa64mmfr0_el1.get())
    }

    fn write_ttbr0_el1(&self, table: PhysicalAddress) {
        self.record(Access::Ttbr0(table.value() as u64));
    }

    fn write_ttbr1_el1(&self, table: PhysicalAddress) {
        self.record(Access::Ttbr1(table.value() as u64));
    }

    fn synchronize(&self) {
        self.record(Access::Synchronize);
    }

    fn halt(&self) -> ! {
        panic!("halted")
    }
}
