//! Walking the core down from its reset exception level to EL1.
//!
//! Each step programs the controls of the level being left, then `eret`s with every DAIF bit
//! masked in the saved status, so no interrupt can be taken while the core is in between
//! configurations. After each `eret` the level is read back, and anything but the expected level
//! halts the boot.

use super::{fatal, registers::*, SystemRegisters};
use crate::{
    exception::{current_exception_level, ExceptionLevel},
    println_1,
};

/// One step of the descent, chosen by the level the core is observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    El3ToEl2,
    El2ToEl1,
    /// Already at the target; apply the EL1 control state and stop.
    SetUpEl1,
    /// No way to reach EL1 from here.
    Unsupported(ExceptionLevel),
}

impl Transition {
    pub fn from_level(level: ExceptionLevel) -> Self {
        match level {
            ExceptionLevel::TARGET => Transition::SetUpEl1,
            ExceptionLevel::EL3 => Transition::El3ToEl2,
            ExceptionLevel::EL2 => Transition::El2ToEl1,
            other => Transition::Unsupported(other),
        }
    }
}

pub fn el3_secure_configuration() -> SecureConfiguration {
    let scr = SecureConfiguration::new();
    scr.modify(SCR_EL3::RW::NextELIsAarch64 + SCR_EL3::NS::NonSecure + SCR_EL3::HCE::HvcEnabled);
    scr
}

pub fn el3_saved_status() -> SavedStatusEl3 {
    let spsr = SavedStatusEl3::new();
    spsr.modify(
        SPSR_EL3::D::Masked
            + SPSR_EL3::A::Masked
            + SPSR_EL3::I::Masked
            + SPSR_EL3::F::Masked
            + SPSR_EL3::M::EL2t,
    );
    spsr
}

pub fn el2_hypervisor_configuration() -> HypervisorConfiguration {
    let hcr = HypervisorConfiguration::new();
    hcr.modify(HCR_EL2::RW::EL1IsAarch64);
    hcr
}

pub fn el2_timer_access() -> CounterTimerHypControl {
    let cnthctl = CounterTimerHypControl::new();
    cnthctl.modify(CNTHCTL_EL2::EL1PCEN::SET + CNTHCTL_EL2::EL1PCTEN::SET);
    cnthctl
}

pub fn el2_saved_status() -> SavedStatusEl2 {
    let spsr = SavedStatusEl2::new();
    spsr.modify(
        SPSR_EL2::D::Masked
            + SPSR_EL2::A::Masked
            + SPSR_EL2::I::Masked
            + SPSR_EL2::F::Masked
            + SPSR_EL2::M::EL1t,
    );
    spsr
}

/// Baseline EL1 control state plus EL0 access to cache maintenance, WFE/WFI, `DC ZVA` and DAIF,
/// and alignment checking.
pub fn el1_system_control() -> SystemControl {
    let sctlr = SystemControl::baseline();
    sctlr.modify(
        SCTLR_EL1::UCT::SET
            + SCTLR_EL1::nTWE::SET
            + SCTLR_EL1::nTWI::SET
            + SCTLR_EL1::DZE::SET
            + SCTLR_EL1::UMA::SET
            + SCTLR_EL1::SA0::SET
            + SCTLR_EL1::SA::SET
            + SCTLR_EL1::A::Enable,
    );
    sctlr
}

fn leave_el3<C: SystemRegisters + ?Sized>(cpu: &C) {
    cpu.write_scr_el3(&el3_secure_configuration());
    cpu.write_spsr_el3(&el3_saved_status());
    cpu.return_to_lower_level(ExceptionLevel::EL3);
}

fn leave_el2<C: SystemRegisters + ?Sized>(cpu: &C) {
    cpu.write_hcr_el2(&el2_hypervisor_configuration());
    cpu.write_cnthctl_el2(&el2_timer_access());
    cpu.write_cntvoff_el2(0);
    cpu.write_spsr_el2(&el2_saved_status());
    cpu.return_to_lower_level(ExceptionLevel::EL2);
}

fn set_up_el1<C: SystemRegisters + ?Sized>(cpu: &C) {
    cpu.write_sctlr_el1(&el1_system_control());
}

/// Lower the core to EL1 from whatever level it booted in. Halts on EL0 or on a level that
/// failed to drop.
pub fn drop_to_el1<C: SystemRegisters + ?Sized>(cpu: &C) {
    let mut level = current_exception_level(cpu);

    loop {
        match Transition::from_level(level) {
            Transition::El3ToEl2 => leave_el3(cpu),
            Transition::El2ToEl1 => leave_el2(cpu),
            Transition::SetUpEl1 => {
                set_up_el1(cpu);
                return;
            }
            Transition::Unsupported(el) => fatal(
                cpu,
                format_args!("CPU booted in unsupported exception level {}", el),
            ),
        }

        let now = current_exception_level(cpu);
        if Some(now) != level.lower() {
            fatal(
                cpu,
                format_args!("at {} after eret from {}", now, level),
            );
        }
        println_1!("{} -> {}", level, now);
        level = now;
    }
}
