//! Exception levels.

use crate::cpu::{
    registers::{CurrentEL, CurrentLevel},
    SystemRegisters,
};
use core::fmt;

/// AArch64 exception level. Higher is more privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExceptionLevel {
    EL0 = 0,
    EL1 = 1,
    EL2 = 2,
    EL3 = 3,
}

impl ExceptionLevel {
    /// Where the prekernel hands over to the kernel proper.
    pub const TARGET: ExceptionLevel = ExceptionLevel::EL1;

    pub fn from_current_el(current: &CurrentLevel) -> Self {
        match current.read(CurrentEL::EL) {
            3 => ExceptionLevel::EL3,
            2 => ExceptionLevel::EL2,
            1 => ExceptionLevel::EL1,
            _ => ExceptionLevel::EL0,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// The level an `eret` from `self` can reach, if any.
    pub fn lower(self) -> Option<Self> {
        match self {
            ExceptionLevel::EL3 => Some(ExceptionLevel::EL2),
            ExceptionLevel::EL2 => Some(ExceptionLevel::EL1),
            ExceptionLevel::EL1 => Some(ExceptionLevel::EL0),
            ExceptionLevel::EL0 => None,
        }
    }
}

impl fmt::Display for ExceptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EL{}", self.number())
    }
}

pub fn current_exception_level<C: SystemRegisters + ?Sized>(cpu: &C) -> ExceptionLevel {
    ExceptionLevel::from_current_el(&cpu.current_el())
}
