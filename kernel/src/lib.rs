//! AArch64 prekernel.
//!
//! Brings the boot core from whatever exception level the firmware left it in down to EL1, then
//! builds an identity map of physical memory and turns the MMU on.
//!
//! Everything that touches a system register goes through [`cpu::SystemRegisters`], so the whole
//! sequence also runs on the host against `cpu::fake::FakeCpu`.

#![allow(clippy::upper_case_acronyms)]
#![cfg_attr(not(test), no_std)]

mod synchronization;

pub mod bsp;
pub mod console;
pub mod cpu;
pub mod errno;
pub mod exception;
pub mod macros;
pub mod memory;
pub mod print;
pub mod utils;

use cpu::{OrHalt, SystemRegisters};
use memory::{IdentityMap, IdentityMapLayout, PageTableAllocator, MMU};

/// Descend to EL1 and run with `layout` identity mapped.
///
/// Never returns on failure: the cause is printed and the core halts.
pub fn bring_up<C: SystemRegisters + ?Sized>(
    cpu: &C,
    allocator: &mut PageTableAllocator<'_>,
    layout: &IdentityMapLayout,
) -> IdentityMap {
    println!("CPU started in: {}", exception::current_exception_level(cpu));
    cpu::descent::drop_to_el1(cpu);

    MMU.init_identity_map(cpu, allocator, layout)
        .or_halt(cpu, "MMU initialization")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bsp::memory::map,
        cpu::fake::{Access, FakeCpu},
        exception::ExceptionLevel,
        memory::{config, PageTableRegion, PhysicalAddress, TablePage},
    };
    use std::panic::{catch_unwind, AssertUnwindSafe};

    const REGION_START: usize = 0x0008_0000;

    fn is_mmu_access(access: &Access) -> bool {
        matches!(
            access,
            Access::Mair(_) | Access::Tcr(_) | Access::Ttbr0(_) | Access::Ttbr1(_)
        )
    }

    #[test]
    fn test_bring_up_from_el3() {
        let cpu = FakeCpu::at(ExceptionLevel::EL3);
        let mut pages = vec![TablePage::zeroed(); config::IDENTITY_MAP_PAGES];
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);

        let map = bring_up(&cpu, &mut allocator, &map::IDENTITY_MAP);

        assert_eq!(cpu.level(), ExceptionLevel::EL1);
        assert_eq!(cpu.sctlr_el1() & 1, 1);
        assert_eq!(map.mapped_pages(), 258048 + 4096);
        assert_eq!(allocator.allocated(), config::IDENTITY_MAP_PAGES);

        let log = cpu.accesses();
        let first_mmu = log.iter().position(is_mmu_access).unwrap();
        let last_eret = log
            .iter()
            .rposition(|a| matches!(a, Access::Eret { .. }))
            .unwrap();
        assert!(last_eret < first_mmu);
    }

    #[test]
    fn test_bring_up_from_el0_halts_before_mmu() {
        let cpu = FakeCpu::at(ExceptionLevel::EL0);
        let mut pages = vec![TablePage::zeroed(); config::IDENTITY_MAP_PAGES];
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);

        let result = catch_unwind(AssertUnwindSafe(|| {
            bring_up(&cpu, &mut allocator, &map::IDENTITY_MAP);
        }));

        assert!(result.is_err());
        assert!(!cpu.accesses().iter().any(is_mmu_access));
        assert_eq!(allocator.allocated(), 0);
    }

    #[test]
    fn test_bring_up_small_region_halts() {
        let cpu = FakeCpu::at(ExceptionLevel::EL2);
        let mut pages = vec![TablePage::zeroed(); 40];
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);

        let result = catch_unwind(AssertUnwindSafe(|| {
            bring_up(&cpu, &mut allocator, &map::IDENTITY_MAP);
        }));

        assert!(result.is_err());
        assert_eq!(cpu.level(), ExceptionLevel::EL1);
        assert_eq!(allocator.allocated(), 40);
        assert!(!cpu.accesses().iter().any(is_mmu_access));
    }
}
