//! Memory Management Unit driver.
//!
//! Only 4 KiB granule is supported. The identity map is built once in the page-table region, then
//! MAIR_EL1, TCR_EL1, TTBR0_EL1/TTBR1_EL1 and SCTLR_EL1 are programmed, in that order.

use crate::{
    cpu::{registers::*, SystemRegisters},
    errno::{ErrorCode, ENOTSUP},
    println, println_1,
};

#[path = "mmu/address.rs"]
mod address;
#[path = "mmu/allocator.rs"]
mod allocator;
#[path = "mmu/config.rs"]
mod mmu_config;
#[path = "mmu/translation_entry.rs"]
mod translation_entry;
#[path = "mmu/translation_table.rs"]
mod translation_table;

pub use address::*;
pub use allocator::*;
pub use mmu_config::config;
pub use translation_entry::*;
pub use translation_table::*;

/// Bits of physical address for each TCR_EL1.IPS / ID_AA64MMFR0_EL1.PARange encoding.
const PA_BITS: [u32; 7] = [32, 36, 40, 42, 44, 48, 52];

/// Descriptors carry a 36-bit frame number, so nothing past 48 bits can be output.
const MAX_IPS: u64 = 0b101;

pub struct MemoryManagementUnit;

impl MemoryManagementUnit {
    pub const fn new() -> Self {
        Self {}
    }

    fn is_4kb_page_supported(&self, features: &MemoryModelFeatures) -> bool {
        !features.matches_all(ID_AA64MMFR0_EL1::TGran4::NotSupported)
    }

    /// IPS encoding for the CPU's physical address range.
    fn physical_address_size(&self, features: &MemoryModelFeatures) -> u64 {
        features.read(ID_AA64MMFR0_EL1::PARange).min(MAX_IPS)
    }

    fn config_mair_el1<C: SystemRegisters + ?Sized>(&self, cpu: &C) {
        // Page descriptors select these by index, see `config::*_MEMORY_ATTR_INDEX`.
        let mair = MemoryAttributes::new();
        mair.modify(
            MAIR_EL1::Attr0::Normal_WriteBack_NonTransient_ReadWriteAlloc
                + MAIR_EL1::Attr1::Device_nGnRnE,
        );
        cpu.write_mair_el1(&mair);
    }

    fn config_tcr_el1<C: SystemRegisters + ?Sized>(&self, cpu: &C) -> Result<(), ErrorCode> {
        let features = cpu.read_id_aa64mmfr0_el1();
        if !self.is_4kb_page_supported(&features) {
            return Err(ENOTSUP);
        }

        let ips = self.physical_address_size(&features);
        println_1!(
            "4 KiB granule, {}-bit VA, {}-bit PA",
            config::VIRTUAL_ADDR_BITS,
            PA_BITS[ips as usize]
        );

        let tcr = TranslationControl::new();
        tcr.modify(
            TCR_EL1::IPS.val(ips)
                + TCR_EL1::TG1::KiB_4
                + TCR_EL1::SH1::Inner
                + TCR_EL1::ORGN1::WriteBack_ReadAlloc_WriteAlloc_Cacheable
                + TCR_EL1::IRGN1::WriteBack_ReadAlloc_WriteAlloc_Cacheable
                + TCR_EL1::EPD1::EnableTTBR1Walks
                + TCR_EL1::A1::TTBR0
                + TCR_EL1::T1SZ.val(config::T1SZ)
                + TCR_EL1::TG0::KiB_4
                + TCR_EL1::SH0::Inner
                + TCR_EL1::ORGN0::WriteBack_ReadAlloc_WriteAlloc_Cacheable
                + TCR_EL1::IRGN0::WriteBack_ReadAlloc_WriteAlloc_Cacheable
                + TCR_EL1::EPD0::EnableTTBR0Walks
                + TCR_EL1::T0SZ.val(config::T0SZ),
        );
        cpu.write_tcr_el1(&tcr);

        Ok(())
    }

    fn switch_to_page_table<C: SystemRegisters + ?Sized>(&self, cpu: &C, root: PhysicalAddress) {
        cpu.write_ttbr0_el1(root);
        cpu.write_ttbr1_el1(root);
    }

    /// Set SCTLR_EL1.M and nothing else, including fields this crate has no layout for.
    fn enable<C: SystemRegisters + ?Sized>(&self, cpu: &C) {
        let sctlr = cpu.read_sctlr_el1();
        sctlr.modify(SCTLR_EL1::M::Enable);
        cpu.write_sctlr_el1(&sctlr);

        cpu.synchronize();
    }

    /// Turn translation on with `root` as the level-1 table of both halves of the address space.
    pub fn activate<C: SystemRegisters + ?Sized>(
        &self,
        cpu: &C,
        root: PhysicalAddress,
    ) -> Result<(), ErrorCode> {
        self.config_mair_el1(cpu);
        self.config_tcr_el1(cpu)?;

        println!("[MMU]: switch to page table");
        self.switch_to_page_table(cpu, root);

        println!("[MMU]: activate");
        self.enable(cpu);

        Ok(())
    }

    /// Build the identity map for `layout` out of `allocator`'s region and activate it.
    ///
    /// Nothing is written if `layout` is invalid.
    pub fn init_identity_map<C: SystemRegisters + ?Sized>(
        &self,
        cpu: &C,
        allocator: &mut PageTableAllocator<'_>,
        layout: &IdentityMapLayout,
    ) -> Result<IdentityMap, ErrorCode> {
        layout.validate()?;

        println!("[MMU]: zero page tables");
        allocator.region_mut().zero();

        println!("[MMU]: build identity map");
        let map = IdentityMap::build(allocator, layout)?;
        println_1!(
            "{} pages mapped, {} of {} table pages used",
            map.mapped_pages(),
            allocator.allocated(),
            allocator.region().len()
        );

        let root = allocator.region().address_of(map.root());
        self.activate(cpu, root)?;

        Ok(map)
    }
}

pub static MMU: MemoryManagementUnit = MemoryManagementUnit::new();
