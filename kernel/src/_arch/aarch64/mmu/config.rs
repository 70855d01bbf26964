/// 4 KiB granule, 48-bit input addresses, the walk starts at level 1 and ends at level 4.
#[allow(dead_code)]
pub mod config {
    use core::ops::Range;

    pub const OFFSET_BITS: usize = 12;
    pub const OFFSET_MASK: usize = (1 << OFFSET_BITS) - 1;

    pub const INDEX_BITS: usize = 9;
    pub const INDEX_MASK: usize = (1 << INDEX_BITS) - 1;

    pub const PAGE_SIZE: usize = 1 << OFFSET_BITS;
    pub const ENTRIES_PER_TABLE: usize = PAGE_SIZE / 8;

    pub const L4_INDEX_SHIFT: usize = OFFSET_BITS;
    pub const L3_INDEX_SHIFT: usize = OFFSET_BITS + INDEX_BITS;
    pub const L2_INDEX_SHIFT: usize = OFFSET_BITS + 2 * INDEX_BITS;
    pub const L1_INDEX_SHIFT: usize = OFFSET_BITS + 3 * INDEX_BITS;

    /// Bytes covered by one level-2 entry. Only level-2 slot 0 is ever linked.
    pub const L2_ENTRY_SPAN: usize = 1 << L2_INDEX_SHIFT;

    /// Output address field of table and page descriptors.
    pub const OUTPUT_ADDR_RANGE: Range<usize> = 12..48;
    pub const OUTPUT_ADDR_BITS: usize = 48;

    pub const VIRTUAL_ADDR_BITS: u64 = 48;
    pub const T0SZ: u64 = 64 - VIRTUAL_ADDR_BITS;
    pub const T1SZ: u64 = 64 - VIRTUAL_ADDR_BITS;

    /// MAIR_EL1 slots. Page descriptors refer to these by index.
    pub const NORMAL_MEMORY_ATTR_INDEX: u64 = 0;
    pub const DEVICE_MEMORY_ATTR_INDEX: u64 = 1;

    /// Level 1, level 2, level 3, then one level-4 table per level-3 entry.
    pub const IDENTITY_MAP_PAGES: usize = 3 + ENTRIES_PER_TABLE;
}
