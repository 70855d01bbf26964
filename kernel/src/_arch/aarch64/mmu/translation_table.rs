use super::{address::*, allocator::*, config, translation_entry::*};
use crate::errno::{ErrorCode, EALIGN, EINVAL, ERANGE};
use core::ops::{Index, IndexMut};

/// One 4 KiB translation-table page, untyped.
#[derive(Clone, Copy)]
#[repr(C, align(4096))]
pub struct TablePage {
    entries: [u64; config::ENTRIES_PER_TABLE],
}

/// A [`TablePage`] read as the table of level `L`.
#[repr(transparent)]
pub struct TranslationTable<L> {
    entries: [TranslationTableEntry<L>; config::ENTRIES_PER_TABLE],
}

impl TablePage {
    pub const fn zeroed() -> Self {
        Self {
            entries: [0; config::ENTRIES_PER_TABLE],
        }
    }

    pub fn zero(&mut self) {
        self.entries.fill(0);
    }

    pub fn is_zeroed(&self) -> bool {
        self.entries.iter().all(|e| *e == 0)
    }

    pub fn as_table<L: TranslationTableLevel>(&self) -> &TranslationTable<L> {
        // SAFETY: `TranslationTable<L>` is a transparent array of transparent `u64`s, the same
        // layout as `entries`, and any bit pattern is a valid entry.
        unsafe { &*(self as *const Self as *const TranslationTable<L>) }
    }

    pub fn as_table_mut<L: TranslationTableLevel>(&mut self) -> &mut TranslationTable<L> {
        // SAFETY: see `as_table`.
        unsafe { &mut *(self as *mut Self as *mut TranslationTable<L>) }
    }
}

impl<L: TranslationTableLevel> Index<usize> for TranslationTable<L> {
    type Output = TranslationTableEntry<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<L: TranslationTableLevel> IndexMut<usize> for TranslationTable<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.entries[index]
    }
}

impl<L: TranslationTableLevel> TranslationTable<L> {
    pub fn iter(&self) -> impl Iterator<Item = &TranslationTableEntry<L>> {
        self.entries.iter()
    }

    pub fn valid_entries(&self) -> usize {
        self.iter().filter(|e| e.is_valid()).count()
    }
}

/// The two physical ranges the identity map covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMapLayout {
    pub normal: PaRange,
    pub device: PaRange,
}

impl IdentityMapLayout {
    pub const fn new(normal: PaRange, device: PaRange) -> Self {
        Self { normal, device }
    }

    pub fn regions(&self) -> [(PaRange, MemoryKind); 2] {
        [
            (self.normal, MemoryKind::Normal),
            (self.device, MemoryKind::Device),
        ]
    }

    /// Leaf entries the map populates.
    pub fn page_count(&self) -> usize {
        self.normal.page_count() + self.device.page_count()
    }

    /// Both ranges non-empty, page-aligned, disjoint, and inside the span of level-2 slot 0.
    pub fn validate(&self) -> Result<(), ErrorCode> {
        for (range, _) in self.regions() {
            if range.is_empty() {
                return Err(EINVAL);
            }
            if !range.start().is_4K_aligned() {
                return Err(EALIGN);
            }
            match range.last_page() {
                Some(last) if last.value() < config::L2_ENTRY_SPAN => {}
                _ => return Err(ERANGE),
            }
        }
        if self.normal.overlaps(&self.device) {
            return Err(EINVAL);
        }
        Ok(())
    }
}

/// A built identity map: where its tables live inside the page-table region.
pub struct IdentityMap {
    root: PageHandle,
    leaves: [PageHandle; config::ENTRIES_PER_TABLE],
    mapped_pages: usize,
}

fn link<L: TableLevel>(
    region: &mut PageTableRegion<'_>,
    table: PageHandle,
    index: usize,
    next: PageHandle,
) -> Result<(), ErrorCode> {
    let next_addr = region.address_of(next);
    let entry = &mut region.page_mut(table).as_table_mut::<L>()[index];
    if entry.is_valid() {
        return Err(EINVAL);
    }

    let mut descriptor = entry.set_table();
    descriptor.set_next_level_table_addr(next_addr)?;
    descriptor.set_valid();
    Ok(())
}

fn next_table(
    region: &PageTableRegion<'_>,
    descriptor: Descriptor,
) -> Result<PageHandle, ErrorCode> {
    match descriptor {
        Descriptor::Table { next } => region.handle_of(next).ok_or(ERANGE),
        _ => Err(EINVAL),
    }
}

impl IdentityMap {
    /// Allocate the level 1 to level 3 spine and all 512 leaf tables, then write one page
    /// descriptor per page of `layout`.
    ///
    /// Tables come out of `allocator` in walk order: level 1, level 2, level 3, then the leaves
    /// in level-3 index order.
    pub fn build(
        allocator: &mut PageTableAllocator<'_>,
        layout: &IdentityMapLayout,
    ) -> Result<Self, ErrorCode> {
        layout.validate()?;

        let root = allocator.take_page()?;
        let l2 = allocator.take_page()?;
        link::<Level1>(allocator.region_mut(), root, 0, l2)?;
        let l3 = allocator.take_page()?;
        link::<Level2>(allocator.region_mut(), l2, 0, l3)?;

        let mut leaves = [PageHandle::default(); config::ENTRIES_PER_TABLE];
        for (index, leaf) in leaves.iter_mut().enumerate() {
            *leaf = allocator.take_page()?;
            link::<Level3>(allocator.region_mut(), l3, index, *leaf)?;
        }

        let mut map = Self {
            root,
            leaves,
            mapped_pages: 0,
        };
        for (range, kind) in layout.regions() {
            for page in range.pages() {
                map.map_page(allocator.region_mut(), page, kind)?;
            }
        }

        Ok(map)
    }

    fn map_page(
        &mut self,
        region: &mut PageTableRegion<'_>,
        page: PhysicalAddress,
        kind: MemoryKind,
    ) -> Result<(), ErrorCode> {
        let leaf = self.leaves[page.l3_index()];
        let entry = &mut region.page_mut(leaf).as_table_mut::<Level4>()[page.l4_index()];
        if entry.is_valid() {
            return Err(EINVAL);
        }

        let mut descriptor = entry.set_page();
        descriptor
            .set_AF(1)
            .set_SH(kind.shareability())
            .set_AttrIndx(kind.attr_index());
        descriptor.set_output_addr(page)?;
        descriptor.set_valid();

        self.mapped_pages += 1;
        Ok(())
    }

    /// The level-1 table, for TTBR0/TTBR1.
    pub fn root(&self) -> PageHandle {
        self.root
    }

    /// The level-4 table behind level-3 slot `l3_index`.
    pub fn leaf_table(&self, l3_index: usize) -> PageHandle {
        self.leaves[l3_index]
    }

    pub fn mapped_pages(&self) -> usize {
        self.mapped_pages
    }

    /// Walk the tables for `addr` the way the MMU does, and return the level-4 entry it lands on.
    pub fn translate(
        &self,
        region: &PageTableRegion<'_>,
        addr: PhysicalAddress,
    ) -> Result<TranslationTableEntry<Level4>, ErrorCode> {
        let l1 = region.page(self.root).as_table::<Level1>()[addr.l1_index()];

        let l2_table = next_table(region, l1.descriptor())?;
        let l2 = region.page(l2_table).as_table::<Level2>()[addr.l2_index()];

        let l3_table = next_table(region, l2.descriptor())?;
        let l3 = region.page(l3_table).as_table::<Level3>()[addr.l3_index()];

        let l4_table = next_table(region, l3.descriptor())?;
        Ok(region.page(l4_table).as_table::<Level4>()[addr.l4_index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::ENOMEM;

    const REGION_START: usize = 0x0008_0000;

    fn backing(n: usize) -> Vec<TablePage> {
        vec![TablePage::zeroed(); n]
    }

    fn small_layout() -> IdentityMapLayout {
        IdentityMapLayout::new(
            PaRange::new(0x0000_0000, 0x0040_0000),
            PaRange::new(0x3F00_0000, 0x3F00_3000),
        )
    }

    #[test]
    fn test_layout_validation() {
        let aligned = PaRange::new(0x0, 0x1000);
        let device = PaRange::new(0x3F00_0000, 0x3FFF_FFFF);

        assert_eq!(IdentityMapLayout::new(aligned, device).validate(), Ok(()));
        assert_eq!(
            IdentityMapLayout::new(PaRange::new(0x10, 0x2000), device).validate(),
            Err(EALIGN)
        );
        assert_eq!(
            IdentityMapLayout::new(PaRange::new(0x1000, 0x1000), device).validate(),
            Err(EINVAL)
        );
        assert_eq!(
            IdentityMapLayout::new(PaRange::new(0x0, 0x3F00_1000), device).validate(),
            Err(EINVAL)
        );
        assert_eq!(
            IdentityMapLayout::new(aligned, PaRange::new(0x3F00_0000, 0x4000_1000)).validate(),
            Err(ERANGE)
        );
    }

    #[test]
    fn test_topology() {
        let mut pages = backing(config::IDENTITY_MAP_PAGES);
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);

        let map = IdentityMap::build(&mut allocator, &small_layout()).unwrap();
        let region = allocator.region();

        assert_eq!(allocator.allocated(), config::IDENTITY_MAP_PAGES);
        assert_eq!(region.address_of(map.root()), PhysicalAddress::new(REGION_START));

        let l1 = region.page(map.root()).as_table::<Level1>();
        assert_eq!(l1.valid_entries(), 1);
        let l2 = region.page(next_table(region, l1[0].descriptor()).unwrap());
        assert_eq!(l2.as_table::<Level2>().valid_entries(), 1);
        let l3_handle = next_table(region, l2.as_table::<Level2>()[0].descriptor()).unwrap();
        let l3 = region.page(l3_handle).as_table::<Level3>();

        assert_eq!(l3.valid_entries(), config::ENTRIES_PER_TABLE);
        for (index, entry) in l3.iter().enumerate() {
            assert_eq!(
                entry.descriptor(),
                Descriptor::Table {
                    next: region.address_of(map.leaf_table(index))
                }
            );
        }
    }

    #[test]
    fn test_small_layout_round_trip() {
        let mut pages = backing(config::IDENTITY_MAP_PAGES);
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);
        let layout = small_layout();

        let map = IdentityMap::build(&mut allocator, &layout).unwrap();
        assert_eq!(map.mapped_pages(), 1024 + 3);

        for (range, kind) in layout.regions() {
            for page in range.pages() {
                let entry = map.translate(allocator.region(), page).unwrap();
                assert_eq!(
                    entry.descriptor(),
                    Descriptor::Page {
                        output: page,
                        attr_index: kind.attr_index() as u8,
                        shareability: kind.shareability() as u8,
                        access_flag: true,
                    }
                );
            }
        }

        let unmapped = map
            .translate(allocator.region(), PhysicalAddress::new(0x0040_0000))
            .unwrap();
        assert_eq!(unmapped.descriptor(), Descriptor::Invalid);
    }

    #[test]
    fn test_reference_layout() {
        let mut pages = backing(config::IDENTITY_MAP_PAGES);
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);
        let layout = IdentityMapLayout::new(
            PaRange::new(0x0000_0000, 0x3EFF_FFFF),
            PaRange::new(0x3F00_0000, 0x3FFF_FFFF),
        );

        let map = IdentityMap::build(&mut allocator, &layout).unwrap();
        assert_eq!(map.mapped_pages(), 258048 + 4096);
        assert_eq!(layout.page_count(), map.mapped_pages());

        let region = allocator.region();
        let mut normal = 0;
        let mut device = 0;
        for l3_index in 0..config::ENTRIES_PER_TABLE {
            let leaf = region.page(map.leaf_table(l3_index)).as_table::<Level4>();
            for entry in leaf.iter() {
                match entry.descriptor() {
                    Descriptor::Page { attr_index: 0, .. } => normal += 1,
                    Descriptor::Page { attr_index: 1, .. } => device += 1,
                    Descriptor::Invalid => {}
                    other => panic!("unexpected leaf descriptor {:?}", other),
                }
            }
        }
        assert_eq!((normal, device), (258048, 4096));

        let uart = map
            .translate(region, PhysicalAddress::new(0x3F20_1000))
            .unwrap();
        assert_eq!(
            uart.descriptor(),
            Descriptor::Page {
                output: PhysicalAddress::new(0x3F20_1000),
                attr_index: 1,
                shareability: Shareability::OuterShareable as u8,
                access_flag: true,
            }
        );
    }

    #[test]
    fn test_build_out_of_pages() {
        let mut pages = backing(40);
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);

        assert_eq!(
            IdentityMap::build(&mut allocator, &small_layout()).err(),
            Some(ENOMEM)
        );
        assert_eq!(allocator.allocated(), 40);
    }

    #[test]
    fn test_build_rejects_layout_before_allocating() {
        let mut pages = backing(config::IDENTITY_MAP_PAGES);
        let region = PageTableRegion::new(&mut pages, PhysicalAddress::new(REGION_START)).unwrap();
        let mut allocator = PageTableAllocator::new(region);
        let layout = IdentityMapLayout::new(
            PaRange::new(0x0, 0x2000),
            PaRange::new(0x1000, 0x3000),
        );

        assert_eq!(IdentityMap::build(&mut allocator, &layout).err(), Some(EINVAL));
        assert_eq!(allocator.allocated(), 0);
    }
}
