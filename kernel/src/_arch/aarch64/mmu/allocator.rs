//! Page-table memory: a fixed region of 4 KiB slots, handed out front to back.

use super::{address::*, config, translation_table::TablePage};
use crate::errno::{ErrorCode, EALIGN, EINVAL, ENOMEM, ERANGE};
use core::fmt;

/// Index of a page inside a [`PageTableRegion`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageHandle(usize);

impl PageHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Memory reserved for translation tables, and the physical address it starts at.
pub struct PageTableRegion<'a> {
    pages: &'a mut [TablePage],
    start: PhysicalAddress,
}

impl<'a> PageTableRegion<'a> {
    pub fn new(pages: &'a mut [TablePage], start: PhysicalAddress) -> Result<Self, ErrorCode> {
        if pages.is_empty() {
            return Err(EINVAL);
        }
        if !start.is_4K_aligned() {
            return Err(EALIGN);
        }
        start
            .checked_add(pages.len() * config::PAGE_SIZE)
            .ok_or(ERANGE)?;

        Ok(Self { pages, start })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn start(&self) -> PhysicalAddress {
        self.start
    }

    pub fn end_exclusive(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.start.value() + self.len() * config::PAGE_SIZE)
    }

    pub fn zero(&mut self) {
        self.pages.iter_mut().for_each(TablePage::zero);
    }

    pub fn address_of(&self, handle: PageHandle) -> PhysicalAddress {
        PhysicalAddress::new(self.start.value() + handle.0 * config::PAGE_SIZE)
    }

    /// The page starting at `addr`, if the region holds one.
    pub fn handle_of(&self, addr: PhysicalAddress) -> Option<PageHandle> {
        if !addr.is_4K_aligned() || addr < self.start || addr >= self.end_exclusive() {
            return None;
        }
        Some(PageHandle((addr.value() - self.start.value()) / config::PAGE_SIZE))
    }

    pub fn page(&self, handle: PageHandle) -> &TablePage {
        &self.pages[handle.0]
    }

    pub fn page_mut(&mut self, handle: PageHandle) -> &mut TablePage {
        &mut self.pages[handle.0]
    }
}

impl PageTableRegion<'static> {
    /// Wrap the linker-reserved range `[start, start + size)`.
    ///
    /// # Safety
    ///
    /// - The range must be identity mapped (or translation off), writable, and used by nothing
    ///   else for as long as the region lives.
    pub unsafe fn from_raw_parts(start: usize, size: usize) -> Result<Self, ErrorCode> {
        if size == 0 {
            return Err(EINVAL);
        }
        if start % config::PAGE_SIZE != 0 || size % config::PAGE_SIZE != 0 {
            return Err(EALIGN);
        }
        let phys_start = PhysicalAddress::try_from(start)?;
        let pages = core::slice::from_raw_parts_mut(
            phys_start.as_mut_ptr::<TablePage>(),
            size / config::PAGE_SIZE,
        );

        Self::new(pages, phys_start)
    }
}

/// Bump allocator over a [`PageTableRegion`]. Pages are never given back.
pub struct PageTableAllocator<'a> {
    region: PageTableRegion<'a>,
    next: usize,
}

impl<'a> PageTableAllocator<'a> {
    pub fn new(region: PageTableRegion<'a>) -> Self {
        Self { region, next: 0 }
    }

    /// A zeroed page, above every page handed out before it.
    pub fn take_page(&mut self) -> Result<PageHandle, ErrorCode> {
        if self.next >= self.region.len() {
            return Err(ENOMEM);
        }
        let handle = PageHandle(self.next);
        self.region.page_mut(handle).zero();
        self.next += 1;

        Ok(handle)
    }

    /// The page the next [`take_page`](Self::take_page) returns.
    pub fn peek(&self) -> Option<PageHandle> {
        (self.next < self.region.len()).then_some(PageHandle(self.next))
    }

    pub fn allocated(&self) -> usize {
        self.next
    }

    pub fn remaining(&self) -> usize {
        self.region.len() - self.next
    }

    pub fn region(&self) -> &PageTableRegion<'a> {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut PageTableRegion<'a> {
        &mut self.region
    }
}
