use super::config;
use crate::errno::{ErrorCode, ERANGE};
use core::{convert::TryFrom, fmt};

/// An address in the physical address space. With the identity map in place it is also the
/// virtual address of the same byte.
#[derive(Default, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash)]
#[repr(transparent)]
pub struct PhysicalAddress(usize);

/// Half-open `[start, end)` physical range.
#[derive(Eq, PartialEq, Clone, Copy)]
pub struct PaRange {
    start: PhysicalAddress,
    end: PhysicalAddress,
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA({:#x})", self.0)
    }
}

impl fmt::LowerHex for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for PaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  ->  {}", self.start, self.end)
    }
}

impl fmt::Debug for PaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}  ->  {:?}", self.start, self.end)
    }
}

impl TryFrom<usize> for PhysicalAddress {
    type Error = ErrorCode;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if (value as u64) >> config::OUTPUT_ADDR_BITS != 0 {
            Err(ERANGE)
        } else {
            Ok(Self(value))
        }
    }
}

#[allow(non_snake_case)]
impl PhysicalAddress {
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn value(&self) -> usize {
        self.0
    }

    pub fn offset(&self) -> usize {
        self.0 & config::OFFSET_MASK
    }

    pub fn is_4K_aligned(&self) -> bool {
        self.offset() == 0
    }

    pub fn is_aligned_to(&self, alignment: usize) -> bool {
        self.0 & (alignment - 1) == 0
    }

    pub fn checked_add(&self, bytes: usize) -> Option<Self> {
        self.0
            .checked_add(bytes)
            .and_then(|v| Self::try_from(v).ok())
    }

    pub fn as_mut_ptr<T>(&self) -> *mut T {
        self.0 as *mut T
    }

    pub fn l1_index(&self) -> usize {
        (self.0 >> config::L1_INDEX_SHIFT) & config::INDEX_MASK
    }

    pub fn l2_index(&self) -> usize {
        (self.0 >> config::L2_INDEX_SHIFT) & config::INDEX_MASK
    }

    pub fn l3_index(&self) -> usize {
        (self.0 >> config::L3_INDEX_SHIFT) & config::INDEX_MASK
    }

    pub fn l4_index(&self) -> usize {
        (self.0 >> config::L4_INDEX_SHIFT) & config::INDEX_MASK
    }
}

impl PaRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: PhysicalAddress::new(start),
            end: PhysicalAddress::new(end),
        }
    }

    pub fn start(&self) -> PhysicalAddress {
        self.start
    }

    pub fn end(&self) -> PhysicalAddress {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &PaRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }

    /// Number of pages whose base address falls inside the range.
    pub fn page_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end.0 - self.start.0).div_ceil(config::PAGE_SIZE)
        }
    }

    /// Base address of every page in the range, ascending.
    pub fn pages(&self) -> impl Iterator<Item = PhysicalAddress> {
        let start = self.start.0;
        (0..self.page_count()).map(move |i| PhysicalAddress(start + i * config::PAGE_SIZE))
    }

    pub fn last_page(&self) -> Option<PhysicalAddress> {
        self.page_count()
            .checked_sub(1)
            .map(|i| PhysicalAddress(self.start.0 + i * config::PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_address_indices() {
        let pa = PhysicalAddress::new(0x3F20_1000);
        assert_eq!(pa.l1_index(), 0);
        assert_eq!(pa.l2_index(), 0);
        assert_eq!(pa.l3_index(), 0x3F20_1000 >> 21);
        assert_eq!(pa.l4_index(), 1);
        assert!(pa.is_4K_aligned());
        assert!(!PhysicalAddress::new(0x3F20_1008).is_4K_aligned());
        assert!(PhysicalAddress::new(0x20_0000).is_aligned_to(0x20_0000));

        assert_eq!(PhysicalAddress::try_from(1usize << 48), Err(ERANGE));
        assert_eq!(PhysicalAddress::new(usize::MAX).checked_add(1), None);
        assert_eq!(format!("{}", pa), "0x000000003f201000");
    }

    #[test]
    fn test_pa_range_pages() {
        let normal = PaRange::new(0x0, 0x3EFF_FFFF);
        let device = PaRange::new(0x3F00_0000, 0x3FFF_FFFF);
        assert_eq!(normal.page_count(), 258048);
        assert_eq!(device.page_count(), 4096);
        assert_eq!(normal.last_page(), Some(PhysicalAddress::new(0x3EFF_F000)));
        assert_eq!(device.last_page(), Some(PhysicalAddress::new(0x3FFF_F000)));
        assert!(!normal.overlaps(&device));

        let pages: Vec<_> = PaRange::new(0x1000, 0x3001).pages().collect();
        assert_eq!(
            pages,
            vec![
                PhysicalAddress::new(0x1000),
                PhysicalAddress::new(0x2000),
                PhysicalAddress::new(0x3000)
            ]
        );

        let empty = PaRange::new(0x2000, 0x2000);
        assert!(empty.is_empty());
        assert_eq!(empty.page_count(), 0);
        assert_eq!(empty.last_page(), None);
        assert!(!empty.overlaps(&PaRange::new(0x0, 0x10_0000)));
        assert!(PaRange::new(0x0, 0x2001).overlaps(&PaRange::new(0x2000, 0x3000)));
    }
}
