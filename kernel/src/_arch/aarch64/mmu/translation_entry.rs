use super::{address::*, config};
use crate::{
    errno::{ErrorCode, EALIGN, EINVAL, ERANGE},
    utils::bitfields::Bitfields,
};
use core::{fmt, marker::PhantomData};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level1;
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level2;
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level3;
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level4;

pub trait TranslationTableLevel {
    const LEVEL: u8;
    /// Entries at this level map pages instead of pointing at tables.
    const LEAF: bool = false;
}
impl TranslationTableLevel for Level1 {
    const LEVEL: u8 = 1;
}
impl TranslationTableLevel for Level2 {
    const LEVEL: u8 = 2;
}
impl TranslationTableLevel for Level3 {
    const LEVEL: u8 = 3;
}
impl TranslationTableLevel for Level4 {
    const LEVEL: u8 = 4;
    const LEAF: bool = true;
}

/// Levels whose entries may point at a next-level table.
pub trait TableLevel: TranslationTableLevel {}
impl TableLevel for Level1 {}
impl TableLevel for Level2 {}
impl TableLevel for Level3 {}

/// Levels whose entries map pages.
pub trait PageLevel: TranslationTableLevel {}
impl PageLevel for Level4 {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Shareability {
    NonShareable = 0b00,
    OuterShareable = 0b10,
    InnerShareable = 0b11,
}

impl TryFrom<u64> for Shareability {
    type Error = ErrorCode;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(Self::NonShareable),
            0b10 => Ok(Self::OuterShareable),
            0b11 => Ok(Self::InnerShareable),
            _ => Err(EINVAL),
        }
    }
}

/// The two kinds of memory the identity map distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    Normal,
    Device,
}

impl MemoryKind {
    pub fn attr_index(self) -> u64 {
        match self {
            MemoryKind::Normal => config::NORMAL_MEMORY_ATTR_INDEX,
            MemoryKind::Device => config::DEVICE_MEMORY_ATTR_INDEX,
        }
    }

    pub fn shareability(self) -> Shareability {
        match self {
            MemoryKind::Normal => Shareability::InnerShareable,
            MemoryKind::Device => Shareability::OuterShareable,
        }
    }
}

/// What a raw entry decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Invalid,
    Table {
        next: PhysicalAddress,
    },
    Page {
        output: PhysicalAddress,
        attr_index: u8,
        shareability: u8,
        access_flag: bool,
    },
    /// Valid, but a form the identity map never writes (a block, or a reserved encoding).
    Unsupported(u64),
}

#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct TranslationTableEntry<L> {
    entry: u64,
    _l: PhantomData<L>,
}

impl<L: TranslationTableLevel> fmt::Display for TranslationTableEntry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}: {:#018x}", L::LEVEL, self.entry)
    }
}

impl<L: TranslationTableLevel> fmt::Debug for TranslationTableEntry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}: {:?}", L::LEVEL, self.descriptor())
    }
}

#[repr(transparent)]
pub struct TableEntry<'a> {
    entry: &'a mut u64,
}

#[repr(transparent)]
pub struct PageEntry<'a> {
    entry: &'a mut u64,
}

fn encode_output_addr(entry: &mut u64, addr: PhysicalAddress) -> Result<(), ErrorCode> {
    if !addr.is_4K_aligned() {
        return Err(EALIGN);
    }
    let v = addr.value() as u64;
    if v >> config::OUTPUT_ADDR_BITS != 0 {
        return Err(ERANGE);
    }
    entry.set_bits(config::OUTPUT_ADDR_RANGE, v >> config::OFFSET_BITS);
    Ok(())
}

fn decode_output_addr(entry: u64) -> PhysicalAddress {
    let frame = entry.get_bits(config::OUTPUT_ADDR_RANGE);
    PhysicalAddress::new((frame << config::OFFSET_BITS) as usize)
}

#[allow(non_snake_case)]
impl<'a> PageEntry<'a> {
    pub fn get_AF(&self) -> u8 {
        self.entry.get_bit(10) as u8
    }

    pub fn get_SH(&self) -> u8 {
        self.entry.get_bits(8..10) as u8
    }

    pub fn get_AttrIndx(&self) -> u8 {
        self.entry.get_bits(2..5) as u8
    }

    pub fn set_AF(&mut self, v: u64) -> &mut Self {
        self.entry.set_bit(10, v);
        self
    }

    pub fn set_SH(&mut self, v: Shareability) -> &mut Self {
        self.entry.set_bits(8..10, v as u64);
        self
    }

    pub fn set_AttrIndx(&mut self, v: u64) -> &mut Self {
        self.entry.set_bits(2..5, v);
        self
    }

    pub fn get_output_addr(&self) -> PhysicalAddress {
        decode_output_addr(*self.entry)
    }

    pub fn set_output_addr(&mut self, addr: PhysicalAddress) -> Result<(), ErrorCode> {
        encode_output_addr(self.entry, addr)
    }

    pub fn value(&self) -> u64 {
        *self.entry
    }

    pub fn set_valid(self) {
        self.entry.set_bit(0, 1u64);
    }
}

impl<'a> TableEntry<'a> {
    pub fn get_next_level_table_addr(&self) -> PhysicalAddress {
        decode_output_addr(*self.entry)
    }

    pub fn set_next_level_table_addr(&mut self, addr: PhysicalAddress) -> Result<(), ErrorCode> {
        encode_output_addr(self.entry, addr)
    }

    pub fn value(&self) -> u64 {
        *self.entry
    }

    pub fn set_valid(self) {
        self.entry.set_bit(0, 1u64);
    }
}

impl<L> TranslationTableEntry<L> {
    pub const fn from_raw(entry: u64) -> Self {
        Self {
            entry,
            _l: PhantomData,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.entry.get_bit(0) == 1
    }

    pub fn invalid(&mut self) {
        self.entry = 0;
    }

    pub fn get_type(&self) -> u8 {
        self.entry.get_bit(1) as u8
    }

    pub fn value(&self) -> u64 {
        self.entry
    }
}

impl<L: TranslationTableLevel> TranslationTableEntry<L> {
    pub fn descriptor(&self) -> Descriptor {
        if !self.is_valid() {
            return Descriptor::Invalid;
        }
        match (self.get_type(), L::LEAF) {
            (1, false) => Descriptor::Table {
                next: decode_output_addr(self.entry),
            },
            (1, true) => Descriptor::Page {
                output: decode_output_addr(self.entry),
                attr_index: self.entry.get_bits(2..5) as u8,
                shareability: self.entry.get_bits(8..10) as u8,
                access_flag: self.entry.get_bit(10) == 1,
            },
            _ => Descriptor::Unsupported(self.entry),
        }
    }
}

impl<L: TableLevel> TranslationTableEntry<L> {
    pub fn set_table(&mut self) -> TableEntry<'_> {
        self.entry.set_bit(1, 1u64);
        TableEntry {
            entry: &mut self.entry,
        }
    }
}

impl<L: PageLevel> TranslationTableEntry<L> {
    pub fn set_page(&mut self) -> PageEntry<'_> {
        self.entry.set_bit(1, 1u64);
        PageEntry {
            entry: &mut self.entry,
        }
    }
}
