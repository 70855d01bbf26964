//! Bit-range access on raw descriptor words.

use core::ops::Range;

pub trait Bitfields: Sized {
    fn get_bit(&self, index: usize) -> Self;
    fn get_bits(&self, range: Range<usize>) -> Self;

    fn set_bit<T: Into<Self>>(&mut self, index: usize, val: T) -> &mut Self;
    fn set_bits<T: Into<Self>>(&mut self, range: Range<usize>, val: T) -> &mut Self;
}

#[inline]
fn mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

impl Bitfields for u64 {
    fn get_bit(&self, index: usize) -> Self {
        (*self >> index) & 0b1
    }

    fn get_bits(&self, range: Range<usize>) -> Self {
        (*self >> range.start) & mask(range.end - range.start)
    }

    fn set_bit<T: Into<Self>>(&mut self, index: usize, val: T) -> &mut Self {
        self.set_bits(index..index + 1, val)
    }

    fn set_bits<T: Into<Self>>(&mut self, range: Range<usize>, val: T) -> &mut Self {
        let field = mask(range.end - range.start) << range.start;
        *self = (*self & !field) | ((val.into() << range.start) & field);
        self
    }
}
