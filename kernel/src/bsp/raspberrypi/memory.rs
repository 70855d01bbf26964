//! The physical memory layout.
//!
//! The firmware copies the kernel binary to 0x8_0000. The region below it is the boot core's
//! stack. The page-table region sits after `.bss`, see `kernel.ld`.
//!
//! +---------------------------------------+
//! |                                       | 0x0
//! | Boot-core Stack                       |                                ^
//! |                                       |                                | stack growth
//! +---------------------------------------+
//! |                                       | 0x8_0000
//! | .text .rodata .data .bss              |
//! |                                       |
//! +---------------------------------------+
//! | .page_tables (515 * 4 KiB)            |
//! +---------------------------------------+
//! |                                       |
//! | ... normal memory ...                 |
//! +---------------------------------------+
//! |                                       | PERIPHERAL_START @ 0x3F00_0000
//! | peripherals                           |
//! +---------------------------------------+ 0x3FFF_FFFF

pub mod map {
    use crate::memory::{IdentityMapLayout, PaRange};

    pub const PERIPHERAL_START: usize = 0x3F00_0000;
    pub const MEMORY_END_INCLUSIVE: usize = 0x3FFF_FFFF;

    pub const UART_OFFSET: usize = 0x0020_1000;
    pub const UART_START: usize = PERIPHERAL_START + UART_OFFSET;

    /// RAM, mapped as normal cacheable memory.
    pub const NORMAL: PaRange = PaRange::new(0x0000_0000, PERIPHERAL_START - 1);

    /// Peripherals, mapped as device memory.
    pub const DEVICE: PaRange = PaRange::new(PERIPHERAL_START, MEMORY_END_INCLUSIVE);

    pub const IDENTITY_MAP: IdentityMapLayout = IdentityMapLayout::new(NORMAL, DEVICE);
}

#[cfg(test)]
mod tests {
    use super::map::*;

    #[test]
    fn test_identity_map_layout() {
        assert!(IDENTITY_MAP.validate().is_ok());
        assert_eq!(NORMAL.page_count(), 258048);
        assert_eq!(DEVICE.page_count(), 4096);
        assert!(DEVICE.start().value() <= UART_START && UART_START < DEVICE.end().value());
    }
}
