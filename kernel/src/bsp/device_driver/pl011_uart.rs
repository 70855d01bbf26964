//! Transmit side of the PL011 UART.
//!
//! The firmware (or QEMU) leaves UART0 configured and enabled, so nothing is initialized here.

use crate::memory::MMIOWrapper;
use core::fmt;
use tock_registers::{
    interfaces::{Readable, Writeable},
    register_bitfields, register_structs,
    registers::{ReadOnly, ReadWrite},
};

register_bitfields! {
    u32,

    DR [
        DATA OFFSET(0) NUMBITS(8) []
    ],

    FR [
        /// Transmit FIFO full.
        TXFF OFFSET(5) NUMBITS(1) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => DR: ReadWrite<u32, DR::Register>),
        (0x04 => _reserved1),
        (0x18 => FR: ReadOnly<u32, FR::Register>),
        (0x1C => @END),
    }
}

type Registers = MMIOWrapper<RegisterBlock>;

pub struct PL011UartInner {
    registers: Registers,
    chars_written: usize,
}

impl PL011UartInner {
    /// # Safety
    ///
    /// - `mmio_start_addr` must be the base of a PL011 that is already enabled for transmit.
    pub const unsafe fn new(mmio_start_addr: usize) -> Self {
        Self {
            registers: Registers::new(mmio_start_addr),
            chars_written: 0,
        }
    }

    fn write_char(&mut self, c: char) {
        while self.registers.FR.is_set(FR::TXFF) {
            core::hint::spin_loop();
        }
        self.registers.DR.write(DR::DATA.val(c as u32));
        self.chars_written += 1;
    }

    pub fn chars_written(&self) -> usize {
        self.chars_written
    }
}

impl fmt::Write for PL011UartInner {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if c == '\n' {
                self.write_char('\r');
            }
            self.write_char(c);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_newline_becomes_crlf() {
        // DR at word 0, FR at word 6 with TXFF clear.
        let mut block = vec![0u32; 7];
        let mut uart = unsafe { PL011UartInner::new(block.as_mut_ptr() as usize) };

        writeln!(uart, "EL{}", 1).unwrap();

        assert_eq!(uart.chars_written(), 5);
        assert_eq!(block[0], '\n' as u32);
    }
}
