// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2018-2022 Andre Richter <andre.o.richter@gmail.com>

//! Top-level BSP file for the Raspberry Pi 3.

pub mod memory;

use super::device_driver::PL011UartInner;
use crate::console::{self, Console};

static PL011_UART: Console<PL011UartInner> =
    Console::new(unsafe { PL011UartInner::new(memory::map::UART_START) });

pub fn board_name() -> &'static str {
    "Raspberry Pi 3"
}

/// Route `print!` to UART0.
///
/// # Safety
///
/// - The UART must be mapped at [`memory::map::UART_START`], or translation must be off.
pub unsafe fn init_console() {
    console::register_console(&PL011_UART);
}
