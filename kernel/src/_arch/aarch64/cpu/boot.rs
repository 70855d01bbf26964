// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2021-2022 Andre Richter <andre.o.richter@gmail.com>

//! Architectural boot code.
//!
//! # Orientation
//!
//! Included by the `kernel` binary with the path attribute, so the path of this file is:
//!
//! crate::boot

use core::arch::global_asm;

// Assembly counterpart to this file.
global_asm!(
    include_str!("boot.s"),
    CONST_CORE_ID_MASK = const 0b11
);

/// The Rust entry of the `kernel` binary.
///
/// The function is called from the assembly `_start` function, on the boot core, at whatever
/// exception level the firmware left it in.
///
/// # Safety
///
/// - Called exactly once, with `.bss` zeroed and the boot stack set up.
#[no_mangle]
pub unsafe extern "C" fn _start_rust() -> ! {
    crate::kernel_init()
}
