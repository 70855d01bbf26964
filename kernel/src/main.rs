// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2018-2022 Andre Richter <andre.o.richter@gmail.com>

//! The `kernel` binary.

#![no_main]
#![no_std]

mod panic_wait;

#[path = "_arch/aarch64/cpu/boot.rs"]
mod boot;

use core::ptr::addr_of;
use prekernel::{
    bsp,
    cpu::{self, BootCpu, OrHalt},
    memory::{PageTableAllocator, PageTableRegion},
    println,
};

extern "C" {
    static __page_tables_start: u8;
    static __page_tables_end_exclusive: u8;
}

/// Early init code.
///
/// # Safety
///
/// - Only a single core must be active and running this function.
unsafe fn kernel_init() -> ! {
    bsp::init_console();
    println!("[0] {} prekernel", bsp::board_name());

    let cpu = BootCpu::new();

    let start = addr_of!(__page_tables_start) as usize;
    let end = addr_of!(__page_tables_end_exclusive) as usize;
    let region = PageTableRegion::from_raw_parts(start, end - start).or_halt(&cpu, "page tables");
    let mut allocator = PageTableAllocator::new(region);

    let map = prekernel::bring_up(&cpu, &mut allocator, &bsp::memory::map::IDENTITY_MAP);

    println!(
        "[1] MMU on: {} pages identity mapped, root table at {}",
        map.mapped_pages(),
        allocator.region().address_of(map.root())
    );

    cpu::wait_forever()
}
