// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2020-2022 Andre Richter <andre.o.richter@gmail.com>

//! Processor code.

#[path = "_arch/aarch64/cpu.rs"]
mod arch_cpu;

pub use arch_cpu::*;
