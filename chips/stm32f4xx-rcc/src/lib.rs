// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset and clock control (RCC) core for the STM32F4xx family.
//!
//! This crate owns the clock-control state logic of the chip:
//!
//! * gating the clock of individual peripherals on the AHB1, AHB2, AHB3, APB1
//!   and APB2 buses ([clocks::phclk]),
//! * turning the HSI, HSE and PLL sources on and off, waiting for them to
//!   report stable, and bypassing the HSE oscillator ([clocks::source]),
//! * switching the system clock multiplexer to a stable source.
//!
//! All register accesses go through a [RegisterBank]. On the chip the bank is
//! the memory-mapped block at [RCC_BASE]; on a host the [RccEmulator] stands
//! in for it.
//!
//! ```rust,ignore
//! use stm32f4xx_rcc::clocks::phclk::{PeripheralClockType, HCLK1};
//! use stm32f4xx_rcc::{ClockSource, ClockStatus, Rcc, SysClockSource, RCC_BASE};
//!
//! let rcc = Rcc::new(RCC_BASE);
//!
//! rcc.enable_peripheral_clock(PeripheralClockType::AHB1(HCLK1::GPIOA));
//!
//! rcc.set_clock_status(ClockSource::HSE, ClockStatus::ON);
//! rcc.set_sys_clock_source(SysClockSource::HSE)?;
//! ```
//!
//! The crate performs no locking. Read-modify-write sequences on a register
//! are not atomic with respect to interrupts, callers sharing an [Rcc]
//! between execution contexts must serialize access themselves.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod clocks;
mod config;
pub mod emulator;
pub mod rcc;
pub mod static_ref;

pub use crate::clocks::phclk::{Bus, PeripheralClock, PeripheralClockType};
pub use crate::clocks::source::{ClockSource, ClockStatus, OscillatorFields, SysClockSource};
pub use crate::emulator::RccEmulator;
pub use crate::rcc::{
    Rcc, RccConfig, RccError, RccRegister, RccRegisters, ReadyWait, RegisterBank, RCC_BASE,
};
pub use crate::static_ref::StaticRef;

/// Generic operations that clock-like things are expected to support.
///
/// Unlike the fire-and-forget form used by most drivers, `enable` and
/// `disable` report whether the requested state was confirmed by reading the
/// hardware back.
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self) -> bool;
    fn disable(&self) -> bool;
}
