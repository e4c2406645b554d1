// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock control operations, implemented on [crate::Rcc].
//!
//! - [phclk]: gating the clock of individual peripherals
//! - [source]: oscillators, PLLs and the system clock switch

pub mod phclk;
pub mod source;
