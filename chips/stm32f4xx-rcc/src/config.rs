// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the RCC core.
//!
//! Runtime behaviour (how long to wait for a clock source) is configured per
//! [crate::Rcc] through [crate::RccConfig]. The options here only select
//! diagnostics, and this is the only place in the crate where `cfg!` is used
//! to read Cargo features.

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Whether every register bank read and write is traced to the log
    /// output.
    ///
    /// Has no visible effect unless the `log` or `defmt` feature is enabled
    /// as well.
    pub(crate) trace_register_access: bool,
}

/// The single instance of [Config].
pub(crate) const CONFIG: Config = Config {
    trace_register_access: cfg!(feature = "trace_register_access"),
};
