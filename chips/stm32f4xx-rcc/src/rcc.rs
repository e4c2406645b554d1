// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset and clock control registers and the [Rcc] handle.
//!
//! The register layout follows RM0390 (STM32F446xx). Only the registers the
//! clock-control core touches are modelled: the clock control register
//! (`RCC_CR`), the clock configuration register (`RCC_CFGR`) and the five bus
//! peripheral clock enable registers.

use core::fmt;

use tock_registers::fields::FieldValue;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs, LocalRegisterCopy};

use crate::clocks::source::ClockSource;
use crate::config::CONFIG;
use crate::static_ref::StaticRef;

register_structs! {
    /// Reset and clock control
    pub RccRegisters {
        /// clock control register
        (0x00 => cr: ReadWrite<u32, CR::Register>),
        (0x04 => _reserved0),
        /// clock configuration register
        (0x08 => cfgr: ReadWrite<u32, CFGR::Register>),
        (0x0C => _reserved1),
        /// AHB1 peripheral clock enable register
        (0x30 => ahb1enr: ReadWrite<u32>),
        /// AHB2 peripheral clock enable register
        (0x34 => ahb2enr: ReadWrite<u32>),
        /// AHB3 peripheral clock enable register
        (0x38 => ahb3enr: ReadWrite<u32>),
        (0x3C => _reserved2),
        /// APB1 peripheral clock enable register
        (0x40 => apb1enr: ReadWrite<u32>),
        /// APB2 peripheral clock enable register
        (0x44 => apb2enr: ReadWrite<u32>),
        (0x48 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// PLLSAI clock ready flag
        PLLSAIRDY OFFSET(29) NUMBITS(1) [],
        /// PLLSAI enable
        PLLSAION OFFSET(28) NUMBITS(1) [],
        /// PLLI2S clock ready flag
        PLLI2SRDY OFFSET(27) NUMBITS(1) [],
        /// PLLI2S enable
        PLLI2SON OFFSET(26) NUMBITS(1) [],
        /// Main PLL (PLL) clock ready flag
        PLLRDY OFFSET(25) NUMBITS(1) [],
        /// Main PLL (PLL) enable
        PLLON OFFSET(24) NUMBITS(1) [],
        /// Clock security system enable
        CSSON OFFSET(19) NUMBITS(1) [],
        /// HSE clock bypass
        HSEBYP OFFSET(18) NUMBITS(1) [],
        /// HSE clock ready flag
        HSERDY OFFSET(17) NUMBITS(1) [],
        /// HSE clock enable
        HSEON OFFSET(16) NUMBITS(1) [],
        /// Internal high-speed clock calibration
        HSICAL OFFSET(8) NUMBITS(8) [],
        /// Internal high-speed clock trimming
        HSITRIM OFFSET(3) NUMBITS(5) [],
        /// Internal high-speed clock ready flag
        HSIRDY OFFSET(1) NUMBITS(1) [],
        /// Internal high-speed clock enable
        HSION OFFSET(0) NUMBITS(1) []
    ],
    pub CFGR [
        /// APB high-speed prescaler (APB2)
        PPRE2 OFFSET(13) NUMBITS(3) [],
        /// APB Low speed prescaler (APB1)
        PPRE1 OFFSET(10) NUMBITS(3) [],
        /// AHB prescaler
        HPRE OFFSET(4) NUMBITS(4) [],
        /// System clock switch status
        SWS OFFSET(2) NUMBITS(2) [
            HSI = 0b00,
            HSE = 0b01,
            PLLP = 0b10,
            PLLR = 0b11,
        ],
        /// System clock switch
        SW OFFSET(0) NUMBITS(2) [
            HSI = 0b00,
            HSE = 0b01,
            PLLP = 0b10,
            PLLR = 0b11,
        ]
    ]
];

/// The memory-mapped RCC block.
pub const RCC_BASE: StaticRef<RccRegisters> =
    unsafe { StaticRef::new(0x40023800 as *const RccRegisters) };

/// The registers reachable through a [RegisterBank].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RccRegister {
    CR,
    CFGR,
    AHB1ENR,
    AHB2ENR,
    AHB3ENR,
    APB1ENR,
    APB2ENR,
}

impl RccRegister {
    pub const ALL: [RccRegister; 7] = [
        RccRegister::CR,
        RccRegister::CFGR,
        RccRegister::AHB1ENR,
        RccRegister::AHB2ENR,
        RccRegister::AHB3ENR,
        RccRegister::APB1ENR,
        RccRegister::APB2ENR,
    ];

    /// Byte offset of the register from the start of the RCC block.
    pub const fn offset(self) -> usize {
        match self {
            RccRegister::CR => 0x00,
            RccRegister::CFGR => 0x08,
            RccRegister::AHB1ENR => 0x30,
            RccRegister::AHB2ENR => 0x34,
            RccRegister::AHB3ENR => 0x38,
            RccRegister::APB1ENR => 0x40,
            RccRegister::APB2ENR => 0x44,
        }
    }

    /// Value of the register after a system reset.
    pub const fn reset_value(self) -> u32 {
        match self {
            // HSION | HSIRDY | HSITRIM = 0x10
            RccRegister::CR => 0x0000_0083,
            // CCMDATARAMEN
            RccRegister::AHB1ENR => 0x0010_0000,
            _ => 0,
        }
    }
}

/// Word-level access to the RCC registers.
///
/// Every clock-control operation reads and writes whole 32-bit words through
/// this trait and does the field manipulation itself. Implement it to put
/// something other than the memory-mapped block behind an [Rcc], such as the
/// [crate::RccEmulator].
pub trait RegisterBank {
    fn read(&self, register: RccRegister) -> u32;
    fn write(&self, register: RccRegister, value: u32);
}

impl<B: RegisterBank + ?Sized> RegisterBank for &B {
    fn read(&self, register: RccRegister) -> u32 {
        (**self).read(register)
    }

    fn write(&self, register: RccRegister, value: u32) {
        (**self).write(register, value)
    }
}

impl RegisterBank for StaticRef<RccRegisters> {
    fn read(&self, register: RccRegister) -> u32 {
        match register {
            RccRegister::CR => self.cr.get(),
            RccRegister::CFGR => self.cfgr.get(),
            RccRegister::AHB1ENR => self.ahb1enr.get(),
            RccRegister::AHB2ENR => self.ahb2enr.get(),
            RccRegister::AHB3ENR => self.ahb3enr.get(),
            RccRegister::APB1ENR => self.apb1enr.get(),
            RccRegister::APB2ENR => self.apb2enr.get(),
        }
    }

    fn write(&self, register: RccRegister, value: u32) {
        match register {
            RccRegister::CR => self.cr.set(value),
            RccRegister::CFGR => self.cfgr.set(value),
            RccRegister::AHB1ENR => self.ahb1enr.set(value),
            RccRegister::AHB2ENR => self.ahb2enr.set(value),
            RccRegister::AHB3ENR => self.ahb3enr.set(value),
            RccRegister::APB1ENR => self.apb1enr.set(value),
            RccRegister::APB2ENR => self.apb2enr.set(value),
        }
    }
}

/// How long to wait for a clock source to report ready after enabling it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyWait {
    /// Poll until the ready flag is set, however long that takes.
    ///
    /// A source that never stabilizes blocks the caller forever.
    Unbounded,
    /// Give up after reading the control register this many times.
    Bounded(u32),
}

/// Runtime configuration of an [Rcc].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RccConfig {
    /// Policy for the ready-flag poll of [Rcc::set_clock_status].
    pub ready_wait: ReadyWait,
}

impl RccConfig {
    pub const DEFAULT: RccConfig = RccConfig {
        ready_wait: ReadyWait::Unbounded,
    };
}

impl Default for RccConfig {
    fn default() -> Self {
        RccConfig::DEFAULT
    }
}

/// Errors reported by the clock-control operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RccError {
    /// The clock source backing the requested system clock is not ready.
    /// No register was modified.
    NotReady(ClockSource),
    /// The clock source was enabled but did not report ready within the
    /// configured [ReadyWait::Bounded] limit. The enable bit stays set.
    Timeout(ClockSource),
}

impl fmt::Display for RccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RccError::NotReady(source) => write!(f, "clock source {source:?} is not ready"),
            RccError::Timeout(source) => {
                write!(f, "clock source {source:?} did not become ready in time")
            }
        }
    }
}

/// Handle to the reset and clock control block.
///
/// Both the peripheral clock gate ([crate::clocks::phclk]) and the clock
/// source controller ([crate::clocks::source]) are implemented on this type.
pub struct Rcc<B: RegisterBank> {
    bank: B,
    config: RccConfig,
}

impl<B: RegisterBank> Rcc<B> {
    /// Create a handle with the default configuration (unbounded waits).
    pub const fn new(bank: B) -> Self {
        Self::with_config(bank, RccConfig::DEFAULT)
    }

    pub const fn with_config(bank: B, config: RccConfig) -> Self {
        Self { bank, config }
    }

    pub fn config(&self) -> RccConfig {
        self.config
    }

    /// The register bank this handle operates on.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub(crate) fn read_register(&self, register: RccRegister) -> u32 {
        let value = self.bank.read(register);
        if CONFIG.trace_register_access {
            trace!("rcc: read {:?} -> {:#x}", register, value);
        }
        value
    }

    pub(crate) fn write_register(&self, register: RccRegister, value: u32) {
        if CONFIG.trace_register_access {
            trace!("rcc: write {:?} <- {:#x}", register, value);
        }
        self.bank.write(register, value);
    }

    pub(crate) fn cr(&self) -> LocalRegisterCopy<u32, CR::Register> {
        LocalRegisterCopy::new(self.read_register(RccRegister::CR))
    }

    pub(crate) fn modify_cr(&self, field: FieldValue<u32, CR::Register>) {
        let mut cr = self.cr();
        cr.modify(field);
        self.write_register(RccRegister::CR, cr.get());
    }

    pub(crate) fn cfgr(&self) -> LocalRegisterCopy<u32, CFGR::Register> {
        LocalRegisterCopy::new(self.read_register(RccRegister::CFGR))
    }

    pub(crate) fn modify_cfgr(&self, field: FieldValue<u32, CFGR::Register>) {
        let mut cfgr = self.cfgr();
        cfgr.modify(field);
        self.write_register(RccRegister::CFGR, cfgr.get());
    }
}
