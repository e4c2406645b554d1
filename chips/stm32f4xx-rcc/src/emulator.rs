// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! RAM-backed stand-in for the RCC register block.
//!
//! [RccEmulator] implements [RegisterBank] and reproduces the parts of the
//! hardware behaviour the clock-control core depends on:
//!
//! - registers start at their reset values, so the HSI clock is enabled,
//!   ready and selected as system clock,
//! - a ready flag is set a configurable number of `RCC_CR` reads after its
//!   enable bit, and is cleared as soon as the enable bit is cleared,
//! - ready flags, `HSICAL` and `RCC_CFGR.SWS` ignore writes,
//! - `RCC_CFGR.SWS` follows `RCC_CFGR.SW` when the selected source is ready.
//!
//! Faults can be injected by freezing register bits, or by keeping a clock
//! source from ever becoming ready.

use core::cell::Cell;

use tock_registers::LocalRegisterCopy;

use crate::clocks::source::{ClockSource, SysClockSource};
use crate::rcc::{RccRegister, RegisterBank, CFGR, CR};

const REGISTERS: usize = RccRegister::ALL.len();
const SOURCES: usize = ClockSource::ALL.len();

/// Number of `RCC_CR` reads a clock source needs to stabilize by default.
pub const DEFAULT_STABILIZATION_POLLS: u32 = 3;

pub struct RccEmulator {
    registers: [Cell<u32>; REGISTERS],
    frozen: [Cell<u32>; REGISTERS],
    writes: [Cell<usize>; REGISTERS],
    cr_reads: Cell<usize>,
    stabilization_polls: u32,
    /// Remaining reads before each stabilizing source reports ready.
    stabilizing: [Cell<Option<u32>>; SOURCES],
    never_ready: [Cell<bool>; SOURCES],
}

impl RccEmulator {
    pub fn new() -> Self {
        Self {
            registers: core::array::from_fn(|i| Cell::new(RccRegister::ALL[i].reset_value())),
            frozen: Default::default(),
            writes: Default::default(),
            cr_reads: Cell::new(0),
            stabilization_polls: DEFAULT_STABILIZATION_POLLS,
            stabilizing: Default::default(),
            never_ready: Default::default(),
        }
    }

    /// Set how many `RCC_CR` reads an enabled source takes to report ready.
    /// Zero makes the ready flag visible on the first read after enabling.
    pub fn with_stabilization_polls(mut self, polls: u32) -> Self {
        self.stabilization_polls = polls;
        self
    }

    /// Keep `source` from ever reporting ready once enabled.
    pub fn never_ready(&self, source: ClockSource) {
        self.never_ready[source as usize].set(true);
    }

    /// Make the bits of `mask` in `register` ignore every write.
    pub fn freeze_bits(&self, register: RccRegister, mask: u32) {
        let frozen = &self.frozen[register as usize];
        frozen.set(frozen.get() | mask);
    }

    /// Number of writes `register` has received.
    pub fn writes(&self, register: RccRegister) -> usize {
        self.writes[register as usize].get()
    }

    /// Number of times `RCC_CR` has been read.
    pub fn cr_reads(&self) -> usize {
        self.cr_reads.get()
    }

    fn raw(&self, register: RccRegister) -> u32 {
        self.registers[register as usize].get()
    }

    fn store(&self, register: RccRegister, value: u32) {
        self.registers[register as usize].set(value);
    }

    /// Advance every stabilizing source by one read of `RCC_CR`.
    fn tick(&self) {
        let mut cr = LocalRegisterCopy::<u32, CR::Register>::new(self.raw(RccRegister::CR));
        for source in ClockSource::ALL {
            let index = source as usize;
            match self.stabilizing[index].get() {
                Some(_) if self.never_ready[index].get() => {}
                Some(0) => {
                    cr.modify(source.fields().ready.val(1));
                    self.stabilizing[index].set(None);
                }
                Some(remaining) => self.stabilizing[index].set(Some(remaining - 1)),
                None => {}
            }
        }
        self.store(RccRegister::CR, cr.get());
    }

    fn write_cr(&self, requested: u32) {
        let old = LocalRegisterCopy::<u32, CR::Register>::new(self.raw(RccRegister::CR));
        let mut read_only = CR::HSICAL.mask << CR::HSICAL.shift;
        for source in ClockSource::ALL {
            let ready = source.fields().ready;
            read_only |= ready.mask << ready.shift;
        }

        let mut new = LocalRegisterCopy::<u32, CR::Register>::new(
            (old.get() & read_only) | (requested & !read_only),
        );
        for source in ClockSource::ALL {
            let fields = source.fields();
            let was_on = old.is_set(fields.enable);
            let is_on = new.is_set(fields.enable);
            if is_on && !was_on {
                self.stabilizing[source as usize].set(Some(self.stabilization_polls));
            } else if !is_on {
                self.stabilizing[source as usize].set(None);
                new.modify(fields.ready.val(0));
            }
        }
        self.store(RccRegister::CR, new.get());
    }

    fn write_cfgr(&self, requested: u32) {
        let old = LocalRegisterCopy::<u32, CFGR::Register>::new(self.raw(RccRegister::CFGR));
        let sws = CFGR::SWS.mask << CFGR::SWS.shift;
        let mut new =
            LocalRegisterCopy::<u32, CFGR::Register>::new((old.get() & sws) | (requested & !sws));

        let selected = SysClockSource::from_bits(new.read(CFGR::SW));
        let cr = LocalRegisterCopy::<u32, CR::Register>::new(self.raw(RccRegister::CR));
        if cr.is_set(selected.source().fields().ready) {
            new.modify(CFGR::SWS.val(u32::from(selected)));
        }
        self.store(RccRegister::CFGR, new.get());
    }
}

impl Default for RccEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for RccEmulator {
    fn read(&self, register: RccRegister) -> u32 {
        if register == RccRegister::CR {
            self.cr_reads.set(self.cr_reads.get() + 1);
            self.tick();
        }
        self.raw(register)
    }

    fn write(&self, register: RccRegister, value: u32) {
        let index = register as usize;
        self.writes[index].set(self.writes[index].get() + 1);

        let frozen = self.frozen[index].get();
        let value = (self.raw(register) & frozen) | (value & !frozen);
        match register {
            RccRegister::CR => self.write_cr(value),
            RccRegister::CFGR => self.write_cfgr(value),
            _ => self.store(register, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_reset_values() {
        let emulator = RccEmulator::new();
        for register in RccRegister::ALL {
            assert_eq!(emulator.read(register), register.reset_value());
        }
    }

    #[test]
    fn ready_follows_enable_after_polls() {
        let emulator = RccEmulator::new().with_stabilization_polls(2);
        let hserdy = 1 << 17;

        emulator.write(RccRegister::CR, emulator.read(RccRegister::CR) | (1 << 16));
        assert_eq!(emulator.read(RccRegister::CR) & hserdy, 0);
        assert_eq!(emulator.read(RccRegister::CR) & hserdy, 0);
        assert_eq!(emulator.read(RccRegister::CR) & hserdy, hserdy);
    }

    #[test]
    fn ready_flags_ignore_writes() {
        let emulator = RccEmulator::new();

        // Clearing HSIRDY directly has no effect, setting HSERDY neither.
        emulator.write(RccRegister::CR, (1 << 0) | (1 << 17));
        let cr = emulator.read(RccRegister::CR);
        assert_eq!(cr & (1 << 1), 1 << 1);
        assert_eq!(cr & (1 << 17), 0);
        // HSITRIM was written to zero, HSICAL kept.
        assert_eq!(cr & (0x1F << 3), 0);
    }

    #[test]
    fn disabling_drops_ready_immediately() {
        let emulator = RccEmulator::new().with_stabilization_polls(0);

        emulator.write(RccRegister::CR, 0x83 | (1 << 24));
        assert_ne!(emulator.read(RccRegister::CR) & (1 << 25), 0);
        emulator.write(RccRegister::CR, 0x83);
        assert_eq!(emulator.read(RccRegister::CR) & (1 << 25), 0);
    }

    #[test]
    fn never_ready_source_stays_stabilizing() {
        let emulator = RccEmulator::new().with_stabilization_polls(0);
        emulator.never_ready(ClockSource::PLLI2S);

        emulator.write(RccRegister::CR, 0x83 | (1 << 26));
        for _ in 0..50 {
            assert_eq!(emulator.read(RccRegister::CR) & (1 << 27), 0);
        }
    }

    #[test]
    fn sws_follows_sw_for_ready_sources_only() {
        let emulator = RccEmulator::new();

        emulator.write(RccRegister::CFGR, 0b01);
        assert_eq!(emulator.read(RccRegister::CFGR), 0b01);

        emulator.write(RccRegister::CFGR, 0b00);
        assert_eq!(emulator.read(RccRegister::CFGR), 0b00);
    }

    #[test]
    fn frozen_bits_keep_their_value() {
        let emulator = RccEmulator::new();
        emulator.freeze_bits(RccRegister::APB1ENR, 0xF);

        emulator.write(RccRegister::APB1ENR, 0xFF);
        assert_eq!(emulator.read(RccRegister::APB1ENR), 0xF0);
        assert_eq!(emulator.writes(RccRegister::APB1ENR), 1);
    }
}
