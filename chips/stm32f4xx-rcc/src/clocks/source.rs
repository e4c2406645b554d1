// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock source control: oscillators, PLLs and the system clock switch.
//!
//! # Usage
//!
//! ## Start the HSE clock, driven by an external signal
//!
//! ```rust,ignore
//! rcc.set_hse_bypass(true);
//! rcc.set_clock_status(ClockSource::HSE, ClockStatus::ON);
//! ```
//!
//! ## Switch the system clock to it
//!
//! ```rust,ignore
//! match rcc.set_sys_clock_source(SysClockSource::HSE) {
//!     Ok(active) => { /* `active` was read back from RCC_CFGR.SWS */ }
//!     Err(RccError::NotReady(source)) => { /* nothing was written */ }
//!     Err(_) => {}
//! }
//! ```
//!
//! # Clock source states
//!
//! ```text
//! OFF --(enable bit set)--> STABILIZING --(ready flag set)--> READY
//!  ^                                                            |
//!  +------------------------(enable bit cleared)----------------+
//! ```
//!
//! STABILIZING is only seen by the poll inside [Rcc::set_clock_status]. From
//! the outside a source is either ready or not, see [Rcc::get_clock_status].
//! The system clock switch is a separate state that can only move to a
//! selector whose source is READY.

use tock_registers::fields::Field;

use crate::rcc::{Rcc, RccError, ReadyWait, RegisterBank, CFGR, CR};

/// Clock generators controlled through `RCC_CR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 16MHz internal RC oscillator. Enabled and ready out of reset.
    HSI,
    /// External crystal or clock signal.
    HSE,
    /// Main PLL
    PLL,
    /// PLL dedicated to the I2S clock
    PLLI2S,
    /// PLL dedicated to the SAI clock
    PLLSAI,
}

/// The pair of `RCC_CR` fields owned by a [ClockSource].
///
/// The ready flag of every source sits one bit above its enable bit on this
/// chip, but that is a property of the register layout, so it is spelled out
/// here rather than computed.
#[derive(Clone, Copy)]
pub struct OscillatorFields {
    /// Written by software to turn the source on or off.
    pub enable: Field<u32, CR::Register>,
    /// Set by hardware once the source is stable.
    pub ready: Field<u32, CR::Register>,
}

impl ClockSource {
    pub const ALL: [ClockSource; 5] = [
        ClockSource::HSI,
        ClockSource::HSE,
        ClockSource::PLL,
        ClockSource::PLLI2S,
        ClockSource::PLLSAI,
    ];

    pub const fn fields(self) -> OscillatorFields {
        match self {
            ClockSource::HSI => OscillatorFields {
                enable: CR::HSION,
                ready: CR::HSIRDY,
            },
            ClockSource::HSE => OscillatorFields {
                enable: CR::HSEON,
                ready: CR::HSERDY,
            },
            ClockSource::PLL => OscillatorFields {
                enable: CR::PLLON,
                ready: CR::PLLRDY,
            },
            ClockSource::PLLI2S => OscillatorFields {
                enable: CR::PLLI2SON,
                ready: CR::PLLI2SRDY,
            },
            ClockSource::PLLSAI => OscillatorFields {
                enable: CR::PLLSAION,
                ready: CR::PLLSAIRDY,
            },
        }
    }
}

/// Requested power state of a [ClockSource].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockStatus {
    ON,
    OFF,
}

/// Values of the 2-bit system clock switch (`RCC_CFGR.SW` / `RCC_CFGR.SWS`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysClockSource {
    HSI = 0b00,
    HSE = 0b01,
    /// PLL_P output of the main PLL
    PLLP = 0b10,
    /// PLL_R output of the main PLL
    PLLR = 0b11,
}

impl SysClockSource {
    pub const ALL: [SysClockSource; 4] = [
        SysClockSource::HSI,
        SysClockSource::HSE,
        SysClockSource::PLLP,
        SysClockSource::PLLR,
    ];

    /// The clock source that must be ready before this selector is used.
    pub const fn source(self) -> ClockSource {
        match self {
            SysClockSource::HSI => ClockSource::HSI,
            SysClockSource::HSE => ClockSource::HSE,
            SysClockSource::PLLP | SysClockSource::PLLR => ClockSource::PLL,
        }
    }

    /// Decode a 2-bit field value. Only the two low bits are considered.
    pub const fn from_bits(bits: u32) -> SysClockSource {
        match bits & 0b11 {
            0b00 => SysClockSource::HSI,
            0b01 => SysClockSource::HSE,
            0b10 => SysClockSource::PLLP,
            _ => SysClockSource::PLLR,
        }
    }
}

impl From<SysClockSource> for u32 {
    fn from(item: SysClockSource) -> u32 {
        item as u32
    }
}

impl<B: RegisterBank> Rcc<B> {
    /// Select whether the HSE input is driven by an external clock signal
    /// (bypass) or by a crystal.
    ///
    /// Only change this while the HSE clock is off.
    ///
    /// # Returns
    ///
    /// + [true]: `RCC_CR.HSEBYP` reads back in the requested state
    /// + [false]: the write did not take effect
    pub fn set_hse_bypass(&self, enabled: bool) -> bool {
        if enabled {
            self.modify_cr(CR::HSEBYP::SET);
            self.cr().is_set(CR::HSEBYP)
        } else {
            self.modify_cr(CR::HSEBYP::CLEAR);
            !self.cr().is_set(CR::HSEBYP)
        }
    }

    pub fn is_hse_bypassed(&self) -> bool {
        self.cr().is_set(CR::HSEBYP)
    }

    /// Turn a clock source on or off.
    ///
    /// Turning a source on blocks until its ready flag is set. With the
    /// default [ReadyWait::Unbounded] policy this **may block indefinitely**
    /// if the source never stabilizes. Turning a source off returns
    /// immediately.
    ///
    /// # Returns
    ///
    /// [true], unless the [Rcc] was configured with [ReadyWait::Bounded] and
    /// the source did not become ready in time. Use
    /// [Rcc::try_set_clock_status] to tell the two apart from other errors.
    pub fn set_clock_status(&self, source: ClockSource, status: ClockStatus) -> bool {
        self.try_set_clock_status(source, status).is_ok()
    }

    /// Same as [Rcc::set_clock_status], reporting why it failed.
    ///
    /// # Errors
    ///
    /// + [Err]\([RccError::Timeout]\): the source was enabled but its ready
    ///   flag was not observed within the bounded wait. The enable bit is left
    ///   set, call [Rcc::get_clock_status] later to check on it.
    pub fn try_set_clock_status(
        &self,
        source: ClockSource,
        status: ClockStatus,
    ) -> Result<(), RccError> {
        let fields = source.fields();
        match status {
            ClockStatus::ON => {
                self.modify_cr(fields.enable.val(1));
                self.wait_until_ready(source)
            }
            ClockStatus::OFF => {
                self.modify_cr(fields.enable.val(0));
                Ok(())
            }
        }
    }

    fn wait_until_ready(&self, source: ClockSource) -> Result<(), RccError> {
        match self.config().ready_wait {
            ReadyWait::Unbounded => {
                while !self.get_clock_status(source) {}
                trace!("rcc: {:?} ready", source);
                Ok(())
            }
            ReadyWait::Bounded(attempts) => {
                for _ in 0..attempts {
                    if self.get_clock_status(source) {
                        trace!("rcc: {:?} ready", source);
                        return Ok(());
                    }
                }
                warn!("rcc: {:?} not ready after {} polls", source, attempts);
                Err(RccError::Timeout(source))
            }
        }
    }

    /// Whether the ready flag of `source` is set.
    pub fn get_clock_status(&self, source: ClockSource) -> bool {
        self.cr().is_set(source.fields().ready)
    }

    /// Whether the enable bit of `source` is set. A source can be enabled
    /// without being ready yet.
    pub fn is_enabled_clock(&self, source: ClockSource) -> bool {
        self.cr().is_set(source.fields().enable)
    }

    /// Switch the system clock to `target`.
    ///
    /// The source behind `target` must already be ready. `RCC_CFGR.SW` is
    /// updated with a single read-modify-write of the register.
    ///
    /// # Returns
    ///
    /// The selector reported active by `RCC_CFGR.SWS` after the write.
    ///
    /// # Errors
    ///
    /// + [Err]\([RccError::NotReady]\): the source behind `target` is not
    ///   ready. No register was written.
    pub fn set_sys_clock_source(&self, target: SysClockSource) -> Result<SysClockSource, RccError> {
        let source = target.source();
        if !self.get_clock_status(source) {
            debug!("rcc: cannot switch to {:?}, {:?} not ready", target, source);
            return Err(RccError::NotReady(source));
        }

        self.modify_cfgr(CFGR::SW.val(target.into()));

        let active = self.get_sys_clock_source();
        debug!("rcc: system clock is {:?}", active);
        Ok(active)
    }

    /// The system clock source currently in use, from `RCC_CFGR.SWS`.
    pub fn get_sys_clock_source(&self) -> SysClockSource {
        SysClockSource::from_bits(self.cfgr().read(CFGR::SWS))
    }

    /// The system clock source last requested, from `RCC_CFGR.SW`. It may
    /// differ from [Rcc::get_sys_clock_source] while a switch is in flight.
    pub fn get_requested_sys_clock_source(&self) -> SysClockSource {
        SysClockSource::from_bits(self.cfgr().read(CFGR::SW))
    }

    /// Whether `source` feeds the active system clock.
    pub fn is_system_clock(&self, source: ClockSource) -> bool {
        self.get_sys_clock_source().source() == source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::RccEmulator;
    use crate::rcc::{RccConfig, RccRegister};

    #[test]
    fn ready_flag_sits_above_enable_bit() {
        for source in ClockSource::ALL {
            let fields = source.fields();
            assert_eq!(fields.ready.shift, fields.enable.shift + 1);
            assert_eq!(fields.enable.mask, 1);
            assert_eq!(fields.ready.mask, 1);
        }
    }

    #[test]
    fn selector_sources() {
        assert_eq!(SysClockSource::HSI.source(), ClockSource::HSI);
        assert_eq!(SysClockSource::HSE.source(), ClockSource::HSE);
        assert_eq!(SysClockSource::PLLP.source(), ClockSource::PLL);
        assert_eq!(SysClockSource::PLLR.source(), ClockSource::PLL);
    }

    #[test]
    fn selector_bits_decode() {
        for selector in SysClockSource::ALL {
            assert_eq!(SysClockSource::from_bits(selector.into()), selector);
        }
        assert_eq!(SysClockSource::from_bits(0b110), SysClockSource::PLLP);
    }

    #[test]
    fn hsi_ready_out_of_reset() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);

        assert!(rcc.get_clock_status(ClockSource::HSI));
        assert!(rcc.is_enabled_clock(ClockSource::HSI));
        assert!(!rcc.get_clock_status(ClockSource::HSE));
        assert!(!rcc.get_clock_status(ClockSource::PLL));
        assert_eq!(rcc.get_sys_clock_source(), SysClockSource::HSI);
        assert!(rcc.is_system_clock(ClockSource::HSI));
    }

    #[test]
    fn enabling_polls_until_ready() {
        let emulator = RccEmulator::new().with_stabilization_polls(5);
        let rcc = Rcc::new(&emulator);

        assert!(rcc.set_clock_status(ClockSource::HSE, ClockStatus::ON));
        assert!(rcc.get_clock_status(ClockSource::HSE));
        assert!(emulator.cr_reads() >= 5);
    }

    #[test]
    fn disabling_clears_ready_flag() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);

        assert!(rcc.set_clock_status(ClockSource::PLL, ClockStatus::ON));
        assert!(rcc.set_clock_status(ClockSource::PLL, ClockStatus::OFF));
        assert!(!rcc.get_clock_status(ClockSource::PLL));
        assert!(!rcc.is_enabled_clock(ClockSource::PLL));
    }

    #[test]
    fn bounded_wait_times_out() {
        let emulator = RccEmulator::new();
        emulator.never_ready(ClockSource::HSE);
        let rcc = Rcc::with_config(
            &emulator,
            RccConfig {
                ready_wait: ReadyWait::Bounded(100),
            },
        );

        assert_eq!(
            rcc.try_set_clock_status(ClockSource::HSE, ClockStatus::ON),
            Err(RccError::Timeout(ClockSource::HSE))
        );
        assert!(rcc.is_enabled_clock(ClockSource::HSE));
        assert!(!rcc.set_clock_status(ClockSource::HSE, ClockStatus::ON));
    }

    #[test]
    fn switch_rejected_without_touching_cfgr() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);
        let writes = emulator.writes(RccRegister::CFGR);

        assert_eq!(
            rcc.set_sys_clock_source(SysClockSource::PLLR),
            Err(RccError::NotReady(ClockSource::PLL))
        );
        assert_eq!(emulator.writes(RccRegister::CFGR), writes);
        assert_eq!(rcc.get_requested_sys_clock_source(), SysClockSource::HSI);
    }

    #[test]
    fn switch_keeps_other_cfgr_fields() {
        let emulator = RccEmulator::new();
        emulator.write(RccRegister::CFGR, 0b101 << 10);
        let rcc = Rcc::new(&emulator);

        assert!(rcc.set_clock_status(ClockSource::HSE, ClockStatus::ON));
        assert_eq!(rcc.set_sys_clock_source(SysClockSource::HSE), Ok(SysClockSource::HSE));
        assert_eq!(rcc.cfgr().read(CFGR::PPRE1), 0b101);
    }

    #[test]
    fn bypass_toggles() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);

        assert!(rcc.set_hse_bypass(true));
        assert!(rcc.is_hse_bypassed());
        assert!(rcc.get_clock_status(ClockSource::HSI));
        assert!(rcc.set_hse_bypass(false));
        assert!(!rcc.is_hse_bypassed());
    }

    #[test]
    fn bypass_reports_stuck_bit() {
        let emulator = RccEmulator::new();
        emulator.freeze_bits(RccRegister::CR, 1 << 18);
        let rcc = Rcc::new(&emulator);

        assert!(!rcc.set_hse_bypass(true));
        assert!(rcc.set_hse_bypass(false));
    }
}
