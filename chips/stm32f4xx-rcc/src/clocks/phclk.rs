// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral clock gating.
//!
//! Every peripheral is identified by the bus it hangs off and the position of
//! its enable bit in that bus's `RCC_xxxENR` register. The per-bus enums below
//! carry the bit position as their discriminant.

use tock_registers::fields::Field;
use tock_registers::LocalRegisterCopy;

use crate::rcc::{Rcc, RccRegister, RegisterBank};
use crate::ClockInterface;

/// Buses with their own peripheral clock enable register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bus {
    AHB1,
    AHB2,
    AHB3,
    APB1,
    APB2,
}

impl Bus {
    pub const ALL: [Bus; 5] = [Bus::AHB1, Bus::AHB2, Bus::AHB3, Bus::APB1, Bus::APB2];

    /// The enable register of this bus.
    pub const fn register(self) -> RccRegister {
        match self {
            Bus::AHB1 => RccRegister::AHB1ENR,
            Bus::AHB2 => RccRegister::AHB2ENR,
            Bus::AHB3 => RccRegister::AHB3ENR,
            Bus::APB1 => RccRegister::APB1ENR,
            Bus::APB2 => RccRegister::APB2ENR,
        }
    }
}

/// Peripherals clocked by HCLK1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HCLK1 {
    GPIOA = 0,
    GPIOB = 1,
    GPIOC = 2,
    GPIOD = 3,
    GPIOE = 4,
    GPIOF = 5,
    GPIOG = 6,
    GPIOH = 7,
    CRC = 12,
    BKPSRAM = 18,
    DMA1 = 21,
    DMA2 = 22,
    OTGHS = 29,
    OTGHSULPI = 30,
}

/// Peripherals clocked by HCLK2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HCLK2 {
    DCMI = 0,
    RNG = 6,
    OTGFS = 7,
}

/// Peripherals clocked by HCLK3
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HCLK3 {
    FMC = 0,
    QSPI = 1,
}

/// Peripherals clocked by PCLK1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PCLK1 {
    TIM2 = 0,
    TIM3 = 1,
    TIM4 = 2,
    TIM5 = 3,
    TIM6 = 4,
    TIM7 = 5,
    TIM12 = 6,
    TIM13 = 7,
    TIM14 = 8,
    WWDG = 11,
    SPI2 = 14,
    SPI3 = 15,
    SPDIFRX = 16,
    USART2 = 17,
    USART3 = 18,
    UART4 = 19,
    UART5 = 20,
    I2C1 = 21,
    I2C2 = 22,
    I2C3 = 23,
    FMPI2C1 = 24,
    CAN1 = 25,
    CAN2 = 26,
    CEC = 27,
    PWR = 28,
    DAC = 29,
}

/// Peripherals clocked by PCLK2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PCLK2 {
    TIM1 = 0,
    TIM8 = 1,
    USART1 = 4,
    USART6 = 5,
    ADC1 = 8,
    ADC2 = 9,
    ADC3 = 10,
    SDIO = 11,
    SPI1 = 12,
    SPI4 = 13,
    SYSCFG = 14,
    TIM9 = 16,
    TIM10 = 17,
    TIM11 = 18,
    SAI1 = 22,
    SAI2 = 23,
}

/// Bus + Clock name for the peripherals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralClockType {
    AHB1(HCLK1),
    AHB2(HCLK2),
    AHB3(HCLK3),
    APB1(PCLK1),
    APB2(PCLK2),
}

impl PeripheralClockType {
    pub const fn bus(self) -> Bus {
        match self {
            PeripheralClockType::AHB1(_) => Bus::AHB1,
            PeripheralClockType::AHB2(_) => Bus::AHB2,
            PeripheralClockType::AHB3(_) => Bus::AHB3,
            PeripheralClockType::APB1(_) => Bus::APB1,
            PeripheralClockType::APB2(_) => Bus::APB2,
        }
    }

    /// Position of the enable bit in the bus's enable register.
    pub const fn bit(self) -> u32 {
        match self {
            PeripheralClockType::AHB1(p) => p as u32,
            PeripheralClockType::AHB2(p) => p as u32,
            PeripheralClockType::AHB3(p) => p as u32,
            PeripheralClockType::APB1(p) => p as u32,
            PeripheralClockType::APB2(p) => p as u32,
        }
    }

    const fn field(self) -> Field<u32, ()> {
        Field::new(1, self.bit() as usize)
    }
}

impl From<HCLK1> for PeripheralClockType {
    fn from(p: HCLK1) -> Self {
        PeripheralClockType::AHB1(p)
    }
}

impl From<HCLK2> for PeripheralClockType {
    fn from(p: HCLK2) -> Self {
        PeripheralClockType::AHB2(p)
    }
}

impl From<HCLK3> for PeripheralClockType {
    fn from(p: HCLK3) -> Self {
        PeripheralClockType::AHB3(p)
    }
}

impl From<PCLK1> for PeripheralClockType {
    fn from(p: PCLK1) -> Self {
        PeripheralClockType::APB1(p)
    }
}

impl From<PCLK2> for PeripheralClockType {
    fn from(p: PCLK2) -> Self {
        PeripheralClockType::APB2(p)
    }
}

impl<B: RegisterBank> Rcc<B> {
    fn enable_register(&self, clock: PeripheralClockType) -> LocalRegisterCopy<u32> {
        LocalRegisterCopy::new(self.read_register(clock.bus().register()))
    }

    fn gate_peripheral_clock(&self, clock: PeripheralClockType, enabled: bool) {
        let mut enr = self.enable_register(clock);
        enr.modify(clock.field().val(u32::from(enabled)));
        self.write_register(clock.bus().register(), enr.get());
    }

    /// Start the clock of a peripheral.
    ///
    /// # Returns
    ///
    /// + [true]: the enable bit reads back set
    /// + [false]: the write did not take effect, which points to a hardware
    ///   fault
    pub fn enable_peripheral_clock(&self, clock: impl Into<PeripheralClockType>) -> bool {
        let clock = clock.into();
        self.gate_peripheral_clock(clock, true);
        let enabled = self.is_enabled_peripheral_clock(clock);
        if !enabled {
            warn!("rcc: {:?} clock enable did not stick", clock);
        }
        enabled
    }

    /// Stop the clock of a peripheral.
    ///
    /// # Returns
    ///
    /// + [true]: the enable bit reads back cleared
    /// + [false]: the write did not take effect
    pub fn disable_peripheral_clock(&self, clock: impl Into<PeripheralClockType>) -> bool {
        let clock = clock.into();
        self.gate_peripheral_clock(clock, false);
        let disabled = !self.is_enabled_peripheral_clock(clock);
        if !disabled {
            warn!("rcc: {:?} clock disable did not stick", clock);
        }
        disabled
    }

    pub fn is_enabled_peripheral_clock(&self, clock: impl Into<PeripheralClockType>) -> bool {
        let clock = clock.into();
        self.enable_register(clock).is_set(clock.field())
    }
}

/// The clock of one peripheral, as handed to that peripheral's driver.
pub struct PeripheralClock<'a, B: RegisterBank> {
    pub clock: PeripheralClockType,
    rcc: &'a Rcc<B>,
}

impl<'a, B: RegisterBank> PeripheralClock<'a, B> {
    pub const fn new(clock: PeripheralClockType, rcc: &'a Rcc<B>) -> Self {
        Self { clock, rcc }
    }
}

impl<B: RegisterBank> ClockInterface for PeripheralClock<'_, B> {
    fn is_enabled(&self) -> bool {
        self.rcc.is_enabled_peripheral_clock(self.clock)
    }

    fn enable(&self) -> bool {
        self.rcc.enable_peripheral_clock(self.clock)
    }

    fn disable(&self) -> bool {
        self.rcc.disable_peripheral_clock(self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::RccEmulator;

    #[test]
    fn peripherals_map_to_their_bus() {
        assert_eq!(PeripheralClockType::from(HCLK1::DMA2).bus(), Bus::AHB1);
        assert_eq!(PeripheralClockType::from(HCLK2::OTGFS).bus(), Bus::AHB2);
        assert_eq!(PeripheralClockType::from(HCLK3::QSPI).bus(), Bus::AHB3);
        assert_eq!(PeripheralClockType::from(PCLK1::I2C1).bus(), Bus::APB1);
        assert_eq!(PeripheralClockType::from(PCLK2::SYSCFG).bus(), Bus::APB2);

        assert_eq!(PeripheralClockType::from(HCLK1::DMA2).bit(), 22);
        assert_eq!(PeripheralClockType::from(PCLK1::I2C1).bit(), 21);
        assert_eq!(PeripheralClockType::from(PCLK2::SYSCFG).bit(), 14);
    }

    #[test]
    fn enable_sets_only_the_peripheral_bit() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);
        let before = emulator.read(RccRegister::APB1ENR);

        assert!(rcc.enable_peripheral_clock(PCLK1::USART2));
        assert_eq!(emulator.read(RccRegister::APB1ENR), before | (1 << 17));
        assert!(rcc.disable_peripheral_clock(PCLK1::USART2));
        assert_eq!(emulator.read(RccRegister::APB1ENR), before);
    }

    #[test]
    fn reset_value_bits_survive() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);

        assert!(rcc.enable_peripheral_clock(HCLK1::GPIOA));
        assert!(rcc.disable_peripheral_clock(HCLK1::GPIOA));
        assert_eq!(
            emulator.read(RccRegister::AHB1ENR),
            RccRegister::AHB1ENR.reset_value()
        );
    }

    #[test]
    fn gating_is_idempotent() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);

        assert!(rcc.enable_peripheral_clock(HCLK3::FMC));
        assert!(rcc.enable_peripheral_clock(HCLK3::FMC));
        assert!(rcc.is_enabled_peripheral_clock(HCLK3::FMC));
        assert!(rcc.disable_peripheral_clock(HCLK3::FMC));
        assert!(rcc.disable_peripheral_clock(HCLK3::FMC));
        assert!(!rcc.is_enabled_peripheral_clock(HCLK3::FMC));
    }

    #[test]
    fn stuck_bit_is_reported() {
        let emulator = RccEmulator::new();
        emulator.freeze_bits(RccRegister::APB2ENR, 1 << 4);
        let rcc = Rcc::new(&emulator);

        assert!(!rcc.enable_peripheral_clock(PCLK2::USART1));
        assert!(rcc.enable_peripheral_clock(PCLK2::USART6));
    }

    #[test]
    fn peripheral_clock_handle() {
        let emulator = RccEmulator::new();
        let rcc = Rcc::new(&emulator);
        let clock = PeripheralClock::new(PeripheralClockType::AHB2(HCLK2::RNG), &rcc);

        assert!(!clock.is_enabled());
        assert!(clock.enable());
        assert!(clock.is_enabled());
        assert_eq!(emulator.read(RccRegister::AHB2ENR), 1 << 6);
        assert!(clock.disable());
        assert!(!clock.is_enabled());
    }
}
