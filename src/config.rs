use crate::registers::CanCtrl;

/// Instance configuration of the controller model
#[derive(Copy, Clone, Debug)]
pub struct Configuration {
    /// Instance name, prefixed to every log line
    pub name: &'static str,

    /// CLKOUT configuration applied on every reset
    pub clock: ClockConfiguration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: "mcp25625",
            clock: ClockConfiguration::default(),
        }
    }
}

/// CLKOUT pin and one-shot configuration, CANCTRL bits <3:0>
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClockConfiguration {
    /// Prescaler of the CLKOUT pin
    pub prescaler: ClockOutputPrescaler,

    /// CLKOUT pin enabled
    pub enabled: bool,

    /// One-shot mode, messages are only sent once
    pub one_shot: bool,
}

impl Default for ClockConfiguration {
    /// Power-on value: CLKOUT enabled, system clock divided by 8
    fn default() -> Self {
        Self {
            prescaler: ClockOutputPrescaler::DivideBy8,
            enabled: true,
            one_shot: false,
        }
    }
}

impl ClockConfiguration {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        let canctrl = CanCtrl::from(register);

        Self {
            prescaler: ClockOutputPrescaler::from_register(register),
            enabled: canctrl.clken(),
            one_shot: canctrl.osm(),
        }
    }

    /// Encodes the configuration to CANCTRL low bits
    pub(crate) fn as_register(&self) -> u8 {
        CanCtrl::new()
            .with_clkpre(self.prescaler as u8)
            .with_clken(self.enabled)
            .with_osm(self.one_shot)
            .into()
    }
}

/// Divisor of the CLKOUT pin
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockOutputPrescaler {
    DivideBy8 = 0b11,
    DivideBy4 = 0b10,
    DivideBy2 = 0b01,
    DivideBy1 = 0b00,
}

impl ClockOutputPrescaler {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        match register & 0b11 {
            0b11 => Self::DivideBy8,
            0b10 => Self::DivideBy4,
            0b01 => Self::DivideBy2,
            _ => Self::DivideBy1,
        }
    }
}
