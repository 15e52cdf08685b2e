//!# Controller model
//!
//!```
//!# use mcp25625::chip::MCP25625;
//!# use mcp25625::example::{ExampleBus, ExampleLines};
//!# use mcp25625::status::OperationMode;
//! let mut controller = MCP25625::new(ExampleBus::default(), ExampleLines::default());
//!
//! // Controller comes up in configuration mode
//! assert_eq!(OperationMode::Configuration, controller.operation_mode());
//!
//! // Request normal mode (WRITE CANCTRL)
//! controller.select();
//! for byte in [0x02, 0x0F, 0x07] {
//!     controller.transfer_byte(byte);
//! }
//! controller.deselect();
//!
//! assert_eq!(OperationMode::Normal, controller.operation_mode());
//! ```
use crate::config::{ClockConfiguration, Configuration};
use crate::frame::CanFrame;
use crate::irq::Lines;
use crate::registers::RegisterFile;
use crate::spi::SpiSession;
use crate::status::OperationMode;

/// Outbound side of the CAN bus the controller is attached to
pub trait CanBus {
    /// Hands a transmitted frame to the bus
    fn send(&mut self, frame: &CanFrame);
}

/// Controller not attached to any bus, transmitted frames are dropped
impl CanBus for () {
    fn send(&mut self, _frame: &CanFrame) {}
}

/// MCP25625 CAN controller model
///
/// The model is single threaded: SPI transfers and inbound frames must be serialized by the host.
pub struct MCP25625<B: CanBus, L: Lines> {
    pub(crate) config: Configuration,

    pub(crate) registers: RegisterFile,

    /// State of the current SPI transaction
    pub(crate) spi: SpiSession,

    /// Effective interrupts of the last recompute, None forces a full recompute
    pub(crate) last_irq: Option<u8>,

    pub(crate) bus: B,

    /// IRQ and RXnBF outputs
    pub(crate) lines: L,
}

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Creates a controller in power-on state with default configuration
    pub fn new(bus: B, lines: L) -> Self {
        Self::with_configuration(Configuration::default(), bus, lines)
    }

    pub fn with_configuration(config: Configuration, bus: B, lines: L) -> Self {
        let mut controller = Self {
            config,
            registers: RegisterFile::default(),
            spi: SpiSession::default(),
            last_irq: None,
            bus,
            lines,
        };

        controller.full_reset();
        controller
    }

    /// Device reset, identical to the RESET instruction
    pub fn reset(&mut self) {
        self.full_reset();
    }

    /// Current register state
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Active operation mode (CANSTAT.OPMOD)
    pub fn operation_mode(&self) -> OperationMode {
        OperationMode::from_register(self.registers.canstat).unwrap_or(OperationMode::Configuration)
    }

    /// Requested operation mode (CANCTRL.REQOP)
    pub fn requested_mode(&self) -> OperationMode {
        OperationMode::from_register(self.registers.canctrl).unwrap_or(OperationMode::Configuration)
    }

    /// Current CLKOUT configuration of CANCTRL
    pub fn clock_configuration(&self) -> ClockConfiguration {
        ClockConfiguration::from_register(self.registers.canctrl)
    }

    /// Pending interrupt flags (CANINTF)
    pub fn interrupt_flags(&self) -> u8 {
        self.registers.canintf
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    pub fn release(self) -> (B, L) {
        (self.bus, self.lines)
    }

    pub(crate) fn in_mode(&self, mode: OperationMode) -> bool {
        self.registers.canstat().opmod() == mode.bits()
    }
}
