//!# Interrupt aggregation
//! The controller drives one level IRQ output, active while any enabled interrupt flag is
//! pending, and two active-low RXnBF outputs which can either report the buffer full state
//! or act as general purpose outputs (BFPCTRL).
use crate::chip::{CanBus, MCP25625};
use crate::registers::{irq_rx, BfpCtrl, IRQ_ERR, IRQ_MERR, IRQ_RX0, IRQ_RX1, IRQ_TX0, IRQ_TX1, IRQ_TX2, IRQ_WAKE};
use crate::status::OperationMode;
use core::fmt::Debug;
use embedded_hal::digital::v2::OutputPin;
use log::{debug, trace, warn};

/// Output lines driven by the controller
pub trait Lines {
    /// Sets the IRQ line level, true while an enabled interrupt is pending
    fn set_irq(&mut self, level: bool);

    /// Sets the logical level of the RXnBF pin of the given buffer
    fn set_rx_buffer_full(&mut self, buffer: usize, level: bool);
}

/// Unconnected output lines
impl Lines for () {
    fn set_irq(&mut self, _level: bool) {}

    fn set_rx_buffer_full(&mut self, _buffer: usize, _level: bool) {}
}

/// Drives the output lines using [OutputPin] implementations
pub struct PinLines<IRQ: OutputPin, RXB0: OutputPin, RXB1: OutputPin> {
    pub irq: IRQ,
    pub rx0bf: RXB0,
    pub rx1bf: RXB1,
}

impl<IRQ: OutputPin, RXB0: OutputPin, RXB1: OutputPin> PinLines<IRQ, RXB0, RXB1> {
    pub fn new(irq: IRQ, rx0bf: RXB0, rx1bf: RXB1) -> Self {
        Self { irq, rx0bf, rx1bf }
    }
}

impl<IRQ, RXB0, RXB1> Lines for PinLines<IRQ, RXB0, RXB1>
where
    IRQ: OutputPin,
    RXB0: OutputPin,
    RXB1: OutputPin,
    IRQ::Error: Debug,
    RXB0::Error: Debug,
    RXB1::Error: Debug,
{
    fn set_irq(&mut self, level: bool) {
        if let Err(error) = drive(&mut self.irq, level) {
            warn!("Failed to drive IRQ pin: {error:?}");
        }
    }

    fn set_rx_buffer_full(&mut self, buffer: usize, level: bool) {
        if buffer == 0 {
            if let Err(error) = drive(&mut self.rx0bf, level) {
                warn!("Failed to drive RX0BF pin: {error:?}");
            }
        } else if let Err(error) = drive(&mut self.rx1bf, level) {
            warn!("Failed to drive RX1BF pin: {error:?}");
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: bool) -> Result<(), P::Error> {
    if level {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

/// Returns the CANSTAT.ICOD value of the highest priority pending interrupt
pub fn interrupt_code(effective: u8) -> u8 {
    if effective & (IRQ_MERR | IRQ_ERR) != 0 {
        0b001
    } else if effective & IRQ_WAKE != 0 {
        0b010
    } else if effective & IRQ_TX0 != 0 {
        0b011
    } else if effective & IRQ_TX1 != 0 {
        0b100
    } else if effective & IRQ_TX2 != 0 {
        0b101
    } else if effective & IRQ_RX0 != 0 {
        0b110
    } else if effective & IRQ_RX1 != 0 {
        0b111
    } else {
        0b000
    }
}

/// Logical level of the RXnBF pin of the given buffer
pub fn rx_buffer_full_level(bfpctrl: &BfpCtrl, canintf: u8, buffer: usize) -> bool {
    debug_assert!(buffer < 2, "invalid RX buffer {buffer}");

    let (enabled, full_mode, state) = if buffer == 0 {
        (bfpctrl.b0bfe(), bfpctrl.b0bfm(), bfpctrl.b0bfs())
    } else {
        (bfpctrl.b1bfe(), bfpctrl.b1bfm(), bfpctrl.b1bfs())
    };

    if !enabled {
        return true;
    }

    if full_mode {
        canintf & irq_rx(buffer) == 0
    } else {
        state
    }
}

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Level of the IRQ output
    pub fn irq_level(&self) -> bool {
        self.registers.canintf & self.registers.caninte != 0
    }

    /// Logical level of the RXnBF output of the given buffer
    pub fn rx_buffer_full_level(&self, buffer: usize) -> bool {
        rx_buffer_full_level(&self.registers.bfpctrl(), self.registers.canintf, buffer)
    }

    /// Sets the given interrupt flags and updates ICOD and the output lines
    pub(crate) fn raise(&mut self, flags: u8) {
        trace!("{}: raise interrupt flags {flags:#04x}", self.config.name);
        self.registers.canintf |= flags;
        let effective = self.registers.canintf & self.registers.caninte;

        if self.last_irq != Some(effective) {
            debug!(
                "{}: effective interrupts {:?} -> {effective:#04x}",
                self.config.name, self.last_irq
            );
            self.last_irq = Some(effective);

            self.registers.canstat = self.registers.canstat().with_icod(interrupt_code(effective)).into();

            if effective & IRQ_WAKE != 0 && self.in_mode(OperationMode::Sleep) {
                self.recompute_mode(true);
            }
        }

        self.update_rx_buffer_full_lines();
        self.lines.set_irq(self.irq_level());
    }

    pub(crate) fn update_rx_buffer_full_lines(&mut self) {
        for buffer in 0..2 {
            let level = self.rx_buffer_full_level(buffer);
            self.lines.set_rx_buffer_full(buffer, level);
        }
    }

    /// Clears the RX full flag of the given buffer
    pub(crate) fn clear_rx_flag(&mut self, buffer: usize) {
        debug!("{}: clear RX buffer {buffer}", self.config.name);
        self.registers.canintf &= !irq_rx(buffer);
        self.raise(0);
    }
}
