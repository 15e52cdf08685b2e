//! # Dummy collaborators for doc examples
//!
//! Simple bus and output line implementations recording what the controller does.
use crate::chip::CanBus;
use crate::frame::CanFrame;
use crate::irq::Lines;
use alloc::vec::Vec;

/// Bus collecting all transmitted frames
#[derive(Default, Debug)]
pub struct ExampleBus {
    pub sent: Vec<CanFrame>,
}

impl CanBus for ExampleBus {
    fn send(&mut self, frame: &CanFrame) {
        self.sent.push(*frame);
    }
}

/// Output lines storing the last driven levels
#[derive(Debug)]
pub struct ExampleLines {
    pub irq: bool,
    pub rx_buffer_full: [bool; 2],
}

impl Default for ExampleLines {
    /// Pins idle state: IRQ inactive, RXnBF high
    fn default() -> Self {
        Self {
            irq: false,
            rx_buffer_full: [true; 2],
        }
    }
}

impl Lines for ExampleLines {
    fn set_irq(&mut self, level: bool) {
        self.irq = level;
    }

    fn set_rx_buffer_full(&mut self, buffer: usize, level: bool) {
        self.rx_buffer_full[buffer] = level;
    }
}
