//!# Transmission arbitration
//! Buffers requested for transmission are sent by descending TXP priority. Equal
//! priorities are sent in ascending buffer order.
//!
//! ```
//!# use mcp25625::tx::transmit_order;
//! let order: Vec<usize> = transmit_order(0b111, [1, 3, 3]).collect();
//! assert_eq!(vec![1, 2, 0], order);
//! ```
use crate::chip::{CanBus, MCP25625};
use crate::frame::CanFrame;
use crate::irq::Lines;
use crate::registers::irq_tx;
use crate::status::OperationMode;
use core::cmp::Reverse;
use log::debug;

/// Returns the buffers of the request bitmap in transmission order
pub fn transmit_order(requested: u8, priorities: [u8; 3]) -> impl Iterator<Item = usize> {
    let mut order = [0usize, 1, 2];
    order.sort_unstable_by_key(|buffer| (Reverse(priorities[*buffer]), *buffer));

    order.into_iter().filter(move |buffer| requested & (1 << buffer) != 0)
}

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Marks the buffers of the bitmap for transmission and sends them by priority
    pub(crate) fn request_to_send(&mut self, requested: u8) {
        if self.registers.canctrl().abat() {
            return;
        }

        let priorities = [0, 1, 2].map(|buffer| self.registers.tx_buffers[buffer].priority());
        debug!("{}: request to send {requested:#05b}, priorities {priorities:?}", self.config.name);

        for buffer in transmit_order(requested, priorities) {
            let tx_buffer = &mut self.registers.tx_buffers[buffer];
            tx_buffer.set_ctrl(tx_buffer.ctrl().with_abtf(false).with_txreq(true));

            self.try_send(buffer);
        }
    }

    /// Sends the buffer if its transmit request is set
    pub(crate) fn try_send(&mut self, buffer: usize) {
        if self.registers.tx_buffers[buffer].ctrl().txreq() {
            self.send(buffer);
        }
    }

    /// Sends the buffer if the mode permits, otherwise it stays queued
    fn send(&mut self, buffer: usize) {
        let loopback = self.in_mode(OperationMode::Loopback);

        if !loopback && !self.in_mode(OperationMode::Normal) {
            return;
        }

        let frame = CanFrame::from_tx_buffer(&self.registers.tx_buffers[buffer]);
        debug!(
            "{}: sending TX buffer {buffer}: id {:#x}, {} bytes",
            self.config.name, frame.can_id, frame.dlc
        );

        if loopback {
            self.receive(&frame);
        } else {
            self.bus.send(&frame);
        }

        let tx_buffer = &mut self.registers.tx_buffers[buffer];
        tx_buffer.set_ctrl(tx_buffer.ctrl().with_txreq(false));

        self.raise(irq_tx(buffer));
    }
}
