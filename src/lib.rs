#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(clippy::identity_op)]
#![allow(clippy::upper_case_acronyms)]

//! # Model of the MCP25625 CAN controller
//!
//! Register-accurate model of the Microchip MCP25625 (MCP2515 compatible) SPI CAN controller,
//! for running real device drivers against an emulated chip.
//!
//! Crate currently offer the following features:
//! * Complete SPI instruction set, including READ/LOAD buffer shortcuts and BIT MODIFY
//! * Register map with per-register write masks and configuration-only registers
//! * Acceptance filters/masks, RX buffer rollover and overflow flags
//! * TX priority arbitration, one-shot abort (ABAT), loopback
//! * Interrupt flag codes, IRQ and RXnBF output lines
//! * State snapshots
//! * no_std support
//!
//!## CAN Tx/Rx example
//!
//!```
//!use mcp25625::chip::MCP25625;
//!use mcp25625::example::{ExampleBus, ExampleLines};
//!use mcp25625::frame::CanFrame;
//!use embedded_can::{Frame, Id, StandardId};
//!use embedded_hal::blocking::spi::{Transfer, Write};
//!
//!let mut controller = MCP25625::new(ExampleBus::default(), ExampleLines::default());
//!
//! // Accept any frame in RX buffer 0 and enable the RX0 interrupt
//!controller.write(&[0x02, 0x60, 0b0110_0000]).unwrap();
//!controller.write(&[0x02, 0x2B, 0x01]).unwrap();
//!
//! // Enter normal mode
//!controller.write(&[0x02, 0x0F, 0x00]).unwrap();
//!
//! // Load TX buffer 0: standard ID 0x55, 2 data bytes, and request to send
//!controller.write(&[0x40, 0x0A, 0xA0, 0x00, 0x00, 0x02, 0x11, 0x22]).unwrap();
//!controller.write(&[0x81]).unwrap();
//!
//!assert_eq!(1, controller.bus().sent.len());
//!assert_eq!(&[0x11, 0x22], controller.bus().sent[0].data());
//!
//! // Frame from the bus
//!let frame = CanFrame::new(Id::Standard(StandardId::new(0x123).unwrap()), &[1, 2, 3]).unwrap();
//!assert!(controller.can_receive());
//!controller.receive(&frame);
//!assert!(controller.lines().irq);
//!
//! // READ RX BUFFER 0 starting at D0, clears the RX flag at the end of the transaction
//!let mut buffer = [0x92, 0, 0, 0];
//!controller.transfer(&mut buffer).unwrap();
//!assert_eq!([1, 2, 3], buffer[1..]);
//!assert!(!controller.lines().irq);
//!```

extern crate alloc;

pub mod address;
pub mod chip;
pub mod config;
pub mod filter;
pub mod frame;
pub mod irq;
mod mode;
pub mod registers;
mod rx;
pub mod snapshot;
pub mod spi;
pub mod status;
pub mod tx;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
#[cfg(test)]
mod tests;
