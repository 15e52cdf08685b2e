#![allow(unused_braces)]
use crate::registers::{irq_tx, RegisterFile, Rxb0Ctrl, Rxb1Ctrl, IRQ_RX0, IRQ_RX1, OFF_CTRL};
use modular_bitfield_msb::prelude::*;

/// Controller operation mode as encoded in CANCTRL.REQOP and CANSTAT.OPMOD
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationMode {
    /// Module is in normal mode, frames are sent on the bus
    Normal = 0b000,
    /// Module is in sleep mode, bus activity only raises the wake-up interrupt
    Sleep = 0b001,
    /// Module is in loopback mode, transmitted frames are received internally
    Loopback = 0b010,
    /// Module is in listen-only mode
    ListenOnly = 0b011,
    /// Module is in configuration mode
    Configuration = 0b100,
}

impl OperationMode {
    /// Maps the three mode bits, returns None for reserved encodings
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::Normal),
            0b001 => Some(Self::Sleep),
            0b010 => Some(Self::Loopback),
            0b011 => Some(Self::ListenOnly),
            0b100 => Some(Self::Configuration),
            _ => None,
        }
    }

    /// Maps the mode bits <7:5> of CANCTRL or CANSTAT
    pub(crate) fn from_register(register: u8) -> Option<Self> {
        Self::from_bits(register >> 5)
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Response byte of the READ STATUS instruction
pub struct ReadStatus {
    pub tx2if: bool,
    pub txb2_txreq: bool,
    pub tx1if: bool,
    pub txb1_txreq: bool,
    pub tx0if: bool,
    pub txb0_txreq: bool,
    pub rx1if: bool,
    pub rx0if: bool,
}

impl ReadStatus {
    pub(crate) fn from_registers(registers: &RegisterFile) -> Self {
        let txreq = |buffer: usize| registers.tx_buffers[buffer].ctrl().txreq();
        let flag = |mask: u8| registers.canintf & mask != 0;

        Self::new()
            .with_rx0if(flag(IRQ_RX0))
            .with_rx1if(flag(IRQ_RX1))
            .with_txb0_txreq(txreq(0))
            .with_tx0if(flag(irq_tx(0)))
            .with_txb1_txreq(txreq(1))
            .with_tx1if(flag(irq_tx(1)))
            .with_txb2_txreq(txreq(2))
            .with_tx2if(flag(irq_tx(2)))
    }
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Response byte of the RX STATUS instruction
pub struct RxStatus {
    /// Full state of RXB1 and RXB0
    pub received: B2,
    #[skip]
    __: B1,
    /// Reported message uses an extended identifier
    pub extended: bool,
    /// Reported message is a remote frame
    pub remote: bool,
    /// Filter which accepted the reported message, 6/7 means rollover from RXB0
    pub filter: B3,
}

impl RxStatus {
    /// RXB0 takes precedence over RXB1 if both buffers are full
    pub(crate) fn from_registers(registers: &RegisterFile) -> Self {
        let status = Self::new().with_received(registers.canintf & (IRQ_RX0 | IRQ_RX1));

        let buffer = if registers.rx_full(0) {
            0
        } else if registers.rx_full(1) {
            1
        } else {
            return status;
        };

        let rx_buffer = &registers.rx_buffers[buffer];
        let ctrl = rx_buffer.data[OFF_CTRL];

        let filter = if buffer == 0 {
            Rxb0Ctrl::from(ctrl).filhit0() as u8
        } else {
            match Rxb1Ctrl::from(ctrl).filhit() {
                hit @ 0..=1 => hit + 6,
                hit => hit,
            }
        };

        status
            .with_remote(rx_buffer.rxrtr())
            .with_extended(rx_buffer.sidl().ide())
            .with_filter(filter)
    }
}
