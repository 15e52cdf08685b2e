#![allow(unused_braces)]
//! # Register file
//!
//! Raw register storage of the controller plus `modular_bitfield_msb` views of the
//! control registers. Registers are kept as plain bytes, since the SPI address decoder
//! hands out single byte slots; the bitfield types are used for structured access.
use crate::address::Register;
use modular_bitfield_msb::prelude::*;

/// Size of a TX or RX buffer block (CTRL, SIDH, SIDL, EID8, EID0, DLC, D0..D7)
pub const BUFFER_LEN: usize = 14;

pub const OFF_CTRL: usize = 0;
pub const OFF_SIDH: usize = 1;
pub const OFF_SIDL: usize = 2;
pub const OFF_EID8: usize = 3;
pub const OFF_EID0: usize = 4;
pub const OFF_DLC: usize = 5;
pub const OFF_DATA: usize = 6;

/// Byte offsets inside a filter or mask block
pub const OFF_PATTERN_SIDH: usize = 0;
pub const OFF_PATTERN_SIDL: usize = 1;
pub const OFF_PATTERN_EID8: usize = 2;
pub const OFF_PATTERN_EID0: usize = 3;

pub const RXFSIDL_WRITE_MASK: u8 = 0xE0 | (1 << 3) | 0x3;
pub const RXMSIDL_WRITE_MASK: u8 = 0xE3;
pub const BFPCTRL_WRITE_MASK: u8 = 0x3F;
pub const TXRTSCTRL_WRITE_MASK: u8 = 0x07;
pub const CNF3_WRITE_MASK: u8 = 0xC7;
pub const EFLG_WRITE_MASK: u8 = EFLG_RX1OVR | EFLG_RX0OVR;
pub const TXBCTRL_WRITE_MASK: u8 = (1 << 3) | 0x3;
pub const TXBSIDL_WRITE_MASK: u8 = 0xE0 | (1 << 3) | 0x3;
pub const TXBDLC_WRITE_MASK: u8 = (1 << 6) | 0xF;
pub const RXB0CTRL_WRITE_MASK: u8 = (3 << 5) | (1 << 2);
pub const RXB1CTRL_WRITE_MASK: u8 = 3 << 5;

/// Receive buffer 1 overflow flag of EFLG
pub const EFLG_RX1OVR: u8 = 1 << 7;
/// Receive buffer 0 overflow flag of EFLG
pub const EFLG_RX0OVR: u8 = 1 << 6;

/// Message error interrupt flag (CANINTE/CANINTF)
pub const IRQ_MERR: u8 = 1 << 7;
/// Wake-up interrupt flag
pub const IRQ_WAKE: u8 = 1 << 6;
/// Error interrupt flag
pub const IRQ_ERR: u8 = 1 << 5;
pub const IRQ_TX2: u8 = 1 << 4;
pub const IRQ_TX1: u8 = 1 << 3;
pub const IRQ_TX0: u8 = 1 << 2;
pub const IRQ_RX1: u8 = 1 << 1;
pub const IRQ_RX0: u8 = 1 << 0;

/// Transmit buffer empty interrupt flag of the given TX buffer
pub const fn irq_tx(buffer: usize) -> u8 {
    1 << (buffer + 2)
}

/// Receive buffer full interrupt flag of the given RX buffer
pub const fn irq_rx(buffer: usize) -> u8 {
    1 << buffer
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN control register
pub struct CanCtrl {
    /// Request operation mode bits
    pub reqop: B3,
    /// Abort all pending transmissions bit
    pub abat: bool,
    /// One-shot mode bit
    pub osm: bool,
    /// CLKOUT pin enable bit
    pub clken: bool,
    /// CLKOUT pin prescaler bits
    pub clkpre: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN status register
pub struct CanStat {
    /// Operation mode bits
    pub opmod: B3,
    #[skip]
    __: B1,
    /// Interrupt flag code bits
    pub icod: B3,
    #[skip]
    __: B1,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Transmit buffer control register
pub struct TxbCtrl {
    #[skip]
    __: B1,
    /// Message aborted flag bit
    pub abtf: bool,
    /// Message lost arbitration bit
    pub mloa: bool,
    /// Transmission error detected bit
    pub txerr: bool,
    /// Message transmit request bit
    pub txreq: bool,
    #[skip]
    __: B1,
    /// Transmit buffer priority bits
    pub txp: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Receive buffer 0 control register
pub struct Rxb0Ctrl {
    #[skip]
    __: B1,
    /// Receive buffer operating mode bits
    pub rxm: B2,
    #[skip]
    __: B1,
    /// Received remote transfer request bit
    pub rxrtr: bool,
    /// Rollover enable bit
    pub bukt: bool,
    /// Read-only copy of BUKT
    pub bukt1: bool,
    /// Filter hit bit
    pub filhit0: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Receive buffer 1 control register
pub struct Rxb1Ctrl {
    #[skip]
    __: B1,
    /// Receive buffer operating mode bits
    pub rxm: B2,
    #[skip]
    __: B1,
    /// Received remote transfer request bit
    pub rxrtr: bool,
    /// Filter hit bits
    pub filhit: B3,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// RXnBF pin control and status register
pub struct BfpCtrl {
    #[skip]
    __: B2,
    pub b1bfs: bool,
    pub b0bfs: bool,
    pub b1bfe: bool,
    pub b0bfe: bool,
    pub b1bfm: bool,
    pub b0bfm: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Standard identifier low byte, shared by TX/RX buffers, filters and masks
pub struct Sidl {
    /// Standard identifier bits <2:0>
    pub sid: B3,
    /// Standard frame remote transmit request bit (RX buffers only)
    pub srr: bool,
    /// Extended identifier flag bit
    pub ide: bool,
    #[skip]
    __: B1,
    /// Extended identifier bits <17:16>
    pub eid: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Data length code register
pub struct Dlc {
    #[skip]
    __: B1,
    /// Remote transmission request bit
    pub rtr: bool,
    #[skip]
    __: B2,
    /// Data length code bits
    pub dlc: B4,
}

/// Transmit buffer block (TXBnCTRL..TXBnD7)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TxBuffer {
    pub data: [u8; BUFFER_LEN],
}

impl TxBuffer {
    pub fn ctrl(&self) -> TxbCtrl {
        TxbCtrl::from(self.data[OFF_CTRL])
    }

    pub(crate) fn set_ctrl(&mut self, ctrl: TxbCtrl) {
        self.data[OFF_CTRL] = ctrl.into();
    }

    /// Transmit priority, 3 is highest
    pub fn priority(&self) -> u8 {
        self.ctrl().txp()
    }

    pub fn sidl(&self) -> Sidl {
        Sidl::from(self.data[OFF_SIDL])
    }

    pub fn dlc(&self) -> Dlc {
        Dlc::from(self.data[OFF_DLC])
    }
}

/// Receive buffer block (RXBnCTRL..RXBnD7)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxBuffer {
    pub data: [u8; BUFFER_LEN],
}

impl RxBuffer {
    /// Receive buffer operating mode bits, identical position for both buffers
    pub fn rxm(&self) -> u8 {
        Rxb1Ctrl::from(self.data[OFF_CTRL]).rxm()
    }

    pub fn rxrtr(&self) -> bool {
        Rxb1Ctrl::from(self.data[OFF_CTRL]).rxrtr()
    }

    pub fn sidl(&self) -> Sidl {
        Sidl::from(self.data[OFF_SIDL])
    }

    pub fn payload(&self) -> &[u8] {
        let len = (Dlc::from(self.data[OFF_DLC]).dlc() as usize).min(8);
        &self.data[OFF_DATA..OFF_DATA + len]
    }
}

/// Acceptance filter block (RXFnSIDH..RXFnEID0)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxFilter {
    pub data: [u8; 4],
}

impl RxFilter {
    /// True if filter is only applied to extended frames
    pub fn extended(&self) -> bool {
        Sidl::from(self.data[OFF_PATTERN_SIDL]).ide()
    }
}

/// Acceptance mask block (RXMnSIDH..RXMnEID0)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxMask {
    pub data: [u8; 4],
}

/// Complete register state of the controller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    pub canstat: u8,
    pub canctrl: u8,
    pub bfpctrl: u8,
    pub txrtsctrl: u8,
    pub tec: u8,
    pub rec: u8,
    /// CNF1..CNF3 at index 1..3, index 0 is unused
    pub cnfs: [u8; 4],
    pub caninte: u8,
    pub canintf: u8,
    pub eflg: u8,
    pub tx_buffers: [TxBuffer; 3],
    pub rx_buffers: [RxBuffer; 2],
    pub filters: [RxFilter; 6],
    pub masks: [RxMask; 2],
}

impl RegisterFile {
    /// Returns the stored value of the given register slot
    pub fn get(&self, register: Register) -> u8 {
        match register {
            Register::CanStat => self.canstat,
            Register::CanCtrl => self.canctrl,
            Register::BfpCtrl => self.bfpctrl,
            Register::TxRtsCtrl => self.txrtsctrl,
            Register::Tec => self.tec,
            Register::Rec => self.rec,
            Register::Cnf(index) => {
                debug_assert!((1..=3).contains(&index), "invalid CNF register {index}");
                self.cnfs[index]
            }
            Register::CanIntE => self.caninte,
            Register::CanIntF => self.canintf,
            Register::Eflg => self.eflg,
            Register::Filter { index, offset } => self.filters[index].data[offset],
            Register::Mask { index, offset } => self.masks[index].data[offset],
            Register::TxBuffer { index, offset } => self.tx_buffers[index].data[offset],
            Register::RxBuffer { index, offset } => self.rx_buffers[index].data[offset],
        }
    }

    pub(crate) fn slot_mut(&mut self, register: Register) -> &mut u8 {
        match register {
            Register::CanStat => &mut self.canstat,
            Register::CanCtrl => &mut self.canctrl,
            Register::BfpCtrl => &mut self.bfpctrl,
            Register::TxRtsCtrl => &mut self.txrtsctrl,
            Register::Tec => &mut self.tec,
            Register::Rec => &mut self.rec,
            Register::Cnf(index) => {
                debug_assert!((1..=3).contains(&index), "invalid CNF register {index}");
                &mut self.cnfs[index]
            }
            Register::CanIntE => &mut self.caninte,
            Register::CanIntF => &mut self.canintf,
            Register::Eflg => &mut self.eflg,
            Register::Filter { index, offset } => &mut self.filters[index].data[offset],
            Register::Mask { index, offset } => &mut self.masks[index].data[offset],
            Register::TxBuffer { index, offset } => &mut self.tx_buffers[index].data[offset],
            Register::RxBuffer { index, offset } => &mut self.rx_buffers[index].data[offset],
        }
    }

    /// Merges `value` into the register, leaving bits outside of `write_mask` untouched
    pub(crate) fn write_masked(&mut self, register: Register, value: u8, write_mask: u8) {
        let slot = self.slot_mut(register);
        *slot = (*slot & !write_mask) | (value & write_mask);
    }

    pub fn canctrl(&self) -> CanCtrl {
        CanCtrl::from(self.canctrl)
    }

    pub fn canstat(&self) -> CanStat {
        CanStat::from(self.canstat)
    }

    pub fn bfpctrl(&self) -> BfpCtrl {
        BfpCtrl::from(self.bfpctrl)
    }

    /// True if rollover from RX buffer 0 into buffer 1 is enabled
    pub fn rollover_enabled(&self) -> bool {
        Rxb0Ctrl::from(self.rx_buffers[0].data[OFF_CTRL]).bukt()
    }

    /// True if the RX full interrupt flag of the given buffer is set
    pub fn rx_full(&self, buffer: usize) -> bool {
        self.canintf & irq_rx(buffer) != 0
    }
}
