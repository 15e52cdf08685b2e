//! # SPI register address decoder
//!
//! Maps the 7-bit SPI address space onto the register file. The layout is not
//! contiguous: the low nibble `0xE`/`0xF` mirrors CANSTAT/CANCTRL in every row, the
//! remaining slots are selected by the high nibble.
//!
//! ```
//!# use mcp25625::address::{resolve, Register};
//! let decoded = resolve(0x31).unwrap();
//!
//! assert_eq!(Register::TxBuffer { index: 0, offset: 1 }, decoded.register);
//! assert_eq!(0xFF, decoded.write_mask);
//!
//! // CANSTAT mirror is read-only
//! assert_eq!(0x00, resolve(0x7E).unwrap().write_mask);
//! ```
use crate::registers::{
    BFPCTRL_WRITE_MASK, CNF3_WRITE_MASK, EFLG_WRITE_MASK, OFF_CTRL, OFF_DLC, OFF_PATTERN_SIDL, OFF_SIDL, RXB0CTRL_WRITE_MASK,
    RXB1CTRL_WRITE_MASK, RXFSIDL_WRITE_MASK, RXMSIDL_WRITE_MASK, TXBCTRL_WRITE_MASK, TXBDLC_WRITE_MASK,
    TXBSIDL_WRITE_MASK, TXRTSCTRL_WRITE_MASK,
};

/// Addressable register slot
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    CanStat,
    CanCtrl,
    BfpCtrl,
    TxRtsCtrl,
    Tec,
    Rec,
    /// Configuration register CNF1..CNF3
    Cnf(usize),
    CanIntE,
    CanIntF,
    Eflg,
    Filter { index: usize, offset: usize },
    Mask { index: usize, offset: usize },
    TxBuffer { index: usize, offset: usize },
    RxBuffer { index: usize, offset: usize },
}

/// Result of decoding a SPI address
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedRegister {
    pub register: Register,
    /// Bits which can be changed by SPI writes
    pub write_mask: u8,
    /// Register reads back 0 unless the controller is in configuration mode
    pub config_only_read: bool,
    /// Register accepts the BIT MODIFY instruction
    pub bit_modifiable: bool,
}

impl DecodedRegister {
    fn new(register: Register) -> Self {
        Self {
            register,
            write_mask: 0xFF,
            config_only_read: false,
            bit_modifiable: false,
        }
    }

    fn with_write_mask(mut self, write_mask: u8) -> Self {
        self.write_mask = write_mask;
        self
    }

    fn config_only_read(mut self) -> Self {
        self.config_only_read = true;
        self
    }

    fn bit_modifiable(mut self) -> Self {
        self.bit_modifiable = true;
        self
    }
}

/// Decodes the given address. Bit 7 is ignored, so the address space wraps every 128 bytes.
pub fn resolve(address: u8) -> Option<DecodedRegister> {
    let low = (address & 0xF) as usize;
    let high = (address >> 4) & 0x7;

    if low == 0xE {
        return Some(DecodedRegister::new(Register::CanStat).with_write_mask(0x0));
    }

    if low == 0xF {
        return Some(DecodedRegister::new(Register::CanCtrl).bit_modifiable());
    }

    match high {
        0x0 | 0x1 if low < 12 => {
            let index = low / 4 + if high == 0x1 { 3 } else { 0 };
            let decoded = DecodedRegister::new(Register::Filter { index, offset: low % 4 }).config_only_read();

            if low % 4 == OFF_PATTERN_SIDL {
                return Some(decoded.with_write_mask(RXFSIDL_WRITE_MASK));
            }
            Some(decoded)
        }
        0x0 => match low {
            12 => Some(
                DecodedRegister::new(Register::BfpCtrl)
                    .with_write_mask(BFPCTRL_WRITE_MASK)
                    .bit_modifiable(),
            ),
            13 => Some(
                DecodedRegister::new(Register::TxRtsCtrl)
                    .with_write_mask(TXRTSCTRL_WRITE_MASK)
                    .config_only_read()
                    .bit_modifiable(),
            ),
            _ => None,
        },
        0x1 => match low {
            12 => Some(DecodedRegister::new(Register::Tec).with_write_mask(0x0)),
            13 => Some(DecodedRegister::new(Register::Rec).with_write_mask(0x0)),
            _ => None,
        },
        0x2 => match low {
            0..=7 => {
                let decoded = DecodedRegister::new(Register::Mask {
                    index: low / 4,
                    offset: low % 4,
                })
                .config_only_read();

                if low % 4 == OFF_PATTERN_SIDL {
                    return Some(decoded.with_write_mask(RXMSIDL_WRITE_MASK));
                }
                Some(decoded)
            }
            8 => Some(
                DecodedRegister::new(Register::Cnf(3))
                    .with_write_mask(CNF3_WRITE_MASK)
                    .config_only_read()
                    .bit_modifiable(),
            ),
            9 => Some(DecodedRegister::new(Register::Cnf(2)).config_only_read().bit_modifiable()),
            10 => Some(DecodedRegister::new(Register::Cnf(1)).config_only_read().bit_modifiable()),
            11 => Some(DecodedRegister::new(Register::CanIntE).bit_modifiable()),
            12 => Some(DecodedRegister::new(Register::CanIntF).bit_modifiable()),
            13 => Some(
                DecodedRegister::new(Register::Eflg)
                    .with_write_mask(EFLG_WRITE_MASK)
                    .bit_modifiable(),
            ),
            _ => None,
        },
        0x3..=0x5 => {
            let decoded = DecodedRegister::new(Register::TxBuffer {
                index: (high - 3) as usize,
                offset: low,
            });

            Some(match low {
                OFF_CTRL => decoded.with_write_mask(TXBCTRL_WRITE_MASK).bit_modifiable(),
                OFF_SIDL => decoded.with_write_mask(TXBSIDL_WRITE_MASK),
                OFF_DLC => decoded.with_write_mask(TXBDLC_WRITE_MASK),
                _ => decoded,
            })
        }
        _ => {
            let index = (high - 6) as usize;
            let decoded = DecodedRegister::new(Register::RxBuffer { index, offset: low });

            if low != OFF_CTRL {
                return Some(decoded.with_write_mask(0x0));
            }

            let write_mask = if index == 0 {
                RXB0CTRL_WRITE_MASK
            } else {
                RXB1CTRL_WRITE_MASK
            };
            Some(decoded.with_write_mask(write_mask).bit_modifiable())
        }
    }
}
