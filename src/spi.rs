//!# SPI command processor
//! Each SPI transaction starts with chip-select going active, followed by the instruction
//! byte. Every transferred byte produces one response byte, `0xFF` unless data is read.
//!
//! The controller also implements the blocking `embedded_hal` SPI traits, where every call
//! is a complete transaction framed by chip-select:
//!
//! ```
//!# use mcp25625::chip::MCP25625;
//!# use embedded_hal::blocking::spi::Transfer;
//! let mut controller = MCP25625::new((), ());
//!
//! // READ CANSTAT
//! let mut buffer = [0x03, 0x0E, 0x00];
//! controller.transfer(&mut buffer).unwrap();
//!
//! assert_eq!(0x80, buffer[2]);
//! ```
use crate::address::{resolve, DecodedRegister, Register};
use crate::chip::{CanBus, MCP25625};
use crate::irq::Lines;
use crate::registers::{Rxb0Ctrl, OFF_CTRL};
use crate::status::{OperationMode, ReadStatus, RxStatus};
use core::convert::Infallible;
use embedded_hal::blocking::spi::{Transfer, Write};
use log::{trace, warn};

/// Start addresses of the READ RX BUFFER instruction variants
const READ_RX_BUFFER_ADDRESSES: [u8; 4] = [0x61, 0x66, 0x71, 0x76];

/// Start addresses of the LOAD TX BUFFER instruction variants
const LOAD_TX_BUFFER_ADDRESSES: [u8; 6] = [0x31, 0x36, 0x41, 0x46, 0x51, 0x56];

/// SPI instruction set
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Reset,
    Read,
    Write,
    /// Read starting at RXBnSIDH or RXBnD0, clears the RX flag when the transaction ends
    ReadRxBuffer { buffer: usize, address: u8 },
    /// Write starting at TXBnSIDH or TXBnD0
    LoadTxBuffer { address: u8 },
    /// Request to send of the TX buffers in the bitmap
    RequestToSend(u8),
    ReadStatus,
    RxStatus,
    BitModify,
    Invalid(u8),
}

impl Instruction {
    pub fn decode(byte: u8) -> Self {
        match byte {
            0xC0 => Self::Reset,
            0x03 => Self::Read,
            0x02 => Self::Write,
            0x90 | 0x92 | 0x94 | 0x96 => Self::ReadRxBuffer {
                buffer: ((byte - 0x90) >> 2) as usize,
                address: READ_RX_BUFFER_ADDRESSES[((byte - 0x90) >> 1) as usize],
            },
            0x40..=0x45 => LOAD_TX_BUFFER_ADDRESSES
                .get((byte - 0x40) as usize)
                .map_or(Self::Invalid(byte), |address| Self::LoadTxBuffer { address: *address }),
            0x80..=0x87 => Self::RequestToSend(byte & 0x7),
            0xA0 => Self::ReadStatus,
            0xB0 => Self::RxStatus,
            0x05 => Self::BitModify,
            _ => Self::Invalid(byte),
        }
    }
}

/// Protocol state of the current SPI transaction
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SpiState {
    #[default]
    AwaitingInstruction = 0,
    AwaitingAddress = 1,
    WritingData = 2,
    ReadingData = 3,
    /// Instruction completed, remaining bytes are ignored
    Idle = 4,
    ReadingStatus = 5,
    ReadingRxStatus = 6,
    AwaitingModifyAddress = 7,
    AwaitingModifyMask = 8,
    ModifyingData = 9,
}

impl SpiState {
    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::AwaitingInstruction),
            1 => Some(Self::AwaitingAddress),
            2 => Some(Self::WritingData),
            3 => Some(Self::ReadingData),
            4 => Some(Self::Idle),
            5 => Some(Self::ReadingStatus),
            6 => Some(Self::ReadingRxStatus),
            7 => Some(Self::AwaitingModifyAddress),
            8 => Some(Self::AwaitingModifyMask),
            9 => Some(Self::ModifyingData),
            _ => None,
        }
    }
}

/// State of one chip-select framed transaction
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SpiSession {
    pub state: SpiState,
    /// Address phase is followed by a write
    pub write: bool,
    pub address: u8,
    /// Register decoded by the BIT MODIFY address phase
    pub decoded: Option<DecodedRegister>,
    /// RX buffer read by READ RX BUFFER in this transaction
    pub rx_buffer: Option<usize>,
    pub modify_mask: u8,
}

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Chip-select going active, starts a new transaction
    pub fn select(&mut self) {
        self.spi.state = SpiState::AwaitingInstruction;
        self.spi.rx_buffer = None;
    }

    /// Chip-select going inactive, ends the transaction
    pub fn deselect(&mut self) {
        if let Some(buffer) = self.spi.rx_buffer {
            self.clear_rx_flag(buffer);
        }
    }

    /// Transfers a single byte and returns the response byte
    pub fn transfer_byte(&mut self, input: u8) -> u8 {
        let state = self.spi.state;

        let output = match state {
            SpiState::AwaitingInstruction => {
                self.spi.write = false;
                self.spi.state = self.execute(Instruction::decode(input));
                0xFF
            }
            SpiState::AwaitingAddress => {
                self.spi.address = input;
                self.spi.state = if self.spi.write {
                    SpiState::WritingData
                } else {
                    SpiState::ReadingData
                };
                0xFF
            }
            SpiState::WritingData => {
                if let Some(decoded) = resolve(self.spi.address) {
                    self.update(decoded, input);
                }
                self.advance_address();
                0xFF
            }
            SpiState::ReadingData => {
                let output = match resolve(self.spi.address) {
                    Some(decoded) if decoded.config_only_read && !self.in_mode(OperationMode::Configuration) => 0x00,
                    Some(decoded) => self.registers.get(decoded.register),
                    None => 0xFF,
                };
                self.advance_address();
                output
            }
            SpiState::Idle => 0xFF,
            SpiState::ReadingStatus => ReadStatus::from_registers(&self.registers).into(),
            SpiState::ReadingRxStatus => RxStatus::from_registers(&self.registers).into(),
            SpiState::AwaitingModifyAddress => {
                self.spi.address = input;
                self.spi.decoded = resolve(input);
                self.spi.state = SpiState::AwaitingModifyMask;
                0xFF
            }
            SpiState::AwaitingModifyMask => {
                self.spi.modify_mask = input;
                self.spi.state = SpiState::ModifyingData;
                0xFF
            }
            SpiState::ModifyingData => {
                let decoded = self.spi.decoded;

                if !decoded.map_or(false, |decoded| decoded.bit_modifiable) {
                    self.spi.modify_mask = 0xFF;
                }

                if let Some(decoded) = decoded {
                    let mask = self.spi.modify_mask;
                    let merged = (input & mask) | (self.registers.get(decoded.register) & !mask);
                    self.update(decoded, merged);
                }
                0xFF
            }
        };

        trace!(
            "{}: transfer {input:#04x} -> {output:#04x} ({state:?} -> {:?}, address {:#04x})",
            self.config.name,
            self.spi.state,
            self.spi.address
        );
        output
    }

    /// Executes the instruction byte, returns the following protocol state
    fn execute(&mut self, instruction: Instruction) -> SpiState {
        match instruction {
            Instruction::Reset => {
                self.full_reset();
                SpiState::Idle
            }
            Instruction::Read => SpiState::AwaitingAddress,
            Instruction::Write => {
                self.spi.write = true;
                SpiState::AwaitingAddress
            }
            Instruction::ReadRxBuffer { buffer, address } => {
                self.spi.address = address;
                self.spi.rx_buffer = Some(buffer);
                SpiState::ReadingData
            }
            Instruction::LoadTxBuffer { address } => {
                self.spi.write = true;
                self.spi.address = address;
                SpiState::WritingData
            }
            Instruction::RequestToSend(requested) => {
                self.request_to_send(requested);
                SpiState::Idle
            }
            Instruction::ReadStatus => SpiState::ReadingStatus,
            Instruction::RxStatus => SpiState::ReadingRxStatus,
            Instruction::BitModify => SpiState::AwaitingModifyAddress,
            Instruction::Invalid(byte) => {
                warn!("{}: spi invalid command {byte:#04x}", self.config.name);
                self.spi.address = 0x00;
                SpiState::Idle
            }
        }
    }

    fn advance_address(&mut self) {
        self.spi.address = self.spi.address.wrapping_add(1) & 0x7F;
    }

    /// Writes the register through its write mask and applies the side effects of the write
    fn update(&mut self, decoded: DecodedRegister, value: u8) {
        trace!(
            "{}: update {:?}: {:#04x} -> {value:#04x} (mask {:#04x})",
            self.config.name,
            decoded.register,
            self.registers.get(decoded.register),
            decoded.write_mask
        );
        self.registers.write_masked(decoded.register, value, decoded.write_mask);

        match decoded.register {
            Register::CanIntE | Register::CanIntF => self.raise(0),
            Register::BfpCtrl => self.update_rx_buffer_full_lines(),
            Register::CanCtrl => self.recompute_mode(false),
            Register::RxBuffer { index: 0, offset: OFF_CTRL } => {
                let ctrl = Rxb0Ctrl::from(self.registers.rx_buffers[0].data[OFF_CTRL]);
                let rollover = ctrl.bukt();
                self.registers.rx_buffers[0].data[OFF_CTRL] = ctrl.with_bukt1(rollover).into();
            }
            Register::TxBuffer { index, offset: OFF_CTRL } => {
                let abort = self.registers.canctrl().abat();
                let tx_buffer = &mut self.registers.tx_buffers[index];

                if abort {
                    tx_buffer.set_ctrl(tx_buffer.ctrl().with_txreq(false));
                } else {
                    tx_buffer.set_ctrl(tx_buffer.ctrl().with_abtf(false));
                    self.try_send(index);
                }
            }
            _ => {}
        }
    }
}

impl<B: CanBus, L: Lines> Transfer<u8> for MCP25625<B, L> {
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        self.select();
        for word in words.iter_mut() {
            *word = self.transfer_byte(*word);
        }
        self.deselect();

        Ok(words)
    }
}

impl<B: CanBus, L: Lines> Write<u8> for MCP25625<B, L> {
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.select();
        for word in words {
            self.transfer_byte(*word);
        }
        self.deselect();

        Ok(())
    }
}
