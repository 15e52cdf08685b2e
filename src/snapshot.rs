//!# State snapshots
//! A [Snapshot] captures the SPI transaction state and all registers of the controller.
//! The host decides where snapshots are stored, [Snapshot::encode] and [Snapshot::decode]
//! provide a fixed binary layout.
//!
//! ```
//!# use mcp25625::chip::MCP25625;
//!# use mcp25625::snapshot::Snapshot;
//! let controller = MCP25625::new((), ());
//!
//! let mut buffer: Vec<u8> = Vec::new();
//! controller.snapshot().encode(&mut buffer);
//! assert_eq!(Snapshot::ENCODED_LEN, buffer.len());
//!
//! let snapshot = Snapshot::decode(&mut buffer.as_slice()).unwrap();
//! let mut restored = MCP25625::new((), ());
//! restored.restore(&snapshot).unwrap();
//! ```
use crate::address::resolve;
use crate::chip::{CanBus, MCP25625};
use crate::irq::Lines;
use crate::registers::{RegisterFile, RxBuffer, RxFilter, RxMask, TxBuffer, BUFFER_LEN};
use crate::spi::{SpiSession, SpiState};
use crate::status::OperationMode;
use bytes::{Buf, BufMut};
use log::debug;
use serde::{Deserialize, Serialize};

/// Version byte of the encoded layout
const SNAPSHOT_VERSION: u8 = 1;

/// Marker of "no RX buffer read in this transaction"
const NO_RX_BUFFER: u8 = 0xFF;

/// Possible errors when decoding or restoring a snapshot
#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// Buffer is shorter than [Snapshot::ENCODED_LEN], contains the available length
    Truncated(usize),
    /// Layout version not supported
    UnsupportedVersion(u8),
    /// Unknown SPI protocol state
    InvalidSpiState(u8),
    /// RX buffer index out of range
    InvalidRxBuffer(u8),
    /// CANSTAT or CANCTRL holds a reserved mode encoding
    InvalidMode(u8),
}

/// Saved controller state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub spi_state: u8,
    pub spi_write: bool,
    pub spi_address: u8,
    /// RX buffer of a READ RX BUFFER instruction, 0xFF if none
    pub spi_rx_buffer: u8,
    pub spi_modify_mask: u8,

    pub canstat: u8,
    pub canctrl: u8,
    pub bfpctrl: u8,
    pub txrtsctrl: u8,
    pub tec: u8,
    pub rec: u8,
    pub caninte: u8,
    pub canintf: u8,
    pub eflg: u8,
    pub cnfs: [u8; 4],

    pub tx_buffers: [[u8; BUFFER_LEN]; 3],
    pub rx_buffers: [[u8; BUFFER_LEN]; 2],
    pub masks: [[u8; 4]; 2],
    pub filters: [[u8; 4]; 6],
}

impl Snapshot {
    /// Size of the encoded snapshot in bytes
    pub const ENCODED_LEN: usize = 1 + 5 + 9 + 4 + 3 * BUFFER_LEN + 2 * BUFFER_LEN + 2 * 4 + 6 * 4;

    pub fn encode<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u8(SNAPSHOT_VERSION);

        buffer.put_u8(self.spi_state);
        buffer.put_u8(self.spi_write as u8);
        buffer.put_u8(self.spi_address);
        buffer.put_u8(self.spi_rx_buffer);
        buffer.put_u8(self.spi_modify_mask);

        for register in [
            self.canstat,
            self.canctrl,
            self.bfpctrl,
            self.txrtsctrl,
            self.tec,
            self.rec,
            self.caninte,
            self.canintf,
            self.eflg,
        ] {
            buffer.put_u8(register);
        }
        buffer.put_slice(&self.cnfs);

        self.tx_buffers.iter().for_each(|block| buffer.put_slice(block));
        self.rx_buffers.iter().for_each(|block| buffer.put_slice(block));
        self.masks.iter().for_each(|block| buffer.put_slice(block));
        self.filters.iter().for_each(|block| buffer.put_slice(block));
    }

    pub fn decode<T: Buf>(buffer: &mut T) -> Result<Self, SnapshotError> {
        if buffer.remaining() < Self::ENCODED_LEN {
            return Err(SnapshotError::Truncated(buffer.remaining()));
        }

        let version = buffer.get_u8();
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        let mut snapshot = Self {
            spi_state: buffer.get_u8(),
            spi_write: buffer.get_u8() != 0,
            spi_address: buffer.get_u8(),
            spi_rx_buffer: buffer.get_u8(),
            spi_modify_mask: buffer.get_u8(),
            canstat: buffer.get_u8(),
            canctrl: buffer.get_u8(),
            bfpctrl: buffer.get_u8(),
            txrtsctrl: buffer.get_u8(),
            tec: buffer.get_u8(),
            rec: buffer.get_u8(),
            caninte: buffer.get_u8(),
            canintf: buffer.get_u8(),
            eflg: buffer.get_u8(),
            ..Default::default()
        };
        buffer.copy_to_slice(&mut snapshot.cnfs);

        snapshot.tx_buffers.iter_mut().for_each(|block| buffer.copy_to_slice(block));
        snapshot.rx_buffers.iter_mut().for_each(|block| buffer.copy_to_slice(block));
        snapshot.masks.iter_mut().for_each(|block| buffer.copy_to_slice(block));
        snapshot.filters.iter_mut().for_each(|block| buffer.copy_to_slice(block));

        Ok(snapshot)
    }
}

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Captures the current controller state
    pub fn snapshot(&self) -> Snapshot {
        let registers = &self.registers;

        Snapshot {
            spi_state: self.spi.state as u8,
            spi_write: self.spi.write,
            spi_address: self.spi.address,
            spi_rx_buffer: self.spi.rx_buffer.map_or(NO_RX_BUFFER, |buffer| buffer as u8),
            spi_modify_mask: self.spi.modify_mask,
            canstat: registers.canstat,
            canctrl: registers.canctrl,
            bfpctrl: registers.bfpctrl,
            txrtsctrl: registers.txrtsctrl,
            tec: registers.tec,
            rec: registers.rec,
            caninte: registers.caninte,
            canintf: registers.canintf,
            eflg: registers.eflg,
            cnfs: registers.cnfs,
            tx_buffers: registers.tx_buffers.map(|buffer| buffer.data),
            rx_buffers: registers.rx_buffers.map(|buffer| buffer.data),
            masks: registers.masks.map(|mask| mask.data),
            filters: registers.filters.map(|filter| filter.data),
        }
    }

    /// Restores a previously captured state and recomputes all interrupt outputs
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let state = SpiState::from_u8(snapshot.spi_state).ok_or(SnapshotError::InvalidSpiState(snapshot.spi_state))?;

        let rx_buffer = match snapshot.spi_rx_buffer {
            NO_RX_BUFFER => None,
            buffer @ 0..=1 => Some(buffer as usize),
            buffer => return Err(SnapshotError::InvalidRxBuffer(buffer)),
        };

        for register in [snapshot.canstat, snapshot.canctrl] {
            if OperationMode::from_register(register).is_none() {
                return Err(SnapshotError::InvalidMode(register));
            }
        }

        debug!("{}: restoring snapshot", self.config.name);

        self.spi = SpiSession {
            state,
            write: snapshot.spi_write,
            address: snapshot.spi_address,
            decoded: resolve(snapshot.spi_address),
            rx_buffer,
            modify_mask: snapshot.spi_modify_mask,
        };

        self.registers = RegisterFile {
            canstat: snapshot.canstat,
            canctrl: snapshot.canctrl,
            bfpctrl: snapshot.bfpctrl,
            txrtsctrl: snapshot.txrtsctrl,
            tec: snapshot.tec,
            rec: snapshot.rec,
            cnfs: snapshot.cnfs,
            caninte: snapshot.caninte,
            canintf: snapshot.canintf,
            eflg: snapshot.eflg,
            tx_buffers: snapshot.tx_buffers.map(|data| TxBuffer { data }),
            rx_buffers: snapshot.rx_buffers.map(|data| RxBuffer { data }),
            filters: snapshot.filters.map(|data| RxFilter { data }),
            masks: snapshot.masks.map(|data| RxMask { data }),
        };

        self.last_irq = None;
        self.raise(0);

        Ok(())
    }
}
