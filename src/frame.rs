//!# CAN frame
//! Frames are exchanged with the bus in SocketCAN layout: a 32-bit identifier word carrying
//! the extended, remote and error flags, an explicit length and up to eight payload bytes.
//!
//! ```
//!# use mcp25625::frame::CanFrame;
//!# use embedded_can::{Frame, Id, ExtendedId};
//! let id = Id::Extended(ExtendedId::new(0x14C92A2B).unwrap());
//! let frame = CanFrame::new(id, &[0x1, 0x2]).unwrap();
//!
//! assert_eq!(0x8000_0000 | 0x14C92A2B, frame.can_id);
//! assert_eq!(&[0x1, 0x2], frame.data());
//! ```
use crate::registers::{TxBuffer, OFF_DATA, OFF_EID0, OFF_EID8, OFF_SIDH};
use byteorder::{BigEndian, ByteOrder};
use embedded_can::{ExtendedId, Frame, Id, StandardId};
use serde::{Deserialize, Serialize};

/// Identifier word flag of extended (29-bit) frames
pub const EFF_FLAG: u32 = 0x8000_0000;
/// Identifier word flag of remote transmission requests
pub const RTR_FLAG: u32 = 0x4000_0000;
/// Identifier word flag of error frames
pub const ERR_FLAG: u32 = 0x2000_0000;

pub const SFF_MASK: u32 = 0x0000_07FF;
pub const EFF_MASK: u32 = 0x1FFF_FFFF;

pub const MAX_PAYLOAD: usize = 8;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    /// Identifier word including the EFF/RTR/ERR flags
    pub can_id: u32,
    /// Payload length
    pub dlc: u8,
    pub data: [u8; MAX_PAYLOAD],
    /// Generic frame flags (e.g. CAN FD), not supported by the controller
    pub flags: u8,
}

impl CanFrame {
    /// Raw 11 or 29 bit identifier without flags
    pub fn raw_id(&self) -> u32 {
        if self.is_extended() {
            self.can_id & EFF_MASK
        } else {
            self.can_id & SFF_MASK
        }
    }

    pub fn is_error_frame(&self) -> bool {
        self.can_id & ERR_FLAG != 0
    }

    /// Decodes the frame stored in the given transmit buffer
    pub(crate) fn from_tx_buffer(buffer: &TxBuffer) -> Self {
        let sidl = buffer.sidl();
        let dlc = buffer.dlc();
        let len = dlc.dlc().min(MAX_PAYLOAD as u8);

        let mut can_id = ((buffer.data[OFF_SIDH] as u32) << 3) | sidl.sid() as u32;

        if sidl.ide() {
            can_id <<= 18;
            can_id |= EFF_FLAG;
            can_id |= (sidl.eid() as u32) << 16;
            can_id |= BigEndian::read_u16(&buffer.data[OFF_EID8..=OFF_EID0]) as u32;
        }

        if dlc.rtr() {
            can_id |= RTR_FLAG;
        }

        let mut frame = CanFrame {
            can_id,
            dlc: len,
            ..Default::default()
        };
        frame.data[..len as usize].copy_from_slice(&buffer.data[OFF_DATA..OFF_DATA + len as usize]);
        frame
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut frame = CanFrame {
            can_id: id_word(id.into()),
            dlc: data.len() as u8,
            ..Default::default()
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD {
            return None;
        }

        Some(CanFrame {
            can_id: id_word(id.into()) | RTR_FLAG,
            dlc: dlc as u8,
            ..Default::default()
        })
    }

    fn is_extended(&self) -> bool {
        self.can_id & EFF_FLAG != 0
    }

    fn is_remote_frame(&self) -> bool {
        self.can_id & RTR_FLAG != 0
    }

    fn id(&self) -> Id {
        if self.is_extended() {
            Id::Extended(ExtendedId::new(self.raw_id()).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(StandardId::new(self.raw_id() as u16).unwrap_or(StandardId::ZERO))
        }
    }

    fn dlc(&self) -> usize {
        self.dlc as usize
    }

    fn data(&self) -> &[u8] {
        &self.data[..self.dlc().min(MAX_PAYLOAD)]
    }
}

/// Encodes the identifier as SocketCAN identifier word
fn id_word(id: Id) -> u32 {
    match id {
        Id::Standard(sid) => sid.as_raw() as u32,
        Id::Extended(eid) => eid.as_raw() | EFF_FLAG,
    }
}
