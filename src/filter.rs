//!# Acceptance filters
//! Each receive buffer owns one mask and a set of filters: buffer 0 uses mask 0 with
//! filters 0-1, buffer 1 uses mask 1 with filters 2-5. Filters are evaluated in
//! ascending order, the first hit wins.
//!
//! Standard frames are compared against the complete 29-bit pattern: the identifier
//! lines up with the SID bits, the first two payload bytes with EID8/EID0.
//!
//! ```
//!# use mcp25625::filter::matches;
//!# use mcp25625::frame::CanFrame;
//!# use mcp25625::registers::{RxFilter, RxMask};
//!# use embedded_can::{Frame, Id, StandardId};
//! // Filter SID 0x21, standard frames only
//! let filter = RxFilter { data: [0x04, 0x20, 0x00, 0x00] };
//! // Mask all SID bits, ignore payload bytes
//! let mask = RxMask { data: [0xFF, 0xE0, 0x00, 0x00] };
//!
//! let frame = CanFrame::new(Id::Standard(StandardId::new(0x21).unwrap()), &[0xAA]).unwrap();
//! assert!(matches(&frame, &mask, &filter));
//! ```
use crate::frame::{CanFrame, EFF_MASK, SFF_MASK};
use crate::registers::{
    RegisterFile, RxFilter, RxMask, Sidl, OFF_PATTERN_EID0, OFF_PATTERN_EID8, OFF_PATTERN_SIDH, OFF_PATTERN_SIDL,
};
use byteorder::{BigEndian, ByteOrder};
use embedded_can::Frame;

/// RXM setting: filters are evaluated
pub const RXM_FILTERED: u8 = 0b00;
/// RXM setting: filters are bypassed, every frame is accepted
pub const RXM_ANY: u8 = 0b11;

/// Outcome of the acceptance check of one receive buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterResult {
    /// Frame accepted by the filter with the given index
    Matched(usize),
    /// No filter of the buffer accepted the frame
    NoMatch,
    /// Buffer is set to a reserved RXM value, treated as no match
    InvalidConfig,
}

impl FilterResult {
    pub fn matched(&self) -> Option<usize> {
        match self {
            Self::Matched(index) => Some(*index),
            _ => None,
        }
    }
}

/// Packs the four pattern bytes of a mask or filter into
/// `{SID:11}{EID17_16:2}{EID15_8:8}{EID7_0:8}`
pub fn pack_pattern(data: &[u8; 4]) -> u32 {
    let sidl = Sidl::from(data[OFF_PATTERN_SIDL]);

    ((data[OFF_PATTERN_SIDH] as u32) << 21)
        | ((sidl.sid() as u32) << 18)
        | ((sidl.eid() as u32) << 16)
        | BigEndian::read_u16(&data[OFF_PATTERN_EID8..=OFF_PATTERN_EID0]) as u32
}

/// Returns true if the frame passes the given mask/filter pair
pub fn matches(frame: &CanFrame, mask: &RxMask, filter: &RxFilter) -> bool {
    if frame.is_extended() != filter.extended() {
        return false;
    }

    let mask_value = pack_pattern(&mask.data);
    let mut filter_value = pack_pattern(&filter.data);

    let frame_value = if frame.is_extended() {
        frame.can_id & EFF_MASK
    } else {
        // payload bytes missing in the frame always match
        let len = if frame.is_remote_frame() { 0 } else { frame.dlc };
        let data0 = if len > 0 {
            frame.data[0]
        } else {
            filter.data[OFF_PATTERN_EID8]
        };
        let data1 = if len > 1 {
            frame.data[1]
        } else {
            filter.data[OFF_PATTERN_EID0]
        };

        filter_value &= !(0x3 << 16);
        ((frame.can_id & SFF_MASK) << 18) | ((data0 as u32) << 8) | data1 as u32
    };

    (!mask_value | !(filter_value ^ frame_value)) == 0xFFFF_FFFF
}

/// Runs the acceptance check of the given receive buffer
pub fn check_filters(registers: &RegisterFile, frame: &CanFrame, buffer: usize) -> FilterResult {
    let rxm = registers.rx_buffers[buffer].rxm();

    if rxm == RXM_ANY {
        return FilterResult::Matched(0);
    }

    if rxm != RXM_FILTERED {
        return FilterResult::InvalidConfig;
    }

    let mask = &registers.masks[buffer];
    let mut filters = if buffer == 0 { 0..=1 } else { 2..=5 };

    filters
        .find(|index| matches(frame, mask, &registers.filters[*index]))
        .map_or(FilterResult::NoMatch, FilterResult::Matched)
}
