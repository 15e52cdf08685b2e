//!# Frame reception
//! Accepted frames land in the first matching receive buffer. A frame matching
//! buffer 0 while it is full rolls over into buffer 1 if BUKT is set, otherwise
//! RX0OVR is flagged and the frame is dropped. In sleep mode frames only raise WAKE.
use crate::chip::{CanBus, MCP25625};
use crate::filter::{check_filters, FilterResult};
use crate::frame::{CanFrame, EFF_MASK, MAX_PAYLOAD, SFF_MASK};
use crate::irq::Lines;
use crate::registers::{
    irq_rx, Dlc, Rxb0Ctrl, Rxb1Ctrl, Sidl, EFLG_RX0OVR, EFLG_RX1OVR, IRQ_ERR, IRQ_WAKE, OFF_CTRL, OFF_DATA, OFF_DLC,
    OFF_EID0, OFF_EID8, OFF_SIDH, OFF_SIDL,
};
use crate::status::OperationMode;
use byteorder::{BigEndian, ByteOrder};
use embedded_can::Frame;
use log::debug;

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// True if the controller takes frames from the bus
    pub fn can_receive(&self) -> bool {
        !self.in_mode(OperationMode::Configuration) && !self.in_mode(OperationMode::Loopback)
    }

    /// Delivers a frame from the bus.
    ///
    /// Returns false if the frame is not supported (error frames or frames with flags set).
    /// Frames rejected by the acceptance filters or dropped on overflow still count as received.
    pub fn receive(&mut self, frame: &CanFrame) -> bool {
        if frame.is_error_frame() || frame.flags != 0 {
            debug!("{}: unsupported frame {:#x}, flags {:#x}", self.config.name, frame.can_id, frame.flags);
            return false;
        }

        if self.in_mode(OperationMode::Sleep) {
            self.raise(IRQ_WAKE);
            return true;
        }

        match check_filters(&self.registers, frame, 0) {
            FilterResult::Matched(filter) => {
                if !self.registers.rx_full(0) {
                    self.dispatch(frame, 0, filter);
                } else if self.registers.rollover_enabled() && !self.registers.rx_full(1) {
                    self.dispatch(frame, 1, filter);
                } else {
                    self.overflow(EFLG_RX0OVR);
                }
            }
            FilterResult::NoMatch | FilterResult::InvalidConfig => {
                if let FilterResult::Matched(filter) = check_filters(&self.registers, frame, 1) {
                    if self.registers.rx_full(1) {
                        self.overflow(EFLG_RX1OVR);
                    } else {
                        self.dispatch(frame, 1, filter);
                    }
                }
            }
        }

        true
    }

    /// Stores the frame in the given receive buffer
    fn dispatch(&mut self, frame: &CanFrame, buffer: usize, filter: usize) {
        debug!(
            "{}: frame {:#x} into RX buffer {buffer} (filter {filter})",
            self.config.name, frame.can_id
        );

        let extended = frame.is_extended();
        let remote = frame.is_remote_frame();
        let (sid, eid) = if extended {
            let id = frame.can_id & EFF_MASK;
            (id >> 18, id & 0x3FFFF)
        } else {
            (frame.can_id & SFF_MASK, 0)
        };
        let len = frame.dlc.min(MAX_PAYLOAD as u8);

        let sidl = Sidl::new()
            .with_sid((sid & 0x7) as u8)
            .with_srr(remote && !extended)
            .with_ide(extended)
            .with_eid(((eid >> 16) & 0x3) as u8);

        let data = &mut self.registers.rx_buffers[buffer].data;
        data[OFF_SIDH] = (sid >> 3) as u8;
        data[OFF_SIDL] = sidl.into();
        BigEndian::write_u16(&mut data[OFF_EID8..=OFF_EID0], eid as u16);
        data[OFF_DLC] = Dlc::new().with_rtr(remote && extended).with_dlc(len).into();

        data[OFF_CTRL] = if buffer == 0 {
            Rxb0Ctrl::from(data[OFF_CTRL])
                .with_filhit0(filter > 0)
                .with_rxrtr(remote)
                .into()
        } else {
            Rxb1Ctrl::from(data[OFF_CTRL])
                .with_filhit(filter as u8)
                .with_rxrtr(remote)
                .into()
        };

        data[OFF_DATA..OFF_DATA + len as usize].copy_from_slice(&frame.data[..len as usize]);

        self.raise(irq_rx(buffer));
    }

    fn overflow(&mut self, flag: u8) {
        debug!("{}: receive overflow, EFLG {flag:#04x}", self.config.name);
        self.registers.eflg |= flag;
        self.raise(IRQ_ERR);
    }
}
