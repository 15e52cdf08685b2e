use crate::frame::{CanFrame, EFF_FLAG, ERR_FLAG, RTR_FLAG};
use crate::registers::TxBuffer;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

const EXTENDED_ID: u32 = 0x14C92A2B;
const STANDARD_ID: u16 = 0x6A5;

#[test]
fn test_new_standard() {
    let frame = CanFrame::new(Id::Standard(StandardId::new(STANDARD_ID).unwrap()), &[0x1, 0x2, 0x3]).unwrap();

    assert_eq!(STANDARD_ID as u32, frame.can_id);
    assert_eq!(3, frame.dlc);
    assert_eq!(&[0x1, 0x2, 0x3], frame.data());
    assert!(!frame.is_extended());
    assert!(!frame.is_remote_frame());
    assert!(!frame.is_error_frame());
    assert_eq!(Id::Standard(StandardId::new(STANDARD_ID).unwrap()), frame.id());
}

#[test]
fn test_new_extended_remote() {
    let id = Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap());
    let frame = CanFrame::new_remote(id, 5).unwrap();

    assert_eq!(EFF_FLAG | RTR_FLAG | EXTENDED_ID, frame.can_id);
    assert_eq!(5, frame.dlc());
    assert_eq!(EXTENDED_ID, frame.raw_id());
    assert_eq!(id, frame.id());
    assert!(frame.is_remote_frame());
}

#[test]
fn test_new_payload_too_long() {
    let id = Id::Standard(StandardId::new(STANDARD_ID).unwrap());

    assert!(CanFrame::new(id, &[0x0; 9]).is_none());
    assert!(CanFrame::new_remote(id, 9).is_none());
    assert!(CanFrame::new(id, &[0x0; 8]).is_some());
}

#[test]
fn test_error_frame() {
    let frame = CanFrame {
        can_id: ERR_FLAG | 0x4,
        ..Default::default()
    };

    assert!(frame.is_error_frame());
    assert_eq!(0x4, frame.raw_id());
}

#[test]
fn test_data_clamped_to_payload_size() {
    let frame = CanFrame {
        can_id: 0x1,
        dlc: 15,
        data: [0xAB; 8],
        flags: 0,
    };

    assert_eq!(8, frame.data().len());
}

#[test]
fn test_from_tx_buffer_standard() {
    let buffer = TxBuffer {
        data: [0x0B, 0xD4, 0xA0, 0xFF, 0xFF, 0x02, 0x11, 0x22, 0x33, 0, 0, 0, 0, 0],
    };
    let frame = CanFrame::from_tx_buffer(&buffer);

    // EID bytes are ignored for standard frames
    assert_eq!(STANDARD_ID as u32, frame.can_id);
    assert_eq!(&[0x11, 0x22], frame.data());
}

#[test]
fn test_from_tx_buffer_extended() {
    let buffer = TxBuffer {
        data: [0x00, 0xA6, 0x49, 0x2A, 0x2B, 0x08, 1, 2, 3, 4, 5, 6, 7, 8],
    };
    let frame = CanFrame::from_tx_buffer(&buffer);

    assert_eq!(EFF_FLAG | EXTENDED_ID, frame.can_id);
    assert_eq!(&[1, 2, 3, 4, 5, 6, 7, 8], frame.data());
}

#[test]
fn test_from_tx_buffer_remote() {
    let buffer = TxBuffer {
        data: [0x00, 0xD4, 0xA0, 0x00, 0x00, 0x43, 0xAA, 0xBB, 0xCC, 0, 0, 0, 0, 0],
    };
    let frame = CanFrame::from_tx_buffer(&buffer);

    assert_eq!(RTR_FLAG | STANDARD_ID as u32, frame.can_id);
    assert_eq!(3, frame.dlc);
}
