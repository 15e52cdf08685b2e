use crate::chip::MCP25625;
use crate::example::{ExampleBus, ExampleLines};
use crate::registers::{IRQ_RX0, IRQ_WAKE};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::spi::SpiState;
use crate::status::OperationMode;
use crate::tests::chip::{
    accept_all, controller, read_register, set_mode, standard_frame, write_register, write_registers, CANINTE,
    Controller, TXB0CTRL,
};
use alloc::vec::Vec;
use bytes::{BufMut, BytesMut};

#[test]
fn test_snapshot_captures_state() {
    let mut controller = controller();
    accept_all(&mut controller);
    write_register(&mut controller, CANINTE, IRQ_RX0);
    write_registers(&mut controller, 0x20, &[0x12, 0x34]);
    set_mode(&mut controller, OperationMode::Normal);
    controller.receive(&standard_frame(0x42, &[0x1, 0x2]));

    let snapshot = controller.snapshot();

    assert_eq!(0x00, snapshot.canctrl & 0xE0);
    assert_eq!(IRQ_RX0, snapshot.caninte);
    assert_eq!(IRQ_RX0, snapshot.canintf);
    assert_eq!([0x12, 0x20, 0x00, 0x00], snapshot.masks[0]);
    assert_eq!([0x08, 0x40, 0x00, 0x00, 0x02, 0x01, 0x02], snapshot.rx_buffers[0][1..8]);
    // Last transaction was a BIT MODIFY
    assert_eq!(SpiState::ModifyingData as u8, snapshot.spi_state);
    assert_eq!(0xFF, snapshot.spi_rx_buffer);
}

#[test]
fn test_restore() {
    let mut controller = controller();
    accept_all(&mut controller);
    write_register(&mut controller, CANINTE, IRQ_RX0);
    set_mode(&mut controller, OperationMode::Normal);
    controller.receive(&standard_frame(0x42, &[0x1, 0x2]));
    let snapshot = controller.snapshot();

    let mut restored = MCP25625::new(ExampleBus::default(), ExampleLines::default());
    assert!(!restored.lines().irq);
    restored.restore(&snapshot).unwrap();

    assert_eq!(controller.registers(), restored.registers());
    assert_eq!(OperationMode::Normal, restored.operation_mode());
    assert_eq!(snapshot, restored.snapshot());

    // Output lines are recomputed
    assert!(restored.lines().irq);
}

#[test]
fn test_restore_mid_transaction() {
    let mut controller = controller();

    // READ RX BUFFER 1 interrupted
    controller.select();
    controller.transfer_byte(0x94);
    controller.transfer_byte(0x00);
    let snapshot = controller.snapshot();
    assert_eq!(1, snapshot.spi_rx_buffer);
    assert_eq!(0x72, snapshot.spi_address);

    let mut restored = MCP25625::new((), ());
    restored.restore(&snapshot).unwrap();
    assert_eq!(snapshot, restored.snapshot());

    // BIT MODIFY interrupted after the address phase
    let mut controller = controller_with_caninte();
    controller.select();
    controller.transfer_byte(0x05);
    controller.transfer_byte(CANINTE);
    let snapshot = controller.snapshot();

    let mut restored = controller_with_caninte();
    restored.restore(&snapshot).unwrap();
    restored.transfer_byte(0x0F);
    restored.transfer_byte(0x00);
    restored.deselect();

    assert_eq!(IRQ_WAKE, read_register(&mut restored, CANINTE));
}

fn controller_with_caninte() -> Controller {
    let mut controller = controller();
    write_register(&mut controller, CANINTE, IRQ_WAKE | 0x0F);
    controller
}

#[test]
fn test_encode_decode() {
    let mut controller = controller();
    accept_all(&mut controller);
    write_register(&mut controller, TXB0CTRL, 0x0B);
    let snapshot = controller.snapshot();

    let mut buffer = BytesMut::new();
    snapshot.encode(&mut buffer);
    assert_eq!(Snapshot::ENCODED_LEN, buffer.len());
    assert_eq!(121, buffer.len());

    assert_eq!(1, buffer[0]);
    // CANSTAT follows the SPI session
    assert_eq!(0x80, buffer[6]);

    let decoded = Snapshot::decode(&mut buffer.freeze()).unwrap();
    assert_eq!(snapshot, decoded);
}

#[test]
fn test_decode_truncated() {
    let mut buffer: Vec<u8> = Vec::new();
    controller().snapshot().encode(&mut buffer);
    buffer.pop();

    assert_eq!(
        SnapshotError::Truncated(Snapshot::ENCODED_LEN - 1),
        Snapshot::decode(&mut buffer.as_slice()).unwrap_err()
    );
}

#[test]
fn test_decode_unsupported_version() {
    let mut buffer = BytesMut::new();
    buffer.put_u8(2);
    buffer.put_slice(&[0x0; Snapshot::ENCODED_LEN - 1]);

    assert_eq!(
        SnapshotError::UnsupportedVersion(2),
        Snapshot::decode(&mut buffer.freeze()).unwrap_err()
    );
}

#[test]
fn test_restore_invalid_snapshot() {
    let mut controller = controller();
    let valid = controller.snapshot();

    let snapshot = Snapshot {
        spi_state: 10,
        ..valid.clone()
    };
    assert_eq!(SnapshotError::InvalidSpiState(10), controller.restore(&snapshot).unwrap_err());

    let snapshot = Snapshot {
        spi_rx_buffer: 2,
        ..valid.clone()
    };
    assert_eq!(SnapshotError::InvalidRxBuffer(2), controller.restore(&snapshot).unwrap_err());

    let snapshot = Snapshot {
        canstat: 0xA0,
        ..valid.clone()
    };
    assert_eq!(SnapshotError::InvalidMode(0xA0), controller.restore(&snapshot).unwrap_err());

    let snapshot = Snapshot {
        canctrl: 0xE7,
        ..valid.clone()
    };
    assert_eq!(SnapshotError::InvalidMode(0xE7), controller.restore(&snapshot).unwrap_err());

    // Failed restores leave the state untouched
    assert_eq!(valid, controller.snapshot());
}
