use crate::address::{resolve, Register};
use crate::registers::RegisterFile;

#[test]
fn test_resolve_status_mirrors() {
    for row in 0..8u8 {
        let canstat = resolve(row << 4 | 0xE).unwrap();
        assert_eq!(Register::CanStat, canstat.register);
        assert_eq!(0x00, canstat.write_mask);
        assert!(!canstat.bit_modifiable);

        let canctrl = resolve(row << 4 | 0xF).unwrap();
        assert_eq!(Register::CanCtrl, canctrl.register);
        assert_eq!(0xFF, canctrl.write_mask);
        assert!(canctrl.bit_modifiable);
        assert!(!canctrl.config_only_read);
    }
}

#[test]
fn test_resolve_filters() {
    let decoded = resolve(0x00).unwrap();
    assert_eq!(Register::Filter { index: 0, offset: 0 }, decoded.register);
    assert_eq!(0xFF, decoded.write_mask);
    assert!(decoded.config_only_read);
    assert!(!decoded.bit_modifiable);

    let decoded = resolve(0x09).unwrap();
    assert_eq!(Register::Filter { index: 2, offset: 1 }, decoded.register);
    assert_eq!(0xEB, decoded.write_mask);

    let decoded = resolve(0x13).unwrap();
    assert_eq!(Register::Filter { index: 3, offset: 3 }, decoded.register);
    assert_eq!(0xFF, decoded.write_mask);

    let decoded = resolve(0x1B).unwrap();
    assert_eq!(Register::Filter { index: 5, offset: 3 }, decoded.register);
    assert!(decoded.config_only_read);
}

#[test]
fn test_resolve_masks() {
    let decoded = resolve(0x21).unwrap();
    assert_eq!(Register::Mask { index: 0, offset: 1 }, decoded.register);
    assert_eq!(0xE3, decoded.write_mask);
    assert!(decoded.config_only_read);

    let decoded = resolve(0x27).unwrap();
    assert_eq!(Register::Mask { index: 1, offset: 3 }, decoded.register);
    assert_eq!(0xFF, decoded.write_mask);
}

#[test]
fn test_resolve_control_registers() {
    let decoded = resolve(0x0C).unwrap();
    assert_eq!(Register::BfpCtrl, decoded.register);
    assert_eq!(0x3F, decoded.write_mask);
    assert!(decoded.bit_modifiable);
    assert!(!decoded.config_only_read);

    let decoded = resolve(0x0D).unwrap();
    assert_eq!(Register::TxRtsCtrl, decoded.register);
    assert_eq!(0x07, decoded.write_mask);
    assert!(decoded.config_only_read);

    assert_eq!(Register::Tec, resolve(0x1C).unwrap().register);
    assert_eq!(0x00, resolve(0x1C).unwrap().write_mask);
    assert_eq!(Register::Rec, resolve(0x1D).unwrap().register);
    assert_eq!(0x00, resolve(0x1D).unwrap().write_mask);

    let decoded = resolve(0x28).unwrap();
    assert_eq!(Register::Cnf(3), decoded.register);
    assert_eq!(0xC7, decoded.write_mask);
    assert!(decoded.config_only_read);
    assert!(decoded.bit_modifiable);

    assert_eq!(Register::Cnf(2), resolve(0x29).unwrap().register);
    assert_eq!(Register::Cnf(1), resolve(0x2A).unwrap().register);
    assert_eq!(0xFF, resolve(0x2A).unwrap().write_mask);

    assert_eq!(Register::CanIntE, resolve(0x2B).unwrap().register);
    assert_eq!(Register::CanIntF, resolve(0x2C).unwrap().register);
    assert!(resolve(0x2C).unwrap().bit_modifiable);

    let decoded = resolve(0x2D).unwrap();
    assert_eq!(Register::Eflg, decoded.register);
    assert_eq!(0xC0, decoded.write_mask);
    assert!(decoded.bit_modifiable);
}

#[test]
fn test_resolve_tx_buffers() {
    let decoded = resolve(0x30).unwrap();
    assert_eq!(Register::TxBuffer { index: 0, offset: 0 }, decoded.register);
    assert_eq!(0x0B, decoded.write_mask);
    assert!(decoded.bit_modifiable);
    assert!(!decoded.config_only_read);

    let decoded = resolve(0x42).unwrap();
    assert_eq!(Register::TxBuffer { index: 1, offset: 2 }, decoded.register);
    assert_eq!(0xEB, decoded.write_mask);
    assert!(!decoded.bit_modifiable);

    let decoded = resolve(0x55).unwrap();
    assert_eq!(Register::TxBuffer { index: 2, offset: 5 }, decoded.register);
    assert_eq!(0x4F, decoded.write_mask);

    let decoded = resolve(0x5D).unwrap();
    assert_eq!(Register::TxBuffer { index: 2, offset: 13 }, decoded.register);
    assert_eq!(0xFF, decoded.write_mask);
}

#[test]
fn test_resolve_rx_buffers() {
    let decoded = resolve(0x60).unwrap();
    assert_eq!(Register::RxBuffer { index: 0, offset: 0 }, decoded.register);
    assert_eq!(0x64, decoded.write_mask);
    assert!(decoded.bit_modifiable);

    let decoded = resolve(0x70).unwrap();
    assert_eq!(Register::RxBuffer { index: 1, offset: 0 }, decoded.register);
    assert_eq!(0x60, decoded.write_mask);
    assert!(decoded.bit_modifiable);

    for address in 0x61..=0x6D {
        let decoded = resolve(address).unwrap();
        assert_eq!(0x00, decoded.write_mask);
        assert!(!decoded.bit_modifiable);
    }
    assert_eq!(
        Register::RxBuffer { index: 1, offset: 13 },
        resolve(0x7D).unwrap().register
    );
}

#[test]
fn test_resolve_ignores_bit_7() {
    for address in 0..0x80u8 {
        assert_eq!(resolve(address), resolve(address | 0x80));
    }
}

#[test]
#[should_panic(expected = "invalid CNF register 4")]
fn test_register_file_invalid_cnf() {
    RegisterFile::default().get(Register::Cnf(4));
}
