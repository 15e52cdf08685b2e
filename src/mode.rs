//!# Operation modes
//! CANCTRL.REQOP holds the requested mode, CANSTAT.OPMOD the active one. Sleep is
//! only left on a wake-up interrupt. While asleep, REQOP reads back as listen-only,
//! which is the mode entered on wake-up.
use crate::chip::{CanBus, MCP25625};
use crate::irq::Lines;
use crate::registers::RegisterFile;
use crate::status::OperationMode;
use log::debug;

impl<B: CanBus, L: Lines> MCP25625<B, L> {
    /// Resets all registers and enters configuration mode
    pub(crate) fn full_reset(&mut self) {
        debug!("{}: reset", self.config.name);

        // TX/RX buffer contents are undefined after reset, zeroed for simplicity
        self.registers = RegisterFile::default();

        self.last_irq = None;
        self.raise(0);

        self.registers.canstat = self
            .registers
            .canstat()
            .with_opmod(OperationMode::Configuration.bits())
            .into();
        self.registers.canctrl = self.config.clock.as_register() | (OperationMode::Configuration.bits() << 5);
    }

    /// Applies CANCTRL: aborts transmissions, switches mode and sends pending buffers
    pub(crate) fn recompute_mode(&mut self, wakeup_happened: bool) {
        let canctrl = self.registers.canctrl();

        if canctrl.abat() {
            // TXB2 is not covered by ABAT
            for buffer in self.registers.tx_buffers[..2].iter_mut() {
                let ctrl = buffer.ctrl();
                if ctrl.txreq() {
                    buffer.set_ctrl(ctrl.with_txreq(false).with_abtf(true));
                }
            }
        }

        let current = self.registers.canstat().opmod();
        let mut requested = canctrl.reqop();

        if OperationMode::from_bits(requested).is_none() {
            debug!("{}: ignoring invalid mode request {requested:#05b}", self.config.name);
            requested = current;
            self.registers.canctrl = canctrl.with_reqop(current).into();
        }

        if requested != current && (wakeup_happened || current != OperationMode::Sleep.bits()) {
            debug!("{}: mode change {current:#05b} -> {requested:#05b}", self.config.name);
            self.registers.canstat = self.registers.canstat().with_opmod(requested).into();

            let pending = (0..2)
                .filter(|buffer| self.registers.tx_buffers[*buffer].ctrl().txreq())
                .fold(0, |bitmap, buffer| bitmap | (1 << buffer));
            self.request_to_send(pending);
        }

        // CANCTRL.REQOP reads as listen-only while sleeping
        if self.in_mode(OperationMode::Sleep) {
            self.registers.canctrl = self
                .registers
                .canctrl()
                .with_reqop(OperationMode::ListenOnly.bits())
                .into();
        }
    }
}
