use crate::chip::CanBus;
use crate::frame::CanFrame;
use crate::irq::Lines;
use embedded_hal::digital::v2::OutputPin;
use mockall::mock;

mock! {
    pub Bus {}

    impl CanBus for Bus {
        fn send(&mut self, frame: &CanFrame);
    }
}

mock! {
    pub Pins {}

    impl Lines for Pins {
        fn set_irq(&mut self, level: bool);
        fn set_rx_buffer_full(&mut self, buffer: usize, level: bool);
    }
}

mock! {
    pub Pin {}

    impl OutputPin for Pin {
        type Error = u32;

        fn set_low(&mut self) -> Result<(), u32>;
        fn set_high(&mut self) -> Result<(), u32>;
    }
}
