mod pl011_uart;

pub use pl011_uart::*;
