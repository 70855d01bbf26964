use crate::console;
use core::fmt;

pub fn _print(args: fmt::Arguments) {
    if let Some(c) = console::console() {
        let _ = c.write_fmt(args);
    }
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::print::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print::_print(format_args!("\n")));
    ($($arg:tt)*) => ({
        $crate::print::_print(format_args!("{}\n", format_args!($($arg)*)));
    })
}

#[macro_export]
macro_rules! println_1 {
    () => ($crate::print::_print(format_args!("\n")));
    ($($arg:tt)*) => ({
        $crate::print::_print(format_args!("     {}\n",format_args!($($arg)*)));
    })
}
