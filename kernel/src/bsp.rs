//! Conditional reexporting of Board Support Packages.

mod device_driver;

mod raspberrypi;

pub use raspberrypi::*;
