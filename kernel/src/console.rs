//! Best-effort diagnostic console.
//!
//! Nothing is printed until a board registers a sink with [`register_console`]. Output issued
//! before that, or after a sink reports an error, is dropped: the prekernel must be able to print
//! right before halting without any further failure path.

use crate::synchronization::Spinlock;
use core::fmt;
use spin::once::Once;

pub mod interface {
    use core::fmt;

    /// Console write functions.
    pub trait Write {
        fn write_fmt(&self, args: fmt::Arguments) -> fmt::Result;
    }
}

pub struct Console<T>
where
    T: fmt::Write,
{
    io: Spinlock<T>,
}

impl<T> Console<T>
where
    T: fmt::Write,
{
    pub const fn new(inner: T) -> Self {
        Self {
            io: Spinlock::new(inner),
        }
    }

    pub fn into_inner(self) -> T {
        self.io.into_inner()
    }
}

impl<T> interface::Write for Console<T>
where
    T: fmt::Write + Send,
{
    fn write_fmt(&self, args: fmt::Arguments) -> fmt::Result {
        write!(self.io.lock(), "{}", args)
    }
}

static CONSOLE: Once<&'static (dyn interface::Write + Sync)> = Once::new();

/// Install the diagnostic sink. Only the first registration takes effect.
pub fn register_console(console: &'static (dyn interface::Write + Sync)) {
    CONSOLE.call_once(|| console);
}

pub fn console() -> Option<&'static (dyn interface::Write + Sync)> {
    CONSOLE.get().copied()
}
