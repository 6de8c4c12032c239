// src/display/drivers/mod.rs
//! Concrete display backends.

pub mod mock;
#[cfg(feature = "x11")]
pub mod x11;

pub use mock::MockBackend;
#[cfg(feature = "x11")]
pub use self::x11::XlibBackend;
