//! Infrastructure: ports and their concrete adapters.

pub mod clock;
pub mod memory;
pub mod ports;
pub mod qr;
pub mod settings;
