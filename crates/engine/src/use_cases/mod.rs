//! Use cases orchestrating domain transitions behind the ports.

pub mod collection;
pub mod progression;
