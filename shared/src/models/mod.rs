//! Domain models for the SOILY platform

mod analysis;
mod boundary;
mod farmer;
mod soil;

pub use analysis::*;
pub use boundary::*;
pub use farmer::*;
pub use soil::*;
