pub mod cell;
pub mod dataset;
pub mod geography;
pub mod selection;
pub mod spatial;

pub use cell::*;
pub use dataset::*;
pub use geography::*;
pub use selection::*;
