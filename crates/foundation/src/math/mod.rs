pub mod geo;
pub mod polygon;
pub mod precision;
pub mod projection;

pub use geo::*;
pub use polygon::*;
pub use precision::*;
pub use projection::*;
