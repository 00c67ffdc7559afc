pub mod geography;
pub mod geojson;
pub mod grid_csv;
pub mod topojson;

pub use geography::*;
pub use grid_csv::*;
