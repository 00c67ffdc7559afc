pub mod chart;
pub mod choropleth;
pub mod labels;
pub mod legend;
pub mod summary;
pub mod symbology;
pub mod ticks;

pub use chart::*;
pub use choropleth::*;
pub use legend::*;
pub use summary::*;
pub use symbology::*;

#[cfg(test)]
pub(crate) mod fixtures;
