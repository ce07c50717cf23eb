pub mod color;
pub mod history;
pub mod percentile;

pub use color::distance_color;
pub use history::{AlertPolicy, HistoryTracker};
pub use percentile::distance_from_high;
