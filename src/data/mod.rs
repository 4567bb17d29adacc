pub mod csv;
pub mod export;
pub mod toy;

pub use csv::{load_dataset, load_features, parse_dataset, parse_features, Dataset};
pub use export::{write_loss_csv, write_points_csv};
