pub mod softmax;

pub use softmax::{softmax_in_place, softmax_rows};
