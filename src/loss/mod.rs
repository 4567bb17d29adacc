pub mod cross_entropy;
pub mod one_hot;

pub use cross_entropy::{CrossEntropyLoss, Gradients};
pub use one_hot::one_hot;
