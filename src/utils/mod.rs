pub mod content_extraction;
pub mod model_normalization;

pub use content_extraction::*;
pub use model_normalization::*;
