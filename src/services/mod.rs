pub mod bridge;
pub mod credentials;
pub mod gemini;
pub mod generation;
pub mod streaming;
pub mod validation;

pub use bridge::*;
pub use credentials::*;
pub use gemini::*;
pub use generation::*;
pub use streaming::*;
pub use validation::*;
