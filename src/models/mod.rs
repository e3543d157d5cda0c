pub mod app;
pub mod chat;
pub mod gemini;

pub use app::*;
pub use chat::*;
pub use gemini::*;
