//! Data models for Usher

mod ids;
mod ticket;
mod settings;
mod audit;

pub use ids::*;
pub use ticket::*;
pub use settings::*;
pub use audit::*;
