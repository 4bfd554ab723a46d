pub mod descriptive;
pub mod distribution;
pub mod engine;

pub use descriptive::*;
pub use distribution::*;
pub use engine::*;
