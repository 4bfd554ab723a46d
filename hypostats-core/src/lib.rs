pub mod domain;
pub mod error;
pub mod samples;

pub use domain::*;
pub use error::*;
pub use samples::*;
