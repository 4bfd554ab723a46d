pub mod request;
pub mod result;
pub mod wire;

pub use request::*;
pub use result::*;
pub use wire::*;
