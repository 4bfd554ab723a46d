pub mod analyze;
pub mod health;
pub mod hypothesis;
