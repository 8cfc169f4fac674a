pub mod handlers;
pub mod operations;
