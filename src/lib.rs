pub mod api;
pub mod core;
pub mod flow;
pub mod summary;
