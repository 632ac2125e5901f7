pub mod abort;
pub mod config;
pub mod predict;
