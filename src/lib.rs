pub mod config;
pub mod editor;
pub mod quiz;
pub mod render;
pub mod session;

pub use config::Config;
