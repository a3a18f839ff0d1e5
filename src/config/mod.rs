pub mod app;
pub mod lines;
pub mod window;

pub use app::{ConfigStore, Settings};
