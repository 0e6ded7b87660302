pub mod bench;
pub mod config;
pub mod plot;
pub mod util;

pub use plot::{generate, generate_with};
