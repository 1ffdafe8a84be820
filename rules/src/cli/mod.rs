// Local play harness and its output
pub mod config;
pub mod export;
pub mod output;
pub mod play;
