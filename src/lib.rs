pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod partonomy;
pub mod utils;
