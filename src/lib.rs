//! Quiz engine for the Arabic course exercises, plus the question bank loader
//! and configuration shared with the Telegram host in `main.rs`.

pub mod bank;
pub mod config;
pub mod quiz;
