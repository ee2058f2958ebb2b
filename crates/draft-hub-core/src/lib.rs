// Library root: re-exports all modules so the CLI and integration tests
// can access the crate's public API.

pub mod age;
pub mod board;
pub mod config;
pub mod dataset;
pub mod game_log;
pub mod player;
pub mod profile;
pub mod ranking;
pub mod report;
pub mod season;
