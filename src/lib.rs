pub mod bookmarks;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod grocery;
pub mod history;
pub mod logging;
pub mod models;
pub mod search;
pub mod session;
pub mod state;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
