pub mod app;
pub mod chat;
pub mod cli;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
