//! HTTP request handlers.

pub mod common;
pub mod files;
pub mod latest;
pub mod service;

pub use files::get_file;
pub use latest::get_latest;
pub use service::{home, ping};
