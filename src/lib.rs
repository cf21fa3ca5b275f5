pub mod cli;
pub mod client;
pub mod config;
pub mod models;
pub mod presenter;
pub mod session;
pub mod transform;
pub mod ui;

pub use client::{AdminApi, AdminClient, ClientError, ErrorClass};
pub use config::Config;
pub use session::Session;
