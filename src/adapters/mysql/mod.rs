//! MySQL source integration

pub mod client;

pub use client::MySqlExecutor;
