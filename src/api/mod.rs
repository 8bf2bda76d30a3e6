//! Backend API: wire types, HTTP client and the remote filter port

mod client;
pub mod dto;
mod error;
mod filter;

pub use client::SchoolClient;
pub use error::ApiError;
pub use filter::RemoteFilter;
