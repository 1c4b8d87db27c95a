pub mod client;

pub use client::{FastCgiClient, FastCgiResponse};
