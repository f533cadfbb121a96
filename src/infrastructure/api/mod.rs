//! Backend API adapters

mod client;
mod envelope;

pub use client::HttpApiClient;
