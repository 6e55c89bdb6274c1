//! Thin reqwest wrapper shared by the API client and the refresh transport.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
