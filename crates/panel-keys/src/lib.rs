pub mod client;

pub use client::KeyServiceClient;
