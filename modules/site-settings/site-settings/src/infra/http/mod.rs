pub mod client;
pub mod dto;
pub mod error;

#[cfg(test)]
mod dto_test;

pub use client::HttpSettingsStore;
pub use error::HttpStoreError;
