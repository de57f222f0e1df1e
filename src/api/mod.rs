mod client;
mod models;

pub use client::{ApiError, ProviderClient, Result};
pub use models::{ProviderConfig, StreamFormat, VideoMetadata};
