pub mod client;
pub mod types;

pub use client::{NewsApiClient, NewsApiSettings};
pub use types::NewsArticle;
