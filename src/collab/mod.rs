pub mod calendar;
pub mod openai;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::Reminder;

/// Creates follow-up entries in an external calendar.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn create(&self, reminder: &Reminder) -> Result<()>;
}

/// Produces free-text insight notes for a contact from two profile URLs.
/// `Ok(None)` means the provider answered with no text.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn generate(&self, profile_url_a: &str, profile_url_b: &str) -> Result<Option<String>>;
}
