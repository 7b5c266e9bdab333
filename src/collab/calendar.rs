use super::types::Reminder;
use super::Scheduler;
use crate::config::CalendarConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use url::Url;

/// Schedules reminders by rendering a Google Calendar "add event" link and
/// handing it to the system browser.
pub struct CalendarLinkScheduler {
    base_url: String,
    open_browser: bool,
    last_link: Mutex<Option<Url>>,
}

/// UTC instant in the compact form the calendar template expects,
/// e.g. `20260316T093000Z`.
fn compact_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

impl CalendarLinkScheduler {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            open_browser: config.open_browser,
            last_link: Mutex::new(None),
        }
    }

    pub fn opens_browser(&self) -> bool {
        self.open_browser
    }

    /// Link rendered by the most recent `create` call.
    pub fn last_link(&self) -> Option<Url> {
        self.last_link.lock().ok().and_then(|l| l.clone())
    }

    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn render_url(&self, reminder: &Reminder) -> Result<Url> {
        let dates = format!(
            "{}/{}",
            compact_timestamp(reminder.start),
            compact_timestamp(reminder.end)
        );
        Url::parse_with_params(
            &self.base_url,
            &[
                ("action", "TEMPLATE"),
                ("text", reminder.title.as_str()),
                ("details", reminder.description.as_str()),
                ("dates", dates.as_str()),
            ],
        )
        .with_context(|| format!("invalid calendar base url: {}", self.base_url))
    }
}

#[async_trait]
impl Scheduler for CalendarLinkScheduler {
    async fn create(&self, reminder: &Reminder) -> Result<()> {
        let url = self.render_url(reminder)?;
        if let Ok(mut last) = self.last_link.lock() {
            *last = Some(url.clone());
        }

        if !self.open_browser {
            tracing::info!(title = %reminder.title, url = %url, "calendar link (browser disabled)");
            return Ok(());
        }

        let link = url.to_string();
        tokio::task::spawn_blocking(move || open::that(&link))
            .await
            .context("calendar opener task panicked")?
            .context("failed to open calendar link in browser")?;

        tracing::info!(title = %reminder.title, "calendar link opened");
        Ok(())
    }
}
