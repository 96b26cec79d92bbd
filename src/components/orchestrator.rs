use super::digest::{merge_events, render_digest};
use super::digest_cache::DigestCache;
use super::google_calendar::{CalendarFetcher, CalendarProvider, GoogleCalendarProvider, TokenManager};
use crate::config::Config;
use crate::error::DigestResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

/// Runs one digest invocation: cache lookup, then fetch, merge, render and store on a miss
pub struct Orchestrator {
    config: Config,
    tz: Tz,
    cache: DigestCache,
}

impl Orchestrator {
    pub fn new(config: Config) -> DigestResult<Self> {
        let tz = config.tz()?;
        let cache = DigestCache::new(config.cache_dir());
        Ok(Self { config, tz, cache })
    }

    pub fn cache(&self) -> &DigestCache {
        &self.cache
    }

    /// Produce the digest for the current wall-clock time
    pub async fn run(&self) -> DigestResult<String> {
        self.run_at(Utc::now()).await
    }

    /// Produce the digest as of `now`, authenticating against Google on a cache miss
    pub async fn run_at(&self, now: DateTime<Utc>) -> DigestResult<String> {
        let local_now = now.with_timezone(&self.tz);
        if let Some(digest) = self.cached(&local_now) {
            return Ok(digest);
        }

        let provider = self.connect(now).await?;
        Ok(self.refresh_digest(&provider, &local_now).await)
    }

    /// Produce the digest as of `now` using an already authenticated provider
    pub async fn run_with_provider(
        &self,
        provider: &dyn CalendarProvider,
        now: DateTime<Utc>,
    ) -> String {
        let local_now = now.with_timezone(&self.tz);
        if let Some(digest) = self.cached(&local_now) {
            return digest;
        }
        self.refresh_digest(provider, &local_now).await
    }

    fn cached(&self, now: &DateTime<Tz>) -> Option<String> {
        let digest = self.cache.read(now)?;
        info!(
            "Using cached digest for bucket {}",
            DigestCache::bucket_key(now)
        );
        Some(digest)
    }

    /// Refresh the OAuth token once and build the authenticated provider
    async fn connect(&self, now: DateTime<Utc>) -> DigestResult<GoogleCalendarProvider> {
        let timeout = self.config.request_timeout();
        let token_manager = TokenManager::new(self.config.client.clone(), timeout)?;
        let token = token_manager.ensure_fresh(&self.config.token, now).await?;

        GoogleCalendarProvider::new(&self.config.api_base_url, token.access_token, timeout)
    }

    async fn refresh_digest(&self, provider: &dyn CalendarProvider, now: &DateTime<Tz>) -> String {
        let per_source = CalendarFetcher::new(provider)
            .fetch(&self.config.calendar.ids, now)
            .await;
        let events = merge_events(per_source, self.tz);
        info!("Rendering digest with {} event(s)", events.len());

        let digest = render_digest(&events, now);
        if let Err(e) = self.cache.write(now, &digest) {
            warn!("Failed to cache digest: {}", e);
        }
        digest
    }
}
