//! Per-host cookie sessions
//!
//! A [`SessionContext`] is owned by one batch. Concurrent fetchers for the
//! same host share it, and acquisition is serialized per host so only one
//! warm-up request runs at a time. Reading the held state never waits on a
//! warm-up in progress.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use crate::utils::error::FetchError;

/// Cookies and referer collected by a warm-up visit
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Value for the `Cookie` header, `name=value` pairs joined by `; `
    pub cookie_header: String,
    /// Page the cookies were obtained from, sent as referer
    pub landing_page: String,
}

impl SessionState {
    pub fn new(cookie_header: impl Into<String>, landing_page: impl Into<String>) -> Self {
        Self {
            cookie_header: cookie_header.into(),
            landing_page: landing_page.into(),
        }
    }

    /// Build the cookie header from `Set-Cookie` pairs
    pub fn from_cookies<'a>(
        cookies: impl IntoIterator<Item = (&'a str, &'a str)>,
        landing_page: impl Into<String>,
    ) -> Self {
        let cookie_header = cookies
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(cookie_header, landing_page)
    }

    pub fn has_cookies(&self) -> bool {
        !self.cookie_header.is_empty()
    }
}

#[derive(Debug, Default)]
struct HostSlot {
    /// Held for the duration of a warm-up
    warmup: tokio::sync::Mutex<()>,
    state: RwLock<Option<SessionState>>,
}

impl HostSlot {
    fn read(&self) -> Option<SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn write(&self, state: Option<SessionState>) -> Option<SessionState> {
        let mut held = self.state.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *held, state)
    }
}

/// Shared session state for one batch, keyed by host
#[derive(Debug, Default)]
pub struct SessionContext {
    hosts: Mutex<HashMap<String, Arc<HostSlot>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, host: &str) -> Arc<HostSlot> {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts.entry(host.to_string()).or_default().clone()
    }

    /// Snapshot of the session held for `host`, without acquiring one
    pub fn get(&self, host: &str) -> Option<SessionState> {
        self.slot(host).read()
    }

    /// Session for `host`, running `acquire` if none is held
    ///
    /// Concurrent callers wait for the first warm-up and then reuse its
    /// result.
    pub async fn get_or_acquire<F, Fut>(
        &self,
        host: &str,
        acquire: F,
    ) -> Result<SessionState, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SessionState, FetchError>>,
    {
        let slot = self.slot(host);
        if let Some(state) = slot.read() {
            return Ok(state);
        }

        let _warming = slot.warmup.lock().await;
        if let Some(state) = slot.read() {
            return Ok(state);
        }

        let state = acquire().await?;
        debug!(host, cookies = state.has_cookies(), "Session acquired");
        slot.write(Some(state.clone()));
        Ok(state)
    }

    /// Drop the session held for `host`
    pub fn reset(&self, host: &str) {
        if self.slot(host).write(None).is_some() {
            debug!(host, "Session reset");
        }
    }

    /// Number of hosts with a held session
    pub fn active_sessions(&self) -> usize {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts.values().filter(|slot| slot.read().is_some()).count()
    }
}
