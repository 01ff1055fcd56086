// ABOUTME: Per-connection banner hand-off between the auth and banner callbacks.
// ABOUTME: Sharded concurrent map; each entry is read at most once.

use dashmap::DashMap;

/// Pending welcome banners keyed by the host's connection identity.
///
/// A banner is stored during public-key auth and removed when the host asks
/// for it. Entries whose banner is never requested stay until the process
/// exits.
#[derive(Debug, Default)]
pub struct BannerStore {
    pending: DashMap<String, String>,
}

impl BannerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a banner for a connection, replacing any earlier one.
    pub fn put(&self, conn_id: impl Into<String>, banner: impl Into<String>) {
        self.pending.insert(conn_id.into(), banner.into());
    }

    /// Remove and return the banner for a connection, if any.
    pub fn take_and_clear(&self, conn_id: &str) -> Option<String> {
        self.pending.remove(conn_id).map(|(_, banner)| banner)
    }

    /// Number of banners still waiting to be delivered.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
