//! Per-site login data held for the lifetime of one run.
//!
//! Owned by the caller and passed by reference; nothing here is persisted.

use std::collections::HashMap;

use teamops_core::{LoginData, SiteId};

/// In-memory map from site to the login data handed out for it.
#[derive(Debug, Default)]
pub struct LoginDataCache {
    entries: HashMap<SiteId, LoginData>,
}

impl LoginDataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Login data previously stored for the site.
    pub fn get(&self, site_id: SiteId) -> Option<&LoginData> {
        self.entries.get(&site_id)
    }

    /// Stores login data for the site, replacing any previous entry.
    pub fn put(&mut self, site_id: SiteId, data: LoginData) {
        self.entries.insert(site_id, data);
    }

    /// Number of cached sites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get_per_site() {
        let mut cache = LoginDataCache::new();
        assert!(cache.is_empty());

        cache.put(1, LoginData::new("bot-one", "pw1"));
        cache.put(2, LoginData::new("bot-two", "pw2"));

        assert_eq!(cache.get(1).map(|d| d.username.as_str()), Some("bot-one"));
        assert_eq!(cache.get(2).map(|d| d.password.as_str()), Some("pw2"));
        assert!(cache.get(3).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_put_replaces() {
        let mut cache = LoginDataCache::new();
        cache.put(1, LoginData::new("bot", "old"));
        cache.put(1, LoginData::new("bot", "new"));

        assert_eq!(cache.get(1).unwrap().password, "new");
        assert_eq!(cache.len(), 1);
    }
}
