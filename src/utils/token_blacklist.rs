//! Revoked-token store with time-bounded entries.
//!
//! Logout and token rotation revoke a token by its `jti`. Entries expire
//! after a fixed retention window (at least the access-token lifetime),
//! after which the token would be rejected by signature expiry anyway.
//! The store lives in `AppState`, not in a process-wide global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct TokenBlacklist {
    entries: Arc<Mutex<HashMap<String, Instant>>>,
    retention: Duration,
}

impl TokenBlacklist {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            retention,
        }
    }

    /// Marks a token id as revoked until the retention window elapses.
    pub fn revoke(&self, jti: &str) {
        let expires_at = Instant::now() + self.retention;
        let mut entries = self.entries.lock().expect("token blacklist lock poisoned");
        entries.insert(jti.to_string(), expires_at);
        // Opportunistic cleanup keeps the map bounded by active revocations.
        let now = Instant::now();
        entries.retain(|_, expiry| *expiry > now);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        let entries = self.entries.lock().expect("token blacklist lock poisoned");
        match entries.get(jti) {
            Some(expiry) => *expiry > Instant::now(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoked_token_is_rejected() {
        let blacklist = TokenBlacklist::new(Duration::from_secs(60));
        blacklist.revoke("abc123");
        assert!(blacklist.is_revoked("abc123"));
        assert!(!blacklist.is_revoked("other"));
    }

    #[test]
    fn test_entry_expires_after_retention() {
        let blacklist = TokenBlacklist::new(Duration::ZERO);
        blacklist.revoke("ephemeral");
        assert!(!blacklist.is_revoked("ephemeral"));
    }

    #[test]
    fn test_expired_entries_are_purged_on_revoke() {
        let blacklist = TokenBlacklist::new(Duration::ZERO);
        blacklist.revoke("first");
        blacklist.revoke("second");
        let entries = blacklist.entries.lock().unwrap();
        assert!(entries.len() <= 1);
    }
}
