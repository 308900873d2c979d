use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use common::account::Account;
use common::driver::RawListing;

#[derive(Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    account: String,
    path: String,
}

struct CacheEntry {
    value: RawListing,
    expires_at: Instant,
}

/// TTL cache of raw backend listings, keyed by (account name, normalized
/// virtual path).
///
/// Values are backend-native listings, opaque here; classification into
/// entities happens on every read. Entries are only ever derived from
/// successful listing calls — the resolution engine never caches errors.
/// Same-key reads and writes are linearizable through the map lock; the
/// cache does not deduplicate concurrent miss fetches, that is the
/// resolver's job.
pub struct DirCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    expiration: Duration,
}

impl DirCache {
    pub fn new(expiration: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiration,
        }
    }

    fn key(path: &str, account: &Account) -> CacheKey {
        CacheKey {
            account: account.name.clone(),
            path: path.to_string(),
        }
    }

    /// Returns the cached listing if present and unexpired. Expired entries
    /// are dropped on the way out.
    pub fn get(&self, path: &str, account: &Account) -> Option<RawListing> {
        let key = Self::key(path, account);
        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Lazy expiry; re-check under the write lock in case of a racing set.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
            entries.remove(&key);
        }
        None
    }

    /// Insert a listing with a fresh deadline, overwriting any prior entry
    /// for the key.
    pub fn set(&self, path: &str, account: &Account, value: RawListing) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.expiration,
        };
        self.entries.write().insert(Self::key(path, account), entry);
        tracing::debug!(account = %account.name, path, "cached directory listing");
    }

    /// Remove the entry for this exact key. Subtree invalidation is done by
    /// invalidating each ancestor directory individually; only directory
    /// listings are cached, never leaf files.
    pub fn invalidate(&self, path: &str, account: &Account) {
        if self.entries.write().remove(&Self::key(path, account)).is_some() {
            tracing::debug!(account = %account.name, path, "invalidated cached listing");
        }
    }

    /// Drop every listing cached under an account, used when the account is
    /// replaced or deleted.
    pub fn invalidate_account(&self, account_name: &str) {
        self.entries
            .write()
            .retain(|key, _| key.account != account_name);
    }

    /// Drop all entries past their deadline.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "swept expired cache entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Run the periodic TTL sweep until the shutdown signal fires, bounding
    /// memory for trees nobody is reading anymore.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => cache.purge_expired(),
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("cache sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::account::{SortBy, SortDirection};

    fn account(name: &str) -> Account {
        Account {
            name: name.into(),
            driver: "test".into(),
            username: String::new(),
            password: String::new(),
            root_folder: "/".into(),
            status: "work".into(),
            drive_id: String::new(),
            proxy: false,
            sort_by: SortBy::default(),
            sort_direction: SortDirection::default(),
            updated_at: None,
        }
    }

    fn listing(names: &[&str]) -> RawListing {
        Arc::new(names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn set_then_get_same_key() {
        let cache = DirCache::new(Duration::from_secs(60));
        let acct = account("a");
        assert!(cache.get("/", &acct).is_none());
        cache.set("/", &acct, listing(&["x"]));
        let raw = cache.get("/", &acct).expect("hit");
        let names = raw.downcast_ref::<Vec<String>>().unwrap();
        assert_eq!(names, &["x".to_string()]);
    }

    #[test]
    fn keys_are_scoped_per_account() {
        let cache = DirCache::new(Duration::from_secs(60));
        let a = account("a");
        let b = account("b");
        cache.set("/", &a, listing(&["x"]));
        assert!(cache.get("/", &b).is_none());
        cache.invalidate_account("a");
        assert!(cache.get("/", &a).is_none());
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = DirCache::new(Duration::from_millis(30));
        let acct = account("a");
        cache.set("/", &acct, listing(&["x"]));
        assert!(cache.get("/", &acct).is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("/", &acct).is_none());
    }

    #[tokio::test]
    async fn sweep_purges_expired_entries() {
        let cache = Arc::new(DirCache::new(Duration::from_millis(20)));
        let acct = account("a");
        cache.set("/", &acct, listing(&["x"]));
        cache.set("/sub", &acct, listing(&["y"]));
        assert_eq!(cache.len(), 2);

        let (tx, rx) = watch::channel(());
        let handle = cache.spawn_sweeper(Duration::from_millis(25), rx);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.len(), 0);
        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn invalidate_is_exact_key() {
        let cache = DirCache::new(Duration::from_secs(60));
        let acct = account("a");
        cache.set("/", &acct, listing(&["x"]));
        cache.set("/sub", &acct, listing(&["y"]));
        cache.invalidate("/sub", &acct);
        assert!(cache.get("/", &acct).is_some());
        assert!(cache.get("/sub", &acct).is_none());
    }
}
