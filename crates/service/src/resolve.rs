use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

use common::account::Account;
use common::driver::{Lister, RawListing};
use common::error::DriverError;
use common::file::{sort_entities, FileEntity};
use common::vpath;

use crate::cache::DirCache;

type FlightKey = (String, String);

/// The path resolution engine: turns virtual paths into entities or
/// listings, consulting the directory cache and the owning driver's listing
/// primitives.
///
/// The engine guarantees at most one in-flight backend listing call per
/// (account, path) key; concurrent misses for the same key queue on a flight
/// guard instead of stampeding a rate-limited vendor API. A canceled call
/// (dropped future) never populates the cache, because the insert only
/// happens after the fetch completes; its flight-map entry is removed by the
/// guard's destructor, so abandoned keys do not accumulate.
pub struct Resolver {
    cache: Arc<DirCache>,
    flights: Mutex<HashMap<FlightKey, Arc<tokio::sync::Mutex<()>>>>,
}

/// Membership in the flight map for one key. Dropping it removes the entry
/// once no other caller holds it, whether the fetch finished or the owning
/// future was dropped mid-flight.
struct Flight<'a> {
    resolver: &'a Resolver,
    key: FlightKey,
    guard: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut flights = self.resolver.flights.lock();
        // Two strong refs mean nobody else is waiting: the map's and ours.
        if Arc::strong_count(&self.guard) == 2 {
            flights.remove(&self.key);
        }
    }
}

impl Resolver {
    pub fn new(cache: Arc<DirCache>) -> Self {
        Self {
            cache,
            flights: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<DirCache> {
        &self.cache
    }

    /// List a directory's direct children as classified, sorted entities.
    pub async fn files(
        &self,
        lister: &dyn Lister,
        path: &str,
        account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        let path = vpath::normalize(path);
        self.files_at(lister, path, account).await
    }

    /// Resolve a single virtual path to metadata.
    pub async fn file(
        &self,
        lister: &dyn Lister,
        path: &str,
        account: &Account,
    ) -> Result<FileEntity, DriverError> {
        let path = vpath::normalize(path);
        self.file_at(lister, path, account).await
    }

    fn files_at<'a>(
        &'a self,
        lister: &'a dyn Lister,
        path: String,
        account: &'a Account,
    ) -> BoxFuture<'a, Result<Vec<FileEntity>, DriverError>> {
        async move {
            if let Some(raw) = self.cache.get(&path, account) {
                tracing::debug!(account = %account.name, %path, "listing served from cache");
                return self.classified(lister, &raw, account);
            }

            let flight = self.join_flight((account.name.clone(), path.clone()));
            let _permit = flight.guard.lock().await;

            // A queued waiter may find the listing its predecessor fetched.
            if let Some(raw) = self.cache.get(&path, account) {
                return self.classified(lister, &raw, account);
            }

            self.fetch_listing(lister, &path, account).await
        }
        .boxed()
    }

    async fn fetch_listing(
        &self,
        lister: &dyn Lister,
        path: &str,
        account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        // Resolving the directory entry may itself recurse into the parent
        // listing for id-addressed backends.
        let dir = self.file_at(lister, path.to_string(), account).await?;
        if !dir.is_dir() {
            return Err(DriverError::NotFolder);
        }
        let raw = lister.list_raw(&dir, path, account).await?;
        let entries = self.classified(lister, &raw, account)?;
        // Errors are never cached, and neither are empty results.
        if !entries.is_empty() {
            self.cache.set(path, account, raw);
        }
        Ok(entries)
    }

    fn file_at<'a>(
        &'a self,
        lister: &'a dyn Lister,
        path: String,
        account: &'a Account,
    ) -> BoxFuture<'a, Result<FileEntity, DriverError>> {
        async move {
            if vpath::is_root(&path) {
                return Ok(lister.root_entry(account));
            }
            // Path-addressed backends can look an entry up directly.
            if let Some(found) = lister.stat(&path, account).await? {
                return Ok(found);
            }
            let (parent, leaf) = vpath::split(&path);
            let entries = self.files_at(lister, parent, account).await?;
            // Exact byte-for-byte match; first wins. Duplicate names are a
            // backend data-integrity defect, not ours to resolve.
            entries
                .into_iter()
                .find(|entry| entry.name == leaf)
                .ok_or(DriverError::PathNotFound)
        }
        .boxed()
    }

    fn classified(
        &self,
        lister: &dyn Lister,
        raw: &RawListing,
        account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        let mut entries = lister.classify(raw, account)?;
        if !lister.config().local_sort {
            sort_entities(&mut entries, account.sort_by, account.sort_direction);
        }
        Ok(entries)
    }

    fn join_flight(&self, key: FlightKey) -> Flight<'_> {
        let guard = self.flights.lock().entry(key.clone()).or_default().clone();
        Flight {
            resolver: self,
            key,
            guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use common::account::Account;
    use common::driver::{DriverConfig, Lister, RawListing};
    use common::error::DriverError;
    use common::file::FileEntity;

    use crate::cache::DirCache;
    use crate::testkit::working_account;

    use super::Resolver;

    /// Signals when a listing call starts, then never returns.
    struct StallingLister {
        started: Arc<Notify>,
    }

    #[async_trait]
    impl Lister for StallingLister {
        fn config(&self) -> DriverConfig {
            DriverConfig::named("stall")
        }

        async fn list_raw(
            &self,
            _dir: &FileEntity,
            _path: &str,
            _account: &Account,
        ) -> Result<RawListing, DriverError> {
            self.started.notify_one();
            futures::future::pending().await
        }

        fn classify(
            &self,
            _raw: &RawListing,
            _account: &Account,
        ) -> Result<Vec<FileEntity>, DriverError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn abandoned_listing_clears_its_flight_entry() {
        let cache = Arc::new(DirCache::new(Duration::from_secs(60)));
        let resolver = Arc::new(Resolver::new(cache));
        let started = Arc::new(Notify::new());
        let account = working_account("stall", "stall");

        let task = tokio::spawn({
            let resolver = resolver.clone();
            let started = started.clone();
            let account = account.clone();
            async move {
                let lister = StallingLister { started };
                let _ = resolver.files(&lister, "/", &account).await;
            }
        });

        started.notified().await;
        assert_eq!(resolver.flights.lock().len(), 1);

        task.abort();
        let _ = task.await;

        assert!(resolver.flights.lock().is_empty());
    }
}
