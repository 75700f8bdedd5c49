use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::{Mutex, RwLock};

use super::{Credential, Result};

/// Performs one login exchange against the panel.
pub trait Authenticator: Send + Sync {
    fn login(&self) -> impl Future<Output = Result<Credential>> + Send;
}

/// Single-slot credential cache shared by all collectors.
///
/// Fresh credentials are served under a read lock. Refreshing takes the
/// `refresh` lock and re-checks the slot first, so callers racing past an
/// expired credential share one login.
#[derive(Debug)]
pub struct SessionCache<A> {
    authenticator: A,
    slot: RwLock<Option<Arc<Credential>>>,
    refresh: Mutex<()>,
}

impl<A: Authenticator> SessionCache<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Returns the cached credential, logging in first if it is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`](super::AuthError) of the login; the cached
    /// slot is left untouched in that case.
    pub async fn credential(&self) -> Result<Arc<Credential>> {
        if let Some(credential) = self.fresh(Timestamp::now()).await {
            return Ok(credential);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(credential) = self.fresh(Timestamp::now()).await {
            return Ok(credential);
        }

        log::debug!("Logging in to panel");
        let credential = Arc::new(self.authenticator.login().await?);
        log::info!(
            "Obtained panel credential valid until {}",
            credential.expires_at()
        );
        *self.slot.write().await = Some(Arc::clone(&credential));
        Ok(credential)
    }

    /// Drops `stale` from the cache unless it has already been replaced.
    pub async fn invalidate(&self, stale: &Arc<Credential>) {
        let mut slot = self.slot.write().await;
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, stale)) {
            log::warn!("Panel rejected the cached credential, forcing a new login");
            *slot = None;
        }
    }

    async fn fresh(&self, now: Timestamp) -> Option<Arc<Credential>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|credential| credential.is_fresh_at(now))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use jiff::SignedDuration;

    use super::super::{AuthError, Secret};
    use super::*;

    struct FakeAuthenticator {
        logins: AtomicUsize,
        lifetime: SignedDuration,
        fail: bool,
        delay: Duration,
    }

    impl FakeAuthenticator {
        fn new(lifetime: SignedDuration) -> Self {
            Self {
                logins: AtomicUsize::new(0),
                lifetime,
                fail: false,
                delay: Duration::from_millis(50),
            }
        }

        fn logins(&self) -> usize {
            self.logins.load(Ordering::SeqCst)
        }
    }

    impl Authenticator for FakeAuthenticator {
        async fn login(&self) -> Result<Credential> {
            let n = self.logins.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(AuthError::Rejected("wrong password".into()));
            }
            Ok(Credential::new(
                Secret::Bearer(format!("token-{n}")),
                Timestamp::now() + self.lifetime,
            ))
        }
    }

    #[tokio::test]
    async fn test_reuses_fresh_credential() {
        let cache = SessionCache::new(FakeAuthenticator::new(SignedDuration::from_hours(1)));
        let first = cache.credential().await.unwrap();
        let second = cache.credential().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.authenticator.logins(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_login() {
        let cache = Arc::new(SessionCache::new(FakeAuthenticator::new(
            SignedDuration::from_hours(1),
        )));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.credential().await.unwrap() })
            })
            .collect();
        let mut secrets = Vec::new();
        for handle in handles {
            secrets.push(handle.await.unwrap().secret().clone());
        }

        assert_eq!(cache.authenticator.logins(), 1);
        assert!(secrets.iter().all(|s| *s == Secret::Bearer("token-0".into())));
    }

    #[tokio::test]
    async fn test_expired_credential_is_replaced() {
        let cache = SessionCache::new(FakeAuthenticator::new(SignedDuration::from_secs(-1)));
        let first = cache.credential().await.unwrap();
        let second = cache.credential().await.unwrap();
        assert_ne!(first.secret(), second.secret());
        assert_eq!(cache.authenticator.logins(), 2);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_cache_empty() {
        let mut authenticator = FakeAuthenticator::new(SignedDuration::from_hours(1));
        authenticator.fail = true;
        let cache = SessionCache::new(authenticator);

        let err = cache.credential().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(msg) if msg == "wrong password"));
        assert!(cache.slot.read().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_only_drops_matching_credential() {
        let cache = SessionCache::new(FakeAuthenticator::new(SignedDuration::from_hours(1)));
        let first = cache.credential().await.unwrap();
        cache.invalidate(&first).await;
        let second = cache.credential().await.unwrap();
        assert_eq!(cache.authenticator.logins(), 2);

        // A late invalidation of the old credential keeps the new one.
        cache.invalidate(&first).await;
        let third = cache.credential().await.unwrap();
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!(cache.authenticator.logins(), 2);
    }
}
