use jiff::Timestamp;

use super::activity::{ActivityWindow, user_agent_family};
use super::error::{DecodeError, Error, Result};
use super::models::{User, UsersPage};
use super::{CollectionTarget, bool_gauge, decode_entities};
use crate::client::Fetch;
use crate::metrics::{Gauge, MetricSink};
use crate::session::Credential;

/// Position in the paginated user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PageCursor {
    page_size: usize,
    offset: usize,
}

impl PageCursor {
    pub(super) fn new(page_size: usize) -> Self {
        Self {
            page_size,
            offset: 0,
        }
    }

    pub(super) fn path(&self) -> String {
        format!(
            "{}?limit={}&offset={}",
            CollectionTarget::UsersStats.path(),
            self.page_size,
            self.offset
        )
    }

    /// Moves past a page holding `fetched` users; `false` once the listing is exhausted.
    pub(super) fn advance(&mut self, fetched: usize) -> bool {
        if fetched < self.page_size {
            return false;
        }
        self.offset += self.page_size;
        true
    }
}

/// One users collection run, walking the listing page by page.
pub(super) struct UsersPager<'a, F> {
    pub(super) fetcher: &'a F,
    pub(super) credential: &'a Credential,
    pub(super) sink: &'a dyn MetricSink,
    pub(super) activity: &'a ActivityWindow,
    pub(super) now: Timestamp,
}

impl<F: Fetch> UsersPager<'_, F> {
    /// Requests pages strictly in sequence until one comes back short.
    ///
    /// Returns the number of users written. A failing page ends the run;
    /// users of earlier pages keep the values just written.
    pub(super) async fn collect(&self, page_size: usize) -> Result<usize> {
        let mut cursor = PageCursor::new(page_size);
        let mut written = 0;
        loop {
            let path = cursor.path();
            log::trace!("Fetching users page `{path}`");
            let body = self.fetcher.fetch(&path, self.credential).await?;
            let page: UsersPage = serde_json::from_slice(&body).map_err(|err| Error::Decode {
                target: CollectionTarget::UsersStats,
                source: DecodeError::Json(err),
            })?;

            let fetched = page.users.len();
            for user in decode_entities::<User>(page.users, "user") {
                self.record(&user);
                written += 1;
            }
            if !cursor.advance(fetched) {
                return Ok(written);
            }
        }
    }

    fn record(&self, user: &User) {
        let note = user.note.as_deref().unwrap_or("");
        let status = user.status.as_deref().unwrap_or("");
        let strategy = user.data_limit_reset_strategy.as_deref().unwrap_or("");
        let agent = user_agent_family(user.sub_last_user_agent.as_deref());

        let online = self.activity.is_online(self.now, user.online_at.as_deref());
        self.sink.set_gauge(
            Gauge::UserOnline,
            &[note, &user.username, status, agent],
            bool_gauge(online),
        );

        let labels = [strategy, note, &user.username, status, agent];
        self.sink
            .set_gauge(Gauge::UserDataLimit, &labels, user.data_limit.unwrap_or(0.0));
        self.sink.set_gauge(
            Gauge::UserUsedTraffic,
            &labels,
            user.used_traffic.unwrap_or(0.0),
        );
        self.sink.set_gauge(
            Gauge::UserLifetimeUsedTraffic,
            &labels,
            user.lifetime_used_traffic.unwrap_or(0.0),
        );
        if let Some(expire) = user.expire {
            self.sink
                .set_gauge(Gauge::UserExpirationDate, &labels, expire);
        }
    }
}
