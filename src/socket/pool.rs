use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use url::Url;

/// Something that can sit in the idle pool.
pub trait Poolable: Send + 'static {
    /// False once the connection can no longer carry a request.
    fn is_open(&self) -> bool;
}

/// Identifies a connection group (scheme, host, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupId {
    scheme: String,
    host: String,
    port: u16,
}

impl GroupId {
    fn from_url(url: &Url) -> Option<Self> {
        Some(GroupId {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_string(),
            port: url.port_or_known_default()?,
        })
    }
}

/// Idle entry with the time it was returned to the pool.
struct Idle<T> {
    conn: T,
    since: Instant,
}

/// Idle-connection pool with a global cap and an idle expiry.
///
/// When the cap is reached, checking in a connection evicts the oldest idle
/// connection across all groups.
pub struct IdlePool<T> {
    max_idle: usize,
    idle_timeout: Duration,
    groups: DashMap<GroupId, VecDeque<Idle<T>>>,
    idle_count: AtomicUsize,
}

impl<T> std::fmt::Debug for IdlePool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdlePool")
            .field("max_idle", &self.max_idle)
            .field("idle_timeout", &self.idle_timeout)
            .field("idle_count", &self.idle_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: Poolable> IdlePool<T> {
    pub fn new(max_idle: usize, idle_timeout: Duration) -> Self {
        Self {
            max_idle,
            idle_timeout,
            groups: DashMap::new(),
            idle_count: AtomicUsize::new(0),
        }
    }

    /// Take the most recently used live connection for `url`'s group.
    pub fn checkout(&self, url: &Url) -> Option<T> {
        let group_id = GroupId::from_url(url)?;
        let mut group = self.groups.get_mut(&group_id)?;
        let now = Instant::now();

        while let Some(idle) = group.pop_back() {
            self.idle_count.fetch_sub(1, Ordering::Relaxed);
            if now.duration_since(idle.since) < self.idle_timeout && idle.conn.is_open() {
                tracing::debug!(host = %group_id.host, port = group_id.port, "reusing idle connection");
                return Some(idle.conn);
            }
            // Expired or dead, drop it.
        }
        None
    }

    /// Return a connection for reuse. Closed connections are dropped.
    ///
    /// Expired and dead idle connections are swept first so they never count
    /// against the cap.
    pub fn checkin(&self, url: &Url, conn: T) {
        if self.max_idle == 0 || !conn.is_open() {
            return;
        }
        let Some(group_id) = GroupId::from_url(url) else {
            return;
        };

        self.cleanup_idle();
        if self.idle_count.load(Ordering::Relaxed) >= self.max_idle {
            self.evict_oldest();
        }

        self.groups.entry(group_id).or_default().push_back(Idle {
            conn,
            since: Instant::now(),
        });
        self.idle_count.fetch_add(1, Ordering::Relaxed);
    }

    fn evict_oldest(&self) {
        let oldest = self
            .groups
            .iter()
            .filter_map(|g| g.front().map(|idle| (g.key().clone(), idle.since)))
            .min_by_key(|(_, since)| *since)
            .map(|(key, _)| key);

        if let Some(key) = oldest {
            if let Some(mut group) = self.groups.get_mut(&key) {
                if group.pop_front().is_some() {
                    self.idle_count.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Drop expired and dead idle connections.
    fn cleanup_idle(&self) {
        let now = Instant::now();
        let mut removed = 0;

        for mut entry in self.groups.iter_mut() {
            let before = entry.len();
            entry.retain(|idle| {
                now.duration_since(idle.since) < self.idle_timeout && idle.conn.is_open()
            });
            removed += before - entry.len();
        }
        self.groups.retain(|_, group| !group.is_empty());

        if removed > 0 {
            self.idle_count.fetch_sub(removed, Ordering::Relaxed);
            tracing::debug!(removed, "expired idle connections");
        }
    }

    /// Get total idle connection count across all groups.
    pub fn idle_count(&self) -> usize {
        self.idle_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct FakeConn {
        id: usize,
        open: Arc<AtomicBool>,
    }

    impl FakeConn {
        fn new(id: usize) -> Self {
            Self {
                id,
                open: Arc::new(AtomicBool::new(true)),
            }
        }
    }

    impl Poolable for FakeConn {
        fn is_open(&self) -> bool {
            self.open.load(Ordering::Relaxed)
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_checkout_same_group_only() {
        let pool = IdlePool::new(100, Duration::from_secs(90));
        pool.checkin(&url("https://a.example/"), FakeConn::new(1));

        assert!(pool.checkout(&url("https://b.example/")).is_none());
        assert!(pool.checkout(&url("http://a.example/")).is_none());
        let conn = pool.checkout(&url("https://a.example:443/x")).unwrap();
        assert_eq!(conn.id, 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_closed_connection_is_skipped() {
        let pool = IdlePool::new(100, Duration::from_secs(90));
        let dead = FakeConn::new(1);
        pool.checkin(&url("http://a.example/"), dead.clone());
        dead.open.store(false, Ordering::Relaxed);

        assert!(pool.checkout(&url("http://a.example/")).is_none());
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let pool = IdlePool::new(2, Duration::from_secs(90));
        pool.checkin(&url("http://a.example/"), FakeConn::new(1));
        pool.checkin(&url("http://b.example/"), FakeConn::new(2));
        pool.checkin(&url("http://c.example/"), FakeConn::new(3));

        assert_eq!(pool.idle_count(), 2);
        assert!(pool.checkout(&url("http://a.example/")).is_none());
        assert_eq!(pool.checkout(&url("http://c.example/")).unwrap().id, 3);
    }

    #[test]
    fn test_idle_timeout() {
        let pool = IdlePool::new(100, Duration::from_millis(0));
        pool.checkin(&url("http://a.example/"), FakeConn::new(1));
        assert!(pool.checkout(&url("http://a.example/")).is_none());
    }

    #[test]
    fn test_checkin_sweeps_dead_before_cap() {
        let pool = IdlePool::new(2, Duration::from_secs(90));
        let dead = FakeConn::new(2);
        pool.checkin(&url("http://a.example/"), FakeConn::new(1));
        pool.checkin(&url("http://b.example/"), dead.clone());
        dead.open.store(false, Ordering::Relaxed);

        // The dead entry makes room; the live, older one survives.
        pool.checkin(&url("http://c.example/"), FakeConn::new(3));
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.checkout(&url("http://a.example/")).unwrap().id, 1);
        assert_eq!(pool.checkout(&url("http://c.example/")).unwrap().id, 3);
    }

    #[test]
    fn test_zero_cap_disables_reuse() {
        let pool = IdlePool::new(0, Duration::from_secs(90));
        pool.checkin(&url("http://a.example/"), FakeConn::new(1));
        assert_eq!(pool.idle_count(), 0);
    }
}
