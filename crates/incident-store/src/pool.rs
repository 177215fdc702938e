//! Bounded connection pool
//!
//! Provides connection reuse across concurrent requests:
//! - Bounded checkout (callers wait for a free slot)
//! - LIFO reuse of idle connections
//! - Pool statistics and monitoring
//!
//! SQLite calls block, so every checkout runs on tokio's blocking pool.

use crate::error::StoreError;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total connections opened
    pub total_opened: usize,
    /// Connections currently checked out
    pub in_use: usize,
    /// Idle connections waiting for reuse
    pub idle_count: usize,
    /// Total checkouts served
    pub checkouts: u64,
}

#[derive(Debug)]
struct PoolInner {
    path: PathBuf,
    max_size: usize,
    /// Idle connections (LIFO for cache efficiency)
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    stats: Mutex<PoolStats>,
}

impl PoolInner {
    fn checkout(&self) -> Result<Connection, StoreError> {
        let reused = self.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                let conn = open_connection(&self.path)?;
                self.stats.lock().total_opened += 1;
                conn
            }
        };

        let idle_count = self.idle.lock().len();
        let mut stats = self.stats.lock();
        stats.in_use += 1;
        stats.checkouts += 1;
        stats.idle_count = idle_count;

        Ok(conn)
    }

    fn checkin(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_size {
            idle.push(conn);
        }
        // Else: drop connection

        let mut stats = self.stats.lock();
        stats.in_use = stats.in_use.saturating_sub(1);
        stats.idle_count = idle.len();
    }
}

/// Shared pool of SQLite connections to one database file
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Create pool and open a first connection
    ///
    /// The first connection is opened eagerly so an unreachable database
    /// fails at startup rather than on the first request.
    ///
    /// # Errors
    /// `StoreError::Sql` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>, max_size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let max_size = max_size.max(1);
        let first = open_connection(&path)?;

        tracing::info!("Opened connection pool for {} (max {})", path.display(), max_size);

        Ok(Self {
            inner: Arc::new(PoolInner {
                path,
                max_size,
                idle: Mutex::new(vec![first]),
                permits: Arc::new(Semaphore::new(max_size)),
                stats: Mutex::new(PoolStats {
                    total_opened: 1,
                    idle_count: 1,
                    ..PoolStats::default()
                }),
            }),
        })
    }

    /// Run a closure with a pooled connection
    ///
    /// Waits for a free slot when all `max_size` connections are in use.
    ///
    /// # Errors
    /// - `StoreError::PoolClosed` if the pool was closed
    /// - `StoreError::Worker` if the blocking task panicked
    /// - any error returned by the closure
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::PoolClosed)?;

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut conn = inner.checkout()?;
            let result = f(&mut conn);
            inner.checkin(conn);
            result
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }

    /// Stop handing out connections and drop idle ones
    pub fn close(&self) {
        self.inner.permits.close();
        self.inner.idle.lock().clear();
        self.inner.stats.lock().idle_count = 0;
    }

    /// Get pool statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        *self.inner.stats.lock()
    }

    /// Maximum connections
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    /// Database file backing the pool
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

fn open_connection(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        "#,
    )?;
    Ok(conn)
}
