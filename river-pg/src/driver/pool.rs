//! PostgreSQL Connection Pool
//!
//! Provides connection pooling for efficient resource management.
//! Connections are reused across queries to avoid reconnection overhead.
//!
//! The pool itself is a synchronous `std::sync::Mutex` + `Condvar` structure
//! (mirroring a classic blocking connection pool) with a background
//! `std::thread` evicting idle/expired slots. `acquire()`/`release()` bridge
//! into that blocking world via `tokio::task::spawn_blocking` so the rest of
//! the driver can stay async; the thread that actually dials a new
//! connection calls back into the Tokio runtime with `Handle::block_on`.

use super::{PgConnection, PgError, PgResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub password: Option<String>,
    pub max_connections: usize,
    pub min_connections: usize,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_lifetime: Option<Duration>,
    pub test_on_acquire: bool,
}

impl PoolConfig {
    /// Create a new pool configuration with sensible defaults.
    pub fn new(host: &str, port: u16, user: &str, database: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            user: user.to_string(),
            database: database.to_string(),
            password: None,
            max_connections: 10,
            min_connections: 1,
            idle_timeout: Duration::from_secs(600), // 10 minutes
            acquire_timeout: Duration::from_secs(30), // 30 seconds
            connect_timeout: Duration::from_secs(10), // 10 seconds
            max_lifetime: None,                      // No limit by default
            test_on_acquire: false,                  // Disabled by default for performance
        }
    }

    /// Set password for authentication.
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set minimum idle connections.
    pub fn min_connections(mut self, min: usize) -> Self {
        self.min_connections = min;
        self
    }

    /// Set idle timeout (connections idle longer than this are closed).
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set acquire timeout (max wait time when getting a connection).
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set connect timeout (max time to establish new connection).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set maximum lifetime of a connection before recycling.
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = Some(lifetime);
        self
    }

    /// Enable connection validation on acquire.
    pub fn test_on_acquire(mut self, enabled: bool) -> Self {
        self.test_on_acquire = enabled;
        self
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub active: usize,
    pub idle: usize,
    pub pending: usize,
    /// Maximum connections configured
    pub max_size: usize,
    pub total_created: usize,
}

/// A pooled connection with creation timestamp for idle tracking.
struct PooledConn {
    conn: PgConnection,
    created_at: Instant,
    last_used: Instant,
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    conn: Option<PgConnection>,
    pool: Arc<PgPoolInner>,
}

impl PooledConnection {
    /// Get a mutable reference to the underlying connection.
    pub fn get_mut(&mut self) -> &mut PgConnection {
        self.conn
            .as_mut()
            .expect("Connection should always be present")
    }

    /// Discard the connection instead of returning it to the pool (e.g.
    /// after it surfaced a broken-pipe error). The slot is freed without
    /// being re-pooled.
    pub fn discard(mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn);
            self.pool.discard_one();
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

impl std::ops::Deref for PooledConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_ref()
            .expect("Connection should always be present")
    }
}

impl std::ops::DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_mut()
            .expect("Connection should always be present")
    }
}

/// Mutex-guarded pool state. `active` counts connections currently checked
/// out (not present in `idle`).
struct PoolState {
    idle: VecDeque<PooledConn>,
    active: usize,
    total_created: usize,
}

/// Inner pool state (shared across clones and with the maintenance thread).
struct PgPoolInner {
    config: PoolConfig,
    state: Mutex<PoolState>,
    condvar: Condvar,
    closed: AtomicBool,
    runtime: tokio::runtime::Handle,
}

impl PgPoolInner {
    /// Pop a usable idle slot, discarding stale ones along the way. Called
    /// with `state` already locked by the caller.
    fn take_idle_locked(&self, state: &mut PoolState) -> Option<PgConnection> {
        while let Some(pooled) = state.idle.pop_back() {
            if pooled.last_used.elapsed() > self.config.idle_timeout {
                continue;
            }
            if let Some(max_life) = self.config.max_lifetime
                && pooled.created_at.elapsed() > max_life
            {
                continue;
            }
            return Some(pooled.conn);
        }
        None
    }

    /// Blocking acquire loop: runs on a `spawn_blocking` worker thread.
    fn acquire_blocking(self: &Arc<Self>) -> PgResult<PgConnection> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PgError::PoolClosed);
        }

        let deadline = Instant::now() + self.config.acquire_timeout;
        let mut state = self.state.lock().expect("pool mutex poisoned");

        loop {
            if self.closed.load(Ordering::Acquire) {
                return Err(PgError::PoolClosed);
            }

            if let Some(conn) = self.take_idle_locked(&mut state) {
                state.active += 1;
                return Ok(conn);
            }

            if state.active < self.config.max_connections {
                state.active += 1;
                drop(state);
                return match self.dial() {
                    Ok(conn) => {
                        let mut state = self.state.lock().expect("pool mutex poisoned");
                        state.total_created += 1;
                        drop(state);
                        Ok(conn)
                    }
                    Err(e) => {
                        let mut state = self.state.lock().expect("pool mutex poisoned");
                        state.active -= 1;
                        drop(state);
                        self.condvar.notify_one();
                        Err(e)
                    }
                };
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(PgError::PoolExhausted);
            }
            let (guard, timeout_result) = self
                .condvar
                .wait_timeout(state, deadline - now)
                .expect("pool mutex poisoned");
            state = guard;
            if timeout_result.timed_out() {
                // A release may have raced the timeout notification; take
                // one more look before giving up.
                if let Some(conn) = self.take_idle_locked(&mut state) {
                    state.active += 1;
                    return Ok(conn);
                }
                if state.active >= self.config.max_connections {
                    return Err(PgError::PoolExhausted);
                }
            }
        }
    }

    /// Dial a fresh connection, bridging back into the async world.
    fn dial(&self) -> PgResult<PgConnection> {
        let config = self.config.clone();
        self.runtime.block_on(async move {
            tokio::time::timeout(config.connect_timeout, PgPool::create_connection(&config))
                .await
                .map_err(|_| PgError::ConnectionTimeout)?
        })
    }

    fn release(&self, conn: PgConnection) {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        state.active = state.active.saturating_sub(1);
        if !self.closed.load(Ordering::Acquire) && state.idle.len() < self.config.max_connections
        {
            state.idle.push_back(PooledConn {
                conn,
                created_at: Instant::now(),
                last_used: Instant::now(),
            });
        }
        drop(state);
        self.condvar.notify_one();
    }

    fn discard_one(&self) {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        state.active = state.active.saturating_sub(1);
        drop(state);
        self.condvar.notify_one();
    }

    /// Sweep idle slots for staleness and wake anyone waiting on freed
    /// capacity. Run periodically by the maintenance thread.
    fn sweep(&self) {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        let idle_timeout = self.config.idle_timeout;
        let max_lifetime = self.config.max_lifetime;
        let before = state.idle.len();
        state.idle.retain(|pooled| {
            if pooled.last_used.elapsed() > idle_timeout {
                return false;
            }
            if let Some(max_life) = max_lifetime
                && pooled.created_at.elapsed() > max_life
            {
                return false;
            }
            true
        });
        let evicted = before - state.idle.len();
        drop(state);
        if evicted > 0 {
            tracing::debug!(evicted, "pool maintenance evicted stale idle connections");
            self.condvar.notify_all();
        }
    }
}

/// # Example
/// ```ignore
/// let config = PoolConfig::new("localhost", 5432, "user", "db")
///     .password("secret")
///     .max_connections(20);
/// let pool = PgPool::connect(config).await?;
/// // Get a connection from the pool
/// let mut conn = pool.acquire().await?;
/// conn.simple_query("SELECT 1").await?;
/// ```
#[derive(Clone)]
pub struct PgPool {
    inner: Arc<PgPoolInner>,
}

impl PgPool {
    /// Create a new connection pool.
    pub async fn connect(config: PoolConfig) -> PgResult<Self> {
        let mut initial_idle = VecDeque::new();
        for _ in 0..config.min_connections {
            let conn = Self::create_connection(&config).await?;
            initial_idle.push_back(PooledConn {
                conn,
                created_at: Instant::now(),
                last_used: Instant::now(),
            });
        }
        let initial_count = initial_idle.len();

        let inner = Arc::new(PgPoolInner {
            config,
            state: Mutex::new(PoolState {
                idle: initial_idle,
                active: 0,
                total_created: initial_count,
            }),
            condvar: Condvar::new(),
            closed: AtomicBool::new(false),
            runtime: tokio::runtime::Handle::current(),
        });

        spawn_maintenance_thread(Arc::clone(&inner));

        Ok(Self { inner })
    }

    /// Acquire a connection from the pool, waiting up to `acquire_timeout`
    /// if every slot is in use. A connection that fails its health check on
    /// acquire (when `test_on_acquire` is set) is discarded and the acquire
    /// retried once within whatever remains of the timeout.
    pub async fn acquire(&self) -> PgResult<PooledConnection> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PgError::PoolClosed);
        }

        let mut conn = self.acquire_raw().await?;

        if self.inner.config.test_on_acquire && conn.execute_simple("SELECT 1").await.is_err() {
            self.inner.discard_one();
            conn = self.acquire_raw().await?;
        }

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
        })
    }

    async fn acquire_raw(&self) -> PgResult<PgConnection> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.acquire_blocking())
            .await
            .map_err(|_| PgError::PoolClosed)?
    }

    /// Get the current number of idle connections.
    pub async fn idle_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .expect("pool mutex poisoned")
            .idle
            .len()
    }

    /// Get the number of connections currently in use.
    pub fn active_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .expect("pool mutex poisoned")
            .active
    }

    /// Get the maximum number of connections.
    pub fn max_connections(&self) -> usize {
        self.inner.config.max_connections
    }

    /// Get comprehensive pool statistics.
    pub async fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock().expect("pool mutex poisoned");
        PoolStats {
            active: state.active,
            idle: state.idle.len(),
            pending: 0,
            max_size: self.inner.config.max_connections,
            total_created: state.total_created,
        }
    }

    /// Check if the pool is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Close the pool gracefully. Idle connections are dropped immediately;
    /// in-flight checkouts are released as usual but are not re-pooled.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let mut state = self.inner.state.lock().expect("pool mutex poisoned");
        state.idle.clear();
        drop(state);
        self.inner.condvar.notify_all();
    }

    /// Create a new connection using the pool configuration.
    async fn create_connection(config: &PoolConfig) -> PgResult<PgConnection> {
        match &config.password {
            Some(password) => {
                PgConnection::connect_with_password(
                    &config.host,
                    config.port,
                    &config.user,
                    &config.database,
                    Some(password),
                )
                .await
            }
            None => {
                PgConnection::connect(&config.host, config.port, &config.user, &config.database)
                    .await
            }
        }
    }
}

/// Background thread that periodically evicts idle/expired connections and
/// wakes acquirers so a freed slot is reused promptly. Exits once the pool
/// is closed or every other handle to it has been dropped.
fn spawn_maintenance_thread(inner: Arc<PgPoolInner>) {
    std::thread::spawn(move || {
        let interval = {
            let configured = inner.config.idle_timeout / 4;
            configured.max(Duration::from_millis(100))
        };
        loop {
            if Arc::strong_count(&inner) <= 1 || inner.closed.load(Ordering::Acquire) {
                return;
            }
            std::thread::sleep(interval);
            if inner.closed.load(Ordering::Acquire) {
                return;
            }
            inner.sweep();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config() {
        let config = PoolConfig::new("localhost", 5432, "user", "testdb")
            .password("secret123")
            .max_connections(20)
            .min_connections(5);

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.user, "user");
        assert_eq!(config.database, "testdb");
        assert_eq!(config.password, Some("secret123".to_string()));
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
    }
}
