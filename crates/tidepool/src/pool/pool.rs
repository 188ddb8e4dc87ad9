//! Connection pool implementation

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tidepool_core::{ConnectParams, Connector, Result, TidepoolError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::config::PoolConfig;
use super::handle::{ConnectionHandle, HandleState};
use super::stats::PoolStats;
use super::waiters::{WaiterId, WaiterQueue};
use crate::health::{PingError, ping_connection};

/// What a queued waiter is woken with
enum Grant<T> {
    /// A released connection, handed over without passing through the idle stack
    Handle(ConnectionHandle<T>),
    /// Capacity freed up. The slot is already counted in `total`; the waiter
    /// opens its own connection.
    Slot,
    /// The pool shut down
    Closed,
}

/// Everything guarded by the pool lock
struct PoolState<T> {
    /// Idle connections, most recently released last
    idle: Vec<ConnectionHandle<T>>,
    /// Live connections plus reservations for connections being opened
    total: usize,
    waiters: WaiterQueue<Grant<T>>,
    closed: bool,
}

impl<T> PoolState<T> {
    /// Give up one unit of capacity: the earliest waiter inherits it,
    /// otherwise `total` shrinks.
    fn vacate_slot(&mut self) {
        if self.waiters.offer(Grant::Slot).is_err() {
            self.total -= 1;
        }
    }
}

/// Outcome of the locked part of an acquire
enum Checkout<T> {
    Reuse(ConnectionHandle<T>),
    Create,
    Wait(WaiterId, oneshot::Receiver<Grant<T>>),
}

/// Why an idle connection was refused at checkout
struct Rejection {
    /// Only failed pings count against `validation_retries`
    counts: bool,
    error: TidepoolError,
}

struct PoolInner<C: Connector> {
    config: PoolConfig,
    params: ConnectParams,
    connector: C,
    state: Mutex<PoolState<C::Connection>>,
    next_id: AtomicU64,
}

/// A bounded pool of connections produced by a [`Connector`]
///
/// Idle connections are reused most-recently-released first, which keeps a
/// small set of connections warm. When every slot is taken, callers queue
/// and are served in arrival order. Connections are returned to the pool
/// when the [`PooledConnection`] guard is dropped.
///
/// Cloning the pool is cheap; all clones share the same connections.
pub struct ConnectionPool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> ConnectionPool<C> {
    /// Create a new, empty connection pool
    pub fn new(config: PoolConfig, params: ConnectParams, connector: C) -> Self {
        tracing::debug!(
            address = %params.address(),
            max_size = config.max_size(),
            "creating connection pool"
        );
        Self {
            inner: Arc::new(PoolInner {
                config,
                params,
                connector,
                state: Mutex::new(PoolState {
                    idle: Vec::new(),
                    total: 0,
                    waiters: WaiterQueue::new(),
                    closed: false,
                }),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Get a connection, waiting at most the configured acquire timeout
    pub async fn acquire(&self) -> Result<PooledConnection<C>> {
        let deadline = Instant::now() + self.inner.config.acquire_timeout();
        self.acquire_with_deadline(Some(deadline)).await
    }

    /// Get a connection, waiting until `deadline` (or forever if `None`)
    ///
    /// This will:
    /// 1. Reuse the most recently released idle connection, checking it first
    /// 2. If none is idle and the pool is under `max_size`, open a new one
    /// 3. Otherwise queue behind earlier callers until a connection frees up
    ///
    /// Connector failures are returned as-is and never retried here.
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(max_size = self.inner.config.max_size())
    )]
    pub async fn acquire_with_deadline(
        &self,
        deadline: Option<Instant>,
    ) -> Result<PooledConnection<C>> {
        let mut failed_checks = 0u32;

        loop {
            match self.inner.begin_checkout()? {
                Checkout::Reuse(handle) => {
                    let conn = PooledConnection::new(handle, Arc::clone(&self.inner));
                    match self.inner.check_out(conn).await {
                        Ok(conn) => return Ok(conn),
                        Err(rejection) if rejection.counts => {
                            failed_checks += 1;
                            if failed_checks > self.inner.config.validation_retries() {
                                tracing::warn!(
                                    attempts = failed_checks,
                                    error = %rejection.error,
                                    "connection validation kept failing"
                                );
                                return Err(TidepoolError::Connect(rejection.error.to_string()));
                            }
                            tracing::debug!(
                                error = %rejection.error,
                                "discarded connection, retrying"
                            );
                        }
                        Err(rejection) => {
                            tracing::debug!(error = %rejection.error, "discarded stale connection");
                        }
                    }
                }
                Checkout::Create => {
                    let reservation = SlotReservation::new(&self.inner);
                    return self.inner.open(reservation).await;
                }
                Checkout::Wait(ticket, receiver) => {
                    let waiter = PendingAcquire {
                        inner: &self.inner,
                        ticket,
                        receiver: Some(receiver),
                    };
                    return match waiter.wait(deadline).await? {
                        Grant::Handle(handle) => {
                            Ok(PooledConnection::new(handle, Arc::clone(&self.inner)))
                        }
                        Grant::Slot => {
                            let reservation = SlotReservation::new(&self.inner);
                            self.inner.open(reservation).await
                        }
                        Grant::Closed => Err(TidepoolError::PoolClosed),
                    };
                }
            }
        }
    }

    /// Return a connection to the pool.
    ///
    /// Equivalent to dropping it.
    pub fn release(&self, conn: PooledConnection<C>) {
        drop(conn);
    }

    /// Close idle connections unused for longer than `max_idle`.
    ///
    /// Idle connections past the configured max lifetime are closed too.
    /// Returns the number of connections closed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_lifetime = self.inner.config.max_lifetime();
        let evicted = {
            let mut state = self.inner.state.lock();
            let (stale, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut state.idle)
                .into_iter()
                .partition(|handle| {
                    handle.idle_for() > max_idle || handle.is_expired(max_lifetime)
                });
            state.idle = keep;
            for _ in &stale {
                state.vacate_slot();
            }
            stale
        };

        let count = evicted.len();
        for handle in evicted {
            self.inner.close_handle(handle).await;
        }
        if count > 0 {
            tracing::debug!(evicted = count, "evicted idle connections");
        }
        count
    }

    /// Shut the pool down.
    ///
    /// Pending acquires fail with [`TidepoolError::PoolClosed`], idle
    /// connections are closed now and checked-out ones when they come back.
    /// Calling this more than once is harmless.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) {
        let (idle, waiters) = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let idle = std::mem::take(&mut state.idle);
            state.total -= idle.len();
            (idle, state.waiters.drain())
        };

        let rejected = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(Grant::Closed);
        }

        let closed_idle = idle.len();
        for handle in idle {
            self.inner.close_handle(handle).await;
        }

        tracing::info!(closed_idle, rejected_waiters = rejected, "connection pool closed");
    }

    /// Open connections until the pool holds `min_size` of them, never
    /// going past `max_size`.
    ///
    /// Returns how many connections were opened.
    pub async fn warm_up(&self) -> Result<usize> {
        let config = &self.inner.config;
        let target = config.min_size().min(config.max_size());
        let mut opened = 0;
        loop {
            let reservation = {
                let mut state = self.inner.state.lock();
                if state.closed {
                    return Err(TidepoolError::PoolClosed);
                }
                if state.total >= target {
                    break;
                }
                state.total += 1;
                SlotReservation::new(&self.inner)
            };
            let conn = self.inner.open(reservation).await?;
            drop(conn);
            opened += 1;
        }

        if opened > 0 {
            tracing::debug!(opened, "warmed up connection pool");
        }
        Ok(opened)
    }

    /// Spawn the idle reaper when a reap interval is configured.
    ///
    /// The task evicts connections idle longer than the idle timeout on every
    /// tick and stops once the pool is closed or dropped.
    pub fn spawn_maintenance(&self) -> Option<JoinHandle<()>> {
        let interval = self.inner.config.reap_interval()?;
        let weak = Arc::downgrade(&self.inner);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.state.lock().closed {
                    break;
                }
                let pool = ConnectionPool { inner };
                pool.evict_idle(pool.inner.config.idle_timeout()).await;
            }
            tracing::debug!("pool maintenance stopped");
        }))
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats::new(
            state.total,
            state.idle.len(),
            state.waiters.len(),
            self.inner.config.max_size(),
        )
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    pub fn params(&self) -> &ConnectParams {
        &self.inner.params
    }

    pub fn connector(&self) -> &C {
        &self.inner.connector
    }
}

impl<C: Connector> fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("address", &self.inner.params.address())
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: Connector> PoolInner<C> {
    /// Take an idle connection, reserve a slot, or join the queue
    fn begin_checkout(&self) -> Result<Checkout<C::Connection>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TidepoolError::PoolClosed);
        }

        if let Some(mut handle) = state.idle.pop() {
            handle.set_state(HandleState::InUse);
            return Ok(Checkout::Reuse(handle));
        }

        if state.total < self.config.max_size() {
            state.total += 1;
            return Ok(Checkout::Create);
        }

        let (sender, receiver) = oneshot::channel();
        let ticket = state.waiters.enqueue(sender);
        tracing::debug!(waiting = state.waiters.len(), "pool saturated, queuing acquire");
        Ok(Checkout::Wait(ticket, receiver))
    }

    /// Open a connection into a reserved slot.
    ///
    /// The reservation is released if the connector fails or the caller
    /// goes away mid-connect.
    async fn open(
        self: &Arc<Self>,
        mut reservation: SlotReservation<'_, C>,
    ) -> Result<PooledConnection<C>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let connection = match self.connector.connect(&self.params).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!(
                    connection_id = id,
                    address = %self.params.address(),
                    error = %e,
                    "failed to open connection"
                );
                return Err(e);
            }
        };
        reservation.disarm();

        let conn = PooledConnection::new(ConnectionHandle::new(id, connection), Arc::clone(self));
        let closed = self.state.lock().closed;
        if closed {
            tracing::debug!(connection_id = id, "pool closed while connecting");
            conn.discard().await;
            return Err(TidepoolError::PoolClosed);
        }

        tracing::debug!(connection_id = id, "opened new connection");
        Ok(conn)
    }

    /// Decide whether an idle connection may be handed out.
    ///
    /// Rejected connections are closed and their slot given up.
    async fn check_out(
        &self,
        mut conn: PooledConnection<C>,
    ) -> std::result::Result<PooledConnection<C>, Rejection> {
        let stale = {
            let handle = conn.handle();
            if !handle.is_healthy() {
                Some("connection was flagged unhealthy")
            } else if handle.is_expired(self.config.max_lifetime()) {
                Some("connection exceeded its max lifetime")
            } else if handle.idle_for() > self.config.idle_timeout() {
                Some("connection sat idle past the idle timeout")
            } else {
                None
            }
        };
        if let Some(reason) = stale {
            conn.discard().await;
            return Err(Rejection {
                counts: false,
                error: TidepoolError::ValidationFailed(reason.into()),
            });
        }

        if !self.config.test_on_checkout() {
            return Ok(conn);
        }

        let thresholds = self.config.health_thresholds();
        let handle = conn.handle_mut();
        handle.set_state(HandleState::Validating);
        let result = match handle.connection_mut() {
            Some(connection) => {
                ping_connection(&self.connector, connection, self.config.validation_timeout()).await
            }
            None => Err(PingError::Failed("connection already closed".into())),
        };
        handle.record_ping(&result, &thresholds);

        let failure = match result {
            Err(e) => Some(e.to_string()),
            Ok(latency) if !handle.last_status().is_usable() => {
                Some(format!("ping took {:?}", latency))
            }
            Ok(_) => None,
        };
        if let Some(reason) = failure {
            conn.discard().await;
            return Err(Rejection {
                counts: true,
                error: TidepoolError::ValidationFailed(reason),
            });
        }

        handle.set_state(HandleState::InUse);
        Ok(conn)
    }

    /// Take back a connection from a caller
    fn release_handle(self: &Arc<Self>, mut handle: ConnectionHandle<C::Connection>) {
        handle.mark_used();
        let id = handle.id();
        // a handle dropped mid-validation never finished its ping
        let retire = !handle.is_healthy()
            || handle.state() == HandleState::Validating
            || handle.is_expired(self.config.max_lifetime());

        let mut state = self.state.lock();
        if retire || state.closed {
            state.vacate_slot();
            drop(state);
            tracing::debug!(connection_id = id, "retiring connection on release");
            self.spawn_close(handle);
            return;
        }

        match state.waiters.offer(Grant::Handle(handle)) {
            Ok(()) => tracing::trace!(connection_id = id, "handed connection to waiter"),
            Err(Grant::Handle(mut handle)) => {
                handle.set_state(HandleState::Idle);
                state.idle.push(handle);
            }
            Err(_) => {}
        }
    }

    /// Clean up after a waiter that went away without using its ticket
    fn abandon(
        self: &Arc<Self>,
        ticket: WaiterId,
        mut receiver: oneshot::Receiver<Grant<C::Connection>>,
    ) {
        let removed = self.state.lock().waiters.remove(ticket);
        if removed {
            return;
        }

        // the grant was sent under the lock, so it is already in the channel
        match receiver.try_recv() {
            Ok(Grant::Handle(handle)) => self.release_handle(handle),
            Ok(Grant::Slot) => self.state.lock().vacate_slot(),
            Ok(Grant::Closed) | Err(_) => {}
        }
    }

    async fn close_handle(&self, mut handle: ConnectionHandle<C::Connection>) {
        let id = handle.id();
        if let Err(e) = handle.close(&self.connector).await {
            tracing::warn!(connection_id = id, error = %e, "connection teardown failed");
        }
    }

    /// Close a connection from a synchronous context
    fn spawn_close(self: &Arc<Self>, handle: ConnectionHandle<C::Connection>) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(self);
                runtime.spawn(async move { inner.close_handle(handle).await });
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = handle.id(),
                    "no runtime available, dropping connection without teardown"
                );
            }
        }
    }
}

/// A slot counted in `total` for a connection not opened yet
struct SlotReservation<'a, C: Connector> {
    inner: &'a PoolInner<C>,
    armed: bool,
}

impl<'a, C: Connector> SlotReservation<'a, C> {
    fn new(inner: &'a PoolInner<C>) -> Self {
        Self { inner, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<C: Connector> Drop for SlotReservation<'_, C> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.state.lock().vacate_slot();
        }
    }
}

/// A queued acquire. Dropping it leaves the queue cleanly.
struct PendingAcquire<'a, C: Connector> {
    inner: &'a Arc<PoolInner<C>>,
    ticket: WaiterId,
    receiver: Option<oneshot::Receiver<Grant<C::Connection>>>,
}

impl<C: Connector> PendingAcquire<'_, C> {
    async fn wait(mut self, deadline: Option<Instant>) -> Result<Grant<C::Connection>> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Err(TidepoolError::PoolClosed);
        };

        let received = match deadline {
            Some(deadline) => {
                let outcome = tokio::time::timeout_at(deadline, receiver).await;
                match outcome {
                    Ok(received) => received,
                    Err(_) => return self.expire(),
                }
            }
            None => receiver.await,
        };

        self.receiver = None;
        received.map_err(|_| TidepoolError::PoolClosed)
    }

    /// The deadline passed. Leave the queue, unless a grant beat us to it.
    fn expire(mut self) -> Result<Grant<C::Connection>> {
        let removed = self.inner.state.lock().waiters.remove(self.ticket);
        let receiver = self.receiver.take();

        if removed {
            return Err(TidepoolError::Timeout(format!(
                "Timed out waiting for connection (max_size: {})",
                self.inner.config.max_size()
            )));
        }

        match receiver.map(|mut receiver| receiver.try_recv()) {
            Some(Ok(grant)) => Ok(grant),
            _ => Err(TidepoolError::PoolClosed),
        }
    }
}

impl<C: Connector> Drop for PendingAcquire<'_, C> {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            self.inner.abandon(self.ticket, receiver);
        }
    }
}

/// A connection borrowed from the pool
///
/// Dereferences to the connector's connection type. When dropped, the
/// connection is returned to the pool, or closed if it was flagged
/// unhealthy or the pool has shut down.
pub struct PooledConnection<C: Connector> {
    handle: Option<ConnectionHandle<C::Connection>>,
    pool: Arc<PoolInner<C>>,
}

impl<C: Connector> PooledConnection<C> {
    fn new(handle: ConnectionHandle<C::Connection>, pool: Arc<PoolInner<C>>) -> Self {
        Self {
            handle: Some(handle),
            pool,
        }
    }

    /// Get the pool's bookkeeping for this connection
    pub fn handle(&self) -> &ConnectionHandle<C::Connection> {
        self.handle.as_ref().expect("connection taken")
    }

    fn handle_mut(&mut self) -> &mut ConnectionHandle<C::Connection> {
        self.handle.as_mut().expect("connection taken")
    }

    pub fn id(&self) -> u64 {
        self.handle().id()
    }

    /// Flag the connection as broken; it is closed instead of reused.
    pub fn mark_unhealthy(&mut self) {
        self.handle_mut().mark_unhealthy();
    }

    /// Give the connection back to the pool
    pub fn release(self) {
        drop(self);
    }

    /// Close the connection now instead of returning it, freeing its slot
    pub async fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => {
                self.pool.state.lock().vacate_slot();
                handle.close(&self.pool.connector).await
            }
            None => Ok(()),
        }
    }

    async fn discard(self) {
        let id = self.id();
        if let Err(e) = self.close().await {
            tracing::warn!(connection_id = id, error = %e, "connection teardown failed");
        }
    }
}

impl<C: Connector> Deref for PooledConnection<C> {
    type Target = C::Connection;

    fn deref(&self) -> &Self::Target {
        self.handle().connection().expect("connection taken")
    }
}

impl<C: Connector> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle_mut().connection_mut().expect("connection taken")
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.pool.release_handle(handle);
        }
    }
}

impl<C: Connector> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("handle", &self.handle)
            .finish()
    }
}
