//! Store wrappers that misbehave on request.
//!
//! [`FaultyStore`] turns chosen operations into transport errors.
//! [`GatedStore`] lets updates reach the inner store immediately but holds
//! each response until the test releases it, which is how a slow network
//! reorders replies.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

use struggle_meals_store::{Filter, RemoteStore, Result, Row, Select, StoreError, Table, Values};

/// A store operation, for choosing what to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─────────────────────────────────────────────────────────────────────────────
// FaultyStore
// ─────────────────────────────────────────────────────────────────────────────

/// Fails the armed operations with [`StoreError::Transport`].
pub struct FaultyStore<S> {
    inner: S,
    failing: Mutex<HashSet<Operation>>,
}

impl<S: RemoteStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every later `operation` fail.
    pub fn fail(&self, operation: Operation) {
        lock(&self.failing).insert(operation);
    }

    pub fn heal(&self, operation: Operation) {
        lock(&self.failing).remove(&operation);
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if lock(&self.failing).contains(&operation) {
            return Err(StoreError::Transport(format!(
                "injected {:?} failure",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for FaultyStore<S> {
    async fn select(&self, query: &Select) -> Result<Vec<Row>> {
        self.check(Operation::Select)?;
        self.inner.select(query).await
    }

    async fn insert(&self, table: Table, values: &Values) -> Result<Row> {
        self.check(Operation::Insert)?;
        self.inner.insert(table, values).await
    }

    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row> {
        self.check(Operation::Update)?;
        self.inner.update(table, filters, values).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        self.check(Operation::Delete)?;
        self.inner.delete(table, filters).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatedStore
// ─────────────────────────────────────────────────────────────────────────────

/// Applies updates at once, then waits for [`GatedStore::release`] before
/// answering.
///
/// Gates are numbered in the order the updates arrived.
pub struct GatedStore<S> {
    inner: S,
    gates: Mutex<Vec<Option<oneshot::Sender<()>>>>,
    failing: Mutex<HashSet<usize>>,
}

impl<S: RemoteStore> GatedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gates: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make the `index`-th update fail without reaching the inner store.
    /// The failure is still held until released.
    pub fn fail_update(&self, index: usize) {
        lock(&self.failing).insert(index);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Let the response of the `index`-th update through. Returns false if
    /// there is no such update or it was already released.
    pub fn release(&self, index: usize) -> bool {
        let sender = lock(&self.gates).get_mut(index).and_then(Option::take);
        match sender {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Updates applied but not yet released.
    pub fn pending(&self) -> usize {
        lock(&self.gates).iter().filter(|g| g.is_some()).count()
    }

    /// Updates seen so far, released or not.
    pub fn arrived(&self) -> usize {
        lock(&self.gates).len()
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for GatedStore<S> {
    async fn select(&self, query: &Select) -> Result<Vec<Row>> {
        self.inner.select(query).await
    }

    async fn insert(&self, table: Table, values: &Values) -> Result<Row> {
        self.inner.insert(table, values).await
    }

    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row> {
        let index = lock(&self.gates).len();
        let result = if lock(&self.failing).contains(&index) {
            Err(StoreError::Transport(format!("injected failure of update {}", index)))
        } else {
            self.inner.update(table, filters, values).await
        };

        let (tx, rx) = oneshot::channel();
        lock(&self.gates).push(Some(tx));
        // A dropped sender also opens the gate.
        let _ = rx.await;

        result
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        self.inner.delete(table, filters).await
    }
}
