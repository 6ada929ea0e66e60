use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use repository_unit_of_work::{TransactionHandle, TransactionOptions, TransactionSource};

/// What happened to one in-memory transaction
#[derive(Debug, Default, Clone)]
pub struct HandleState {
    pub commits: usize,
    pub rollbacks: usize,
    pub releases: usize,
    pub committed: bool,
    pub rolled_back: bool,
}

/// Transaction handle that only records lifecycle calls
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    pub id: u64,
    state: Arc<Mutex<HandleState>>,
    fail_commit: bool,
    fail_rollback: bool,
}

impl MemoryHandle {
    pub fn state(&self) -> HandleState {
        self.state.lock().clone()
    }

    pub fn is_committed(&self) -> bool {
        self.state.lock().committed
    }

    pub fn is_rolled_back(&self) -> bool {
        self.state.lock().rolled_back
    }
}

#[async_trait]
impl TransactionHandle for MemoryHandle {
    async fn commit(&self) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock();
        state.commits += 1;
        if self.fail_commit {
            return Err(sqlx::Error::Protocol("commit refused".to_string()));
        }
        state.committed = true;
        Ok(())
    }

    async fn rollback(&self) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock();
        state.rollbacks += 1;
        if state.committed || state.rolled_back {
            return Ok(false);
        }
        if self.fail_rollback {
            return Err(sqlx::Error::Protocol("rollback refused".to_string()));
        }
        state.rolled_back = true;
        Ok(true)
    }

    fn release(&self) {
        self.state.lock().releases += 1;
    }
}

/// Transaction source handing out [`MemoryHandle`]s
#[derive(Debug, Default)]
pub struct MemorySource {
    next_id: AtomicU64,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    handles: Mutex<Vec<MemoryHandle>>,
    options: Mutex<Vec<TransactionOptions>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    pub fn failing_rollback() -> Self {
        Self {
            fail_rollback: true,
            ..Self::default()
        }
    }

    /// Handles in the order they were begun
    pub fn handles(&self) -> Vec<MemoryHandle> {
        self.handles.lock().clone()
    }

    pub fn last_handle(&self) -> MemoryHandle {
        self.handles
            .lock()
            .last()
            .cloned()
            .expect("no transaction was begun")
    }

    /// Options passed to every begin call
    pub fn options_seen(&self) -> Vec<TransactionOptions> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    type Handle = MemoryHandle;

    async fn begin(&self, options: &TransactionOptions) -> Result<MemoryHandle, sqlx::Error> {
        self.options.lock().push(options.clone());
        if self.fail_begin {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let handle = MemoryHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            state: Arc::new(Mutex::new(HandleState::default())),
            fail_commit: self.fail_commit,
            fail_rollback: self.fail_rollback,
        };
        self.handles.lock().push(handle.clone());
        Ok(handle)
    }
}
