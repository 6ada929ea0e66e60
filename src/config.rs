use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::UnitOfWorkError;

/// Transaction isolation level requested when a transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for IsolationLevel {
    type Err = UnitOfWorkError;

    /// Accepts the SQL spelling as well as `snake_case` / `kebab-case`
    /// variants, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "read uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            _ => Err(UnitOfWorkError::InvalidConfiguration(format!(
                "unknown isolation level: {s}"
            ))),
        }
    }
}

/// Options applied to every transaction a unit of work begins.
///
/// The default leaves everything to the database: its default isolation
/// level, read-write access and no statement timeout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    pub isolation_level: Option<IsolationLevel>,
    pub read_only: bool,
    /// Deadline handed to the database for each statement in the transaction.
    pub statement_timeout: Option<Duration>,
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// `SET TRANSACTION` statement for the configured modes, if any.
    pub(crate) fn set_transaction_sql(&self) -> Option<String> {
        let mut modes = Vec::new();
        if let Some(level) = self.isolation_level {
            modes.push(format!("ISOLATION LEVEL {}", level.as_sql()));
        }
        if self.read_only {
            modes.push("READ ONLY".to_string());
        }

        if modes.is_empty() {
            None
        } else {
            Some(format!("SET TRANSACTION {}", modes.join(", ")))
        }
    }

    /// PostgreSQL reads 0 as "no timeout", so the value is rounded up to at
    /// least one millisecond.
    pub(crate) fn statement_timeout_sql(&self) -> Option<String> {
        self.statement_timeout.map(|timeout| {
            let millis = timeout.as_micros().div_ceil(1000).max(1);
            format!("SET LOCAL statement_timeout = {millis}")
        })
    }
}
