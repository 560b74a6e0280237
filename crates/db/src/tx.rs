//! Scoped transactions for service operations.
//!
//! A [`Tx`] is begun at the start of an operation and finished exactly once:
//! read-write transactions commit, read-only transactions roll back. A `Tx`
//! that is dropped without [`Tx::finish`] (an early `?` return, a panic) rolls
//! back.
//!
//! Read-only transactions run with `PRAGMA query_only` set, so any write
//! inside them fails with a storage error. The pool created by
//! [`crate::connect`] clears the flag again before handing a connection out.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::DbResult;

/// Whether a transaction is allowed to leave changes behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadWrite,
    ReadOnly,
}

/// Transaction wrapper tying a SQLx transaction to its [`TxMode`].
pub struct Tx {
    inner: Transaction<'static, Sqlite>,
    mode: TxMode,
}

impl Tx {
    /// Begin a new transaction on a pooled connection.
    pub async fn begin(pool: &SqlitePool, mode: TxMode) -> DbResult<Self> {
        let mut inner = pool.begin().await?;
        if mode == TxMode::ReadOnly {
            sqlx::query("PRAGMA query_only = ON")
                .execute(&mut *inner)
                .await?;
        }
        Ok(Self { inner, mode })
    }

    /// Shorthand for a read-write transaction.
    pub async fn read_write(pool: &SqlitePool) -> DbResult<Self> {
        Self::begin(pool, TxMode::ReadWrite).await
    }

    /// Shorthand for a read-only transaction.
    pub async fn read_only(pool: &SqlitePool) -> DbResult<Self> {
        Self::begin(pool, TxMode::ReadOnly).await
    }

    /// Connection to run statements against.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.inner
    }

    /// End the transaction according to its mode.
    pub async fn finish(mut self) -> DbResult<()> {
        match self.mode {
            TxMode::ReadWrite => self.inner.commit().await?,
            TxMode::ReadOnly => {
                sqlx::query("PRAGMA query_only = OFF")
                    .execute(&mut *self.inner)
                    .await?;
                self.inner.rollback().await?
            }
        }
        Ok(())
    }
}
