//! Scoped unit of work over the namespace table.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tokio::sync::OwnedMutexGuard;

use crate::Result;

/// An open transaction plus the namespace writer lock.
///
/// Changes become visible only through [`UnitOfWork::commit`]. Dropping the
/// value on any other path (early `?` return, panic, cancelled future) rolls
/// the transaction back and then releases the lock.
pub struct UnitOfWork {
    // Field order matters: the transaction is dropped before the lock.
    tx: Transaction<'static, Sqlite>,
    _writer: OwnedMutexGuard<()>,
}

impl UnitOfWork {
    pub(super) fn new(tx: Transaction<'static, Sqlite>, writer: OwnedMutexGuard<()>) -> Self {
        Self {
            tx,
            _writer: writer,
        }
    }

    /// Connection bound to this unit of work.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit all staged writes.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish()
    }
}
