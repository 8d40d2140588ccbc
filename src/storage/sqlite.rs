//! SQLite Persistent Storage for Deposits
//!
//! Provides durable storage for deposits and user balances that survives
//! service restarts. Uses connection pooling via r2d2 for concurrent access.
//! Decimal amounts are stored as TEXT so no precision is lost.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::traits::{DepositStore, StorageError, StorageResult};
use super::types::{now_secs, DepositStatus, PendingDeposit};

/// SQLite-backed deposit store with connection pooling
pub struct SqliteDepositStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDepositStore {
    /// Create a new store with the given database path
    ///
    /// Creates the database file and runs migrations if needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS deposits (
                txid TEXT PRIMARY KEY,
                address TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                amount_ltc TEXT NOT NULL,
                amount_usd TEXT NOT NULL,
                confirmations INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_deposits_status ON deposits(status);
            CREATE INDEX IF NOT EXISTS idx_deposits_created_at ON deposits(created_at);

            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                balance TEXT NOT NULL DEFAULT '0'
            );
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_deposit(row: &rusqlite::Row) -> rusqlite::Result<PendingDeposit> {
        let status: String = row.get("status")?;
        let status = status.parse::<DepositStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into())
        })?;

        Ok(PendingDeposit {
            txid: row.get("txid")?,
            address: row.get("address")?,
            user_id: row.get("user_id")?,
            amount_ltc: decimal_column(row, "amount_ltc")?,
            amount_usd: decimal_column(row, "amount_usd")?,
            confirmations: row.get::<_, i64>("confirmations")? as u32,
            status,
            created_at: row.get::<_, i64>("created_at")? as u64,
            updated_at: row.get::<_, i64>("updated_at")? as u64,
        })
    }

    // Synchronous helper methods for the trait implementations

    fn create_deposit_sync(&self, deposit: &PendingDeposit) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO deposits (
                txid, address, user_id, amount_ltc, amount_usd,
                confirmations, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(txid) DO UPDATE SET
                confirmations = MAX(deposits.confirmations, excluded.confirmations),
                status = CASE WHEN deposits.status = 'confirmed'
                    THEN deposits.status ELSE excluded.status END,
                updated_at = excluded.updated_at
            "#,
            params![
                deposit.txid,
                deposit.address,
                deposit.user_id,
                deposit.amount_ltc.to_string(),
                deposit.amount_usd.to_string(),
                deposit.confirmations as i64,
                deposit.status.to_string(),
                deposit.created_at as i64,
                now_secs() as i64,
            ],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_deposit_sync(&self, txid: &str) -> Result<Option<PendingDeposit>, StorageError> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT * FROM deposits WHERE txid = ?1",
            params![txid],
            Self::row_to_deposit,
        )
        .optional()
        .map_err(map_read_error)
    }

    fn list_pending_sync(&self) -> Result<Vec<PendingDeposit>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT * FROM deposits WHERE status = 'pending' ORDER BY created_at DESC, txid ASC",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let deposits = stmt
            .query_map([], Self::row_to_deposit)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_read_error)?;

        Ok(deposits)
    }

    fn update_confirmations_sync(&self, txid: &str, confirmations: u32) -> Result<(), StorageError> {
        let conn = self.conn()?;

        let rows_affected = conn
            .execute(
                r#"
            UPDATE deposits SET
                updated_at = CASE WHEN ?2 > confirmations THEN ?3 ELSE updated_at END,
                confirmations = MAX(confirmations, ?2)
            WHERE txid = ?1
            "#,
                params![txid, confirmations as i64, now_secs() as i64],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        if rows_affected == 0 {
            return Err(StorageError::NotFound(txid.to_string()));
        }

        Ok(())
    }

    fn finalize_deposit_sync(
        &self,
        txid: &str,
        user_id: i64,
        amount_usd: Decimal,
    ) -> Result<bool, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM deposits WHERE txid = ?1",
                params![txid],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let status = status
            .ok_or_else(|| StorageError::NotFound(txid.to_string()))?
            .parse::<DepositStatus>()
            .map_err(StorageError::InvalidData)?;
        if status == DepositStatus::Confirmed {
            return Ok(false);
        }

        let balance: Option<String> = tx
            .query_row(
                "SELECT balance FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let balance = match balance {
            Some(text) => parse_decimal(&text)?,
            None => Decimal::ZERO,
        };

        tx.execute(
            r#"
            INSERT INTO users (user_id, balance) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET balance = excluded.balance
            "#,
            params![user_id, (balance + amount_usd).to_string()],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.execute(
            "UPDATE deposits SET status = 'confirmed', updated_at = ?2 WHERE txid = ?1",
            params![txid, now_secs() as i64],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(true)
    }

    fn user_balance_sync(&self, user_id: i64) -> Result<Decimal, StorageError> {
        let conn = self.conn()?;

        let balance: Option<String> = conn
            .query_row(
                "SELECT balance FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        balance.map_or(Ok(Decimal::ZERO), |text| parse_decimal(&text))
    }
}

fn decimal_column(row: &rusqlite::Row, column: &str) -> rusqlite::Result<Decimal> {
    let text: String = row.get(column)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn parse_decimal(text: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(text).map_err(|e| StorageError::InvalidData(format!("{}: {}", text, e)))
}

fn map_read_error(e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
            StorageError::InvalidData(inner.to_string())
        }
        other => StorageError::Database(other.to_string()),
    }
}

#[async_trait]
impl DepositStore for SqliteDepositStore {
    async fn create_deposit(&self, deposit: &PendingDeposit) -> StorageResult<()> {
        self.create_deposit_sync(deposit)
    }

    async fn get_deposit(&self, txid: &str) -> StorageResult<Option<PendingDeposit>> {
        self.get_deposit_sync(txid)
    }

    async fn list_pending_deposits(&self) -> StorageResult<Vec<PendingDeposit>> {
        self.list_pending_sync()
    }

    async fn update_confirmations(&self, txid: &str, confirmations: u32) -> StorageResult<()> {
        self.update_confirmations_sync(txid, confirmations)
    }

    async fn finalize_deposit(
        &self,
        txid: &str,
        user_id: i64,
        amount_usd: Decimal,
    ) -> StorageResult<bool> {
        self.finalize_deposit_sync(txid, user_id, amount_usd)
    }

    async fn user_balance(&self, user_id: i64) -> StorageResult<Decimal> {
        self.user_balance_sync(user_id)
    }
}
