//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, SqlitePool};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The subset of the Expense Manager schema that the extractor reads, plus an unrelated column
/// and table to show they are ignored.
const EXPENSE_MANAGER_SCHEMA: &str = r#"
CREATE TABLE Category (
    id INTEGER PRIMARY KEY,
    name TEXT,
    color INTEGER
);
CREATE TABLE TransactionItem (
    id INTEGER PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    categoryId INTEGER,
    debit INTEGER NOT NULL,
    note TEXT,
    visible INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE Budget (
    id INTEGER PRIMARY KEY,
    amount INTEGER
);
INSERT INTO Category (id, name, color) VALUES (1, 'Food', 0), (2, 'Transport', 0);
"#;

/// One row for the `TransactionItem` table.
#[derive(Debug, Clone)]
pub(crate) struct TestItem {
    timestamp: i64,
    category_id: Option<i64>,
    debit: i64,
    note: String,
    visible: bool,
}

impl TestItem {
    pub(crate) fn new(timestamp: i64, category_id: Option<i64>, debit: i64, note: &str) -> Self {
        Self {
            timestamp,
            category_id,
            debit,
            note: note.to_string(),
            visible: true,
        }
    }

    /// Marks the item as soft-deleted.
    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A temporary Expense Manager database. Holds the `TempDir` to keep the file alive for the
/// duration of the test.
pub(crate) struct TestDb {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    /// Creates a database with the Expense Manager schema and two categories, `Food` (id 1) and
    /// `Transport` (id 2).
    pub(crate) async fn new() -> Self {
        Self::with_schema(EXPENSE_MANAGER_SCHEMA).await
    }

    /// Creates a database by running `schema`.
    pub(crate) async fn with_schema(schema: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup.expensemanager");
        let this = Self {
            _temp_dir: temp_dir,
            path,
        };
        let pool = this.writer(true).await;
        pool.execute(schema).await.unwrap();
        pool.close().await;
        this
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts `items` in order, so their storage order is the slice order.
    pub(crate) async fn insert_items(&self, items: &[TestItem]) {
        let pool = self.writer(false).await;
        for item in items {
            sqlx::query(
                "INSERT INTO TransactionItem (timestamp, categoryId, debit, note, visible) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(item.timestamp)
            .bind(item.category_id)
            .bind(item.debit)
            .bind(&item.note)
            .bind(i64::from(item.visible))
            .execute(&pool)
            .await
            .unwrap();
        }
        pool.close().await;
    }

    /// Inserts a visible item whose note is `NULL`.
    pub(crate) async fn insert_null_note(&self, timestamp: i64, debit: i64) {
        let pool = self.writer(false).await;
        sqlx::query(
            "INSERT INTO TransactionItem (timestamp, categoryId, debit, note, visible) \
             VALUES (?, NULL, ?, NULL, 1)",
        )
        .bind(timestamp)
        .bind(debit)
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    /// A handful of realistic entries, one of them hidden.
    pub(crate) async fn insert_sample(&self) {
        self.insert_items(&[
            TestItem::new(1_704_103_200_000, Some(1), 1050, "Lunch"),
            TestItem::new(1_704_189_600_000, Some(2), 275, "Bus ticket"),
            TestItem::new(1_704_189_600_000, None, 12000, "Concert \"front row\""),
            TestItem::new(1_704_276_000_000, Some(1), 899, "Deleted groceries").hidden(),
            TestItem::new(1_704_362_400_000, Some(1), 1200, ""),
        ])
        .await
    }

    /// Counts the rows flagged visible.
    pub(crate) async fn count_visible(&self) -> i64 {
        let pool = self.writer(false).await;
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM TransactionItem WHERE visible = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
        row.0
    }

    async fn writer(&self, create: bool) -> SqlitePool {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Delete);
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap()
    }
}
