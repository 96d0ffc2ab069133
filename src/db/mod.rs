//! This module is responsible for reading transactions out of an Expense Manager SQLite export.
//!
//! The source file is only ever opened read-only. Nothing here writes to it.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Record, Records};
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// The tables and columns that the extraction query depends on.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "TransactionItem",
        &["timestamp", "categoryId", "debit", "note", "visible"],
    ),
    ("Category", &["id", "name"]),
];

/// Selects every visible transaction with its (optional) category name, oldest first. Entries
/// sharing a timestamp keep their storage order.
const EXTRACT_SQL: &str = r#"
SELECT
    TransactionItem.timestamp AS timestamp,
    Category.name AS category,
    TransactionItem.debit AS debit,
    TransactionItem.note AS note
FROM TransactionItem
LEFT JOIN Category ON TransactionItem.categoryId = Category.id
WHERE TransactionItem.visible = 1
ORDER BY TransactionItem.timestamp, TransactionItem.rowid
"#;

/// A read-only handle to the source database.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    path: PathBuf,
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a file at `path`
    /// - Opens it read-only, never creating it
    /// - Checks that the file really is an SQLite database
    ///
    /// # Errors
    /// - `SourceUnavailable` if any of the above fails.
    pub(crate) async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::open_inner(path)
            .await
            .with_context(|| format!("Unable to open the source database {}", path.display()))
            .pub_result(ErrorType::SourceUnavailable)
    }

    async fn open_inner(path: &Path) -> Res<Self> {
        if !path.is_file() {
            bail!("No file exists at '{}'", path.display());
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        // Opening succeeds lazily for files that are not databases, so touch the schema.
        let _: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master")
            .fetch_one(&pool)
            .await
            .context("The file is not a readable SQLite database")?;

        debug!("Opened {} read-only", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Checks that every table and column the extraction query needs is present.
    ///
    /// # Errors
    /// - `SchemaMismatch` naming each missing table or column.
    pub(crate) async fn validate_schema(&self) -> Result<()> {
        self.validate_schema_inner()
            .await
            .with_context(|| {
                format!(
                    "'{}' does not look like an Expense Manager database",
                    self.path.display()
                )
            })
            .pub_result(ErrorType::SchemaMismatch)
    }

    async fn validate_schema_inner(&self) -> Res<()> {
        let mut problems = Vec::new();
        for (table, columns) in REQUIRED_SCHEMA {
            let found = self.columns(table).await?;
            if found.is_empty() {
                problems.push(format!("missing table {table}"));
                continue;
            }
            for column in columns.iter() {
                if !found.iter().any(|f| f.eq_ignore_ascii_case(column)) {
                    problems.push(format!("missing column {table}.{column}"));
                }
            }
        }
        if !problems.is_empty() {
            bail!("{}", problems.join(", "));
        }
        Ok(())
    }

    /// Returns the column names of `table`, or an empty list if the table does not exist.
    async fn columns(&self, table: &str) -> Res<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM pragma_table_info(?1)")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to read the columns of {table}"))?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Runs the extraction query and converts each row into a `Record`.
    ///
    /// # Errors
    /// - `SchemaMismatch` if the query fails or a row holds values of an unexpected type.
    pub(crate) async fn records(&self) -> Result<Records> {
        self.records_inner()
            .await
            .context("Unable to read transactions from the source database")
            .pub_result(ErrorType::SchemaMismatch)
    }

    async fn records_inner(&self) -> Res<Records> {
        let rows: Vec<(i64, Option<String>, i64, Option<String>)> = sqlx::query_as(EXTRACT_SQL)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query TransactionItem")?;
        trace!("Query returned {} rows", rows.len());

        let data = rows
            .into_iter()
            .map(|(timestamp, category, debit, note)| {
                Record::from_source(timestamp, category, debit, note)
            })
            .collect::<Res<Vec<_>>>()?;
        Ok(Records::new(data))
    }

    /// Closes the connection pool.
    pub(crate) async fn close(self) {
        self.pool.close().await
    }
}

/// Opens the source database at `path`, validates it, extracts every visible transaction and
/// closes the database again.
pub(crate) async fn extract(path: impl AsRef<Path>) -> Result<Records> {
    let db = Db::open(path).await?;
    db.validate_schema().await?;
    let records = db.records().await?;
    db.close().await;
    Ok(records)
}
