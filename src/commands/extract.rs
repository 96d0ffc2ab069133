use crate::commands::Out;
use crate::db;
use crate::model::{DecimalSeparator, Records};
use crate::Result;
use std::path::Path;
use tracing::info;

/// Reads every visible transaction out of the Expense Manager database at `input`.
///
/// The returned `Out` carries the `Records`, which are then handed unchanged to each sink.
///
/// # Errors
/// - `SourceUnavailable` if `input` is not a readable SQLite file.
/// - `SchemaMismatch` if the database does not have the expected tables and columns.
pub async fn extract(input: &Path) -> Result<Out<Records>> {
    info!("Reading {}", input.display());
    let records = db::extract(input).await?;
    let message = match records.last() {
        Some(last) => format!(
            "Found {} entries. Last entry: {}",
            records.len(),
            last.to_csv_line(DecimalSeparator::Dot)
        ),
        None => "Found 0 entries.".to_string(),
    };
    Ok(Out::new(message, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestDb;

    #[tokio::test]
    async fn test_extract_reports_last_entry() {
        let test_db = TestDb::new().await;
        test_db.insert_sample().await;

        let out = extract(test_db.path()).await.unwrap();
        assert_eq!(
            r#"Found 4 entries. Last entry: 04/01/2024,"Food",,"12","""#,
            out.message()
        );
        assert_eq!(4, out.structure().unwrap().len());
    }

    #[tokio::test]
    async fn test_extract_empty_database() {
        let test_db = TestDb::new().await;
        let out = extract(test_db.path()).await.unwrap();
        assert_eq!("Found 0 entries.", out.message());
        assert!(out.into_structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_input() {
        let err = extract(Path::new("/definitely/not/here.expensemanager"))
            .await
            .unwrap_err();
        assert_eq!(ErrorType::SourceUnavailable, err.error_type());
    }
}
