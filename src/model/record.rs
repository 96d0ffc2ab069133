use crate::error::Res;
use crate::model::{Amount, DecimalSeparator};
use anyhow::Context;
use chrono::{DateTime, NaiveDate};
use serde::{Serialize, Serializer};

/// The format of the `date` column in both outputs.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The column labels written to the header row of the worksheet. The third column is reserved and
/// always blank.
pub const HEADER: [&str; 5] = ["date", "category", "", "amount", "description"];

/// The ordered set of transactions extracted from the source database during one run.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Records {
    data: Vec<Record>,
}

impl Records {
    pub fn new(data: Vec<Record>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.data.iter()
    }

    pub fn last(&self) -> Option<&Record> {
        self.data.last()
    }

    /// Renders every record as one CSV line, joined by `\n` with no trailing newline. An empty
    /// set renders as an empty string.
    pub fn to_csv(&self, separator: DecimalSeparator) -> String {
        self.data
            .iter()
            .map(|r| r.to_csv_line(separator))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Converts every record into a row for the worksheet, in order.
    pub fn to_sheet_rows(&self) -> Vec<SheetRow> {
        self.data.iter().map(SheetRow::from).collect()
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// A single visible transaction from the source database.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    /// The original epoch-milliseconds timestamp, kept for ordering.
    timestamp: i64,
    #[serde(serialize_with = "serialize_dmy")]
    date: NaiveDate,
    category: Option<String>,
    amount: Amount,
    description: String,
}

impl Record {
    /// Builds a record from the raw values stored in the source database.
    ///
    /// - `timestamp_ms` is truncated toward zero to whole seconds before the UTC calendar date is
    ///   taken from it.
    /// - `debit` is in minor units and is divided by 100.
    /// - A `NULL` note becomes an empty description.
    pub fn from_source(
        timestamp_ms: i64,
        category: Option<String>,
        debit: i64,
        note: Option<String>,
    ) -> Res<Self> {
        let seconds = timestamp_ms / 1000;
        let date = DateTime::from_timestamp(seconds, 0)
            .with_context(|| format!("Timestamp {timestamp_ms} is out of range"))?
            .date_naive();
        Ok(Self {
            timestamp: timestamp_ms,
            date,
            category,
            amount: Amount::from_minor_units(debit),
            description: note.unwrap_or_default(),
        })
    }

    /// Builds a record directly from its formatted parts. The timestamp is set to midnight UTC of
    /// `date`.
    pub fn new(
        date: NaiveDate,
        category: Option<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        Self {
            timestamp,
            date,
            category,
            amount,
            description: description.into(),
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The date as `DD/MM/YYYY`.
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `date,"category",,"amount","description"`
    pub fn to_csv_line(&self, separator: DecimalSeparator) -> String {
        format!(
            "{},{},,{},{}",
            self.formatted_date(),
            quote(self.category().unwrap_or_default()),
            quote(&self.amount.format_with(separator)),
            quote(&self.description),
        )
    }
}

/// Wraps `s` in double quotes. Quotes inside `s` are written as they are.
fn quote(s: &str) -> String {
    format!("\"{s}\"")
}

/// One worksheet row. Serialized keys match `HEADER`, including the empty key of the reserved
/// column.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct SheetRow {
    pub date: String,
    pub category: String,
    #[serde(rename = "")]
    pub reserved: String,
    pub amount: String,
    pub description: String,
}

impl SheetRow {
    /// The cell values in `HEADER` order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.category.clone(),
            self.reserved.clone(),
            self.amount.clone(),
            self.description.clone(),
        ]
    }
}

impl From<&Record> for SheetRow {
    fn from(record: &Record) -> Self {
        Self {
            date: record.formatted_date(),
            category: record.category().unwrap_or_default().to_string(),
            reserved: String::new(),
            amount: record.amount().to_string(),
            description: record.description().to_string(),
        }
    }
}

/// Serializes a `NaiveDate` as `DD/MM/YYYY`.
fn serialize_dmy<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}
