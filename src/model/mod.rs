//! Types that represent the core data model: the extracted `Record`s and the `Amount` type, along
//! with the CSV and worksheet-row renderings of them.
mod amount;
mod record;

pub use amount::{Amount, DecimalSeparator};
pub use record::{Record, Records, SheetRow, DATE_FORMAT, HEADER};
