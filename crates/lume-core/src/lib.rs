//! Core logic for lume time reports.
//!
//! This crate contains:
//! - Ingestion: timewarrior `*.data` files and the extension stdin protocol
//! - Aggregation: day, week, month, year and range reports
//! - Categorization: splitting tasks into dev, meetings, knowledge and misc
//!
//! Every operation takes its inputs explicitly (entries, period selector,
//! observer time zone, "now"); nothing reads ambient state.

mod aggregate;
pub mod category;
pub mod datafile;
pub mod entry;
pub mod protocol;
pub mod report;

pub use aggregate::{
    NO_DESCRIPTION, PeriodError, UNTAGGED, day_report, month_report, range_report, week_report,
    week_start, year_report, year_reports,
};
pub use category::{Categorized, Category, categorize};
pub use datafile::{IngestError, parse_data_dir};
pub use entry::{Entry, EntryError, parse_timestamp};
pub use protocol::{ExtensionInput, ProtocolError, TimewConfig, parse_extension_input};
pub use report::{
    DayReport, DayTotals, MonthData, RangeReport, TaskSummary, WeekData, YearReport, ms_to_hours,
};
