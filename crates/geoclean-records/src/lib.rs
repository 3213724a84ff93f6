//! Competition-record CSV filtering: column selection and country/state row filters.

mod error;
pub mod filter;

pub use error::RecordsError;
pub use filter::{RecordFilter, RecordStats, filter_records};
