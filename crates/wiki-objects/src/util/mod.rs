//! Utility modules.

pub mod datetime;

pub use datetime::{
    format_date, format_stored_date, parse_date, parse_stored_date, DEFAULT_DATE_FORMAT,
};
