//! Small parsing and formatting helpers shared by the pipeline

pub mod format;
pub mod parse;

pub use format::{format_price_eok, format_rate};
pub use parse::{first_number, parse_amount, parse_deal_date};
