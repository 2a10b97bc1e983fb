//! Database bootstrap shared by every crate

pub mod init;

pub use init::{connect_in_memory, create_schema, init_database};
