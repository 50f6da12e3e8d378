//! SQLite database module for the Fair Payment Engine.
//!
//! The schema lives in `migrations/` and is embedded into the binary. [`SqliteDatabase::migrate`] brings a database up
//! to date.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
