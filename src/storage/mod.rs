//! redb-backed tables for the local development backend.

mod accounts;
mod anime;
pub mod db;
pub mod models;
mod photos;
mod tables;

pub use db::{Database, DatabaseError};
pub use tables::*;
