mod answers;
mod classify;
mod content_hash;
mod db_setup;
mod discovery;
mod loader;
mod pipeline;
mod repository;
mod run;
mod types;

pub use run::run;
pub(crate) use db_setup::{DB_SCHEMA_VERSION, count_rows};
