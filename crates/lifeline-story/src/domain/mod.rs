//! Story graph model and on-disk records.

pub mod graph;
pub mod record;
