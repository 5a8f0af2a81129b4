mod dedup;
pub mod table;

pub use dedup::{merge_records, DedupStore, PersistOutcome};
