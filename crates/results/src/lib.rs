//! SQLite test result databases: tagging and merging.
//!
//! Each CI run uploads one SQLite file with a `test_results` table. This
//! crate does the two things that happen to those files after download:
//!
//! - **Tagging** ([`tag`]): add `WorkflowID`, `OS` and `Go` columns to the
//!   table and fill every row with values parsed from the file name
//!   (`<runID>_<os>_<go>...`, see [`RunMetadata`]).
//! - **Merging** ([`Merger`]): clone the first file byte for byte, then copy
//!   every row of every other file into the clone, one transaction per file.
//!   The column list of each file is read from the file itself
//!   ([`Database::columns`]), never assumed.

mod db;
pub mod error;
mod merge;
pub mod sample;
mod schema;
mod tag;
mod value;

pub use crate::db::{Database, TABLE};
pub use crate::merge::{MergeSummary, Merger, SchemaPolicy};
pub use crate::schema::columns;
pub use crate::tag::{GO_COLUMN, OS_COLUMN, RunMetadata, WORKFLOW_ID_COLUMN, tag};
