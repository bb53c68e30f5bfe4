//! Column Schema Module
//!
//! Maps the archive's flat column axis onto named, grouped columns.
//!
//! # Layout Contract
//!
//! ```text
//! third axis of `data`:
//! ┌──────────────────┬────────────────────────┬───────────────────────┐
//! │ depth_<d> × D    │ dynamic features × F_d │ static features × F_s │
//! └──────────────────┴────────────────────────┴───────────────────────┘
//! ```
//!
//! The ordering is fixed by the producer of the archive; it is never inferred.
//!
//! # Example
//!
//! ```
//! use sequence_loader::schema::{ColumnGroup, ColumnSchema};
//!
//! let schema = ColumnSchema::new(
//!     &[5.0, 10.0],
//!     &["wind".to_string()],
//!     &["area".to_string()],
//! );
//! assert_eq!(schema.resolve("depth_10").unwrap(), 1);
//! assert_eq!(schema.get("area").unwrap().group, ColumnGroup::Static);
//! ```

mod column;
mod depth;
mod selection;

pub use column::{ColumnDef, ColumnGroup, ColumnSchema};
pub use depth::{depth_column_name, format_depth, DEPTH_PREFIX};
pub use selection::{FeatureSelection, ResolvedColumns};
