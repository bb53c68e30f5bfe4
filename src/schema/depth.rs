//! Depth identifier → column name formatting.
//!
//! Archives name their target columns by depth. The same rule is applied to
//! the archive's `depths_all` entries and to caller-requested depths, so the
//! two sides always agree regardless of whether the depth was stored as an
//! integer or a float.
//!
//! # Format
//!
//! | Depth value | Column name |
//! |-------------|-------------|
//! | `10` (int)  | `depth_10`  |
//! | `10.0`      | `depth_10`  |
//! | `0.5`       | `depth_0.5` |
//! | `-0.0`      | `depth_0`   |
//!
//! Values are rendered with the shortest decimal form that round-trips, and
//! integral values carry no fractional part.

/// Prefix shared by every target column name.
pub const DEPTH_PREFIX: &str = "depth_";

/// Render a depth value using the canonical decimal form.
pub fn format_depth(depth: f64) -> String {
    // -0.0 would otherwise render as "-0"
    if depth == 0.0 {
        return "0".to_string();
    }
    format!("{depth}")
}

/// Build the target column name for a depth.
///
/// # Example
///
/// ```
/// use sequence_loader::schema::depth_column_name;
///
/// assert_eq!(depth_column_name(10.0), "depth_10");
/// assert_eq!(depth_column_name(1.5), "depth_1.5");
/// ```
pub fn depth_column_name(depth: f64) -> String {
    format!("{DEPTH_PREFIX}{}", format_depth(depth))
}
