use tracing::debug;

use crate::error::Result;
use crate::table::{Table, Value};

pub const WEEK_COLUMN: &str = "Week";

/// Drops every row whose `Week` label is in `excluded` (bye weeks and
/// anomalous weeks). Kept rows stay in their original order.
///
/// # Errors
///
/// Returns [`crate::error::EtlError::MissingColumn`] if the table has no
/// `Week` column.
pub fn remove_bad_weeks<S: AsRef<str>>(table: &Table, excluded: &[S]) -> Result<Table> {
    let idx = table.require_column(WEEK_COLUMN)?;

    let filtered = table.filter_rows(|row| !is_excluded(&row[idx], excluded));

    debug!(
        before = table.len(),
        after = filtered.len(),
        "Removed bad weeks"
    );
    Ok(filtered)
}

fn is_excluded<S: AsRef<str>>(week: &Value, excluded: &[S]) -> bool {
    let label = week.to_string();
    excluded.iter().any(|w| w.as_ref() == label)
}
