use std::collections::HashMap;

use tracing::{debug, info};

use super::receivers::get_receiver_data;
use super::team::get_team_data;
use super::weeks::WEEK_COLUMN;
use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::store::ObjectStore;
use crate::table::{Table, Value};

/// Left-joins `right` onto `left` by `Week`.
///
/// Every left row is kept in order; right columns other than `Week` are
/// appended. Weeks missing on the right, and any other null cell, become zero.
pub fn left_join(left: &Table, right: &Table) -> Result<Table> {
    let left_week = left.require_column(WEEK_COLUMN)?;
    let right_week = right.require_column(WEEK_COLUMN)?;

    let right_cols: Vec<usize> = (0..right.columns().len())
        .filter(|&i| i != right_week)
        .collect();

    let mut columns = left.columns().to_vec();
    for &i in &right_cols {
        let name = &right.columns()[i];
        if left.column_index(name).is_some() {
            return Err(EtlError::SchemaMismatch(format!(
                "column '{name}' present on both sides of the join"
            )));
        }
        columns.push(name.clone());
    }

    let mut by_week: HashMap<String, &[Value]> = HashMap::new();
    for row in right.rows() {
        by_week.entry(row[right_week].to_string()).or_insert(row.as_slice());
    }

    let mut joined = Table::new(columns);
    for row in left.rows() {
        let mut out = row.clone();
        match by_week.get(&row[left_week].to_string()) {
            Some(matched) => out.extend(right_cols.iter().map(|&i| matched[i].clone())),
            None => out.extend(right_cols.iter().map(|_| Value::Null)),
        }
        joined.push_row(out);
    }
    joined.fill_null(Value::Int(0));

    debug!(rows = joined.len(), columns = joined.columns().len(), "Joined team and receiver data");
    Ok(joined)
}

/// Runs the extract/transform half of the pipeline: team data left-joined
/// with the wide receiver table.
#[tracing::instrument(skip_all)]
pub async fn get_bengals_data<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Table> {
    let team = get_team_data(store, config).await?;
    let receivers = get_receiver_data(store, config).await?;

    info!(team_rows = team.len(), receiver_weeks = receivers.len(), "Joining team and receiver data");
    left_join(&team, &receivers)
}
