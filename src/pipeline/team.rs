use tracing::{info, warn};

use super::weeks::remove_bad_weeks;
use crate::config::Config;
use crate::error::Result;
use crate::store::{ObjectStore, read_csv};
use crate::table::{Table, Value};

pub const TEAM_KEY: &str = "bengals.csv";
pub const RESULT_COLUMN: &str = "Result";

/// Maps the numeric `Result` flag to a label: `1.0` → `Win`, `0.0` → `Loss`.
///
/// Anything else is returned unchanged and logged.
pub fn recode_result(value: &Value) -> Value {
    match value.as_f64() {
        Some(v) if v == 1.0 => Value::from("Win"),
        Some(v) if v == 0.0 => Value::from("Loss"),
        _ => {
            warn!(value = %value, "Unmapped Result value passed through");
            value.clone()
        }
    }
}

/// Fetches the team CSV, drops bad weeks and recodes `Result`.
#[tracing::instrument(skip_all)]
pub async fn get_team_data<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Table> {
    info!(key = TEAM_KEY, "Getting team data");

    let raw = read_csv(store, TEAM_KEY).await?;
    let mut team = remove_bad_weeks(&raw, config.excluded_weeks.as_slice())?;
    team.map_column(RESULT_COLUMN, recode_result)?;

    Ok(team)
}
