use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info};

use super::weeks::{WEEK_COLUMN, remove_bad_weeks};
use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::store::{ObjectStore, read_csv};
use crate::table::{Table, Value};

/// One CSV object per receiver; the player name comes from the file name.
pub const RECEIVER_KEYS: &[&str] = &[
    "boyd_receiving.csv",
    "chase_receiving.csv",
    "higgins_receiving.csv",
];

pub const PLAYER_COLUMN: &str = "player_name";

/// Stats spread into one column per player, in output order.
pub const STAT_COLUMNS: &[&str] = &["Yards", "TD"];

/// Derives a player name from an object key: the text before the first
/// underscore, title-cased (`"boyd_receiving.csv"` → `"Boyd"`).
pub fn player_name(key: &str) -> String {
    let stem = key.split('_').next().unwrap_or(key);
    title_case(stem)
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Fetches one receiver's CSV, tags it with the player name and drops bad weeks.
#[tracing::instrument(skip(store, excluded))]
pub async fn process_receiver<S, W>(store: &S, key: &str, excluded: &[W]) -> Result<Table>
where
    S: ObjectStore + ?Sized,
    W: AsRef<str> + Send + Sync,
{
    let raw = read_csv(store, key).await?;
    let tagged = raw.with_constant_column(PLAYER_COLUMN, Value::Text(player_name(key)));
    remove_bad_weeks(&tagged, excluded)
}

/// Stacks tables row-wise. Every table must carry the same set of columns
/// as the first one; columns are aligned by name.
pub fn union(tables: &[Table]) -> Result<Table> {
    let Some(first) = tables.first() else {
        return Ok(Table::default());
    };

    let expected: BTreeSet<&str> = first.columns().iter().map(String::as_str).collect();
    let mut out = Table::new(first.columns().to_vec());

    for (i, table) in tables.iter().enumerate() {
        let found: BTreeSet<&str> = table.columns().iter().map(String::as_str).collect();
        if found != expected {
            return Err(EtlError::SchemaMismatch(format!(
                "table {i} has columns {:?}, expected {:?}",
                table.columns(),
                first.columns()
            )));
        }

        let order: Vec<usize> = first
            .columns()
            .iter()
            .map(|c| table.require_column(c))
            .collect::<Result<_>>()?;

        for row in table.rows() {
            out.push_row(order.iter().map(|&idx| row[idx].clone()).collect());
        }
    }

    Ok(out)
}

/// Pivots the unioned receiver rows into one row per week with a
/// `"<Stat> <Player>"` column for each stat and player.
///
/// Weeks appear in the order they are first seen. Players are sorted by
/// name within each stat. A week/player pair absent from the input is zero.
pub fn pivot(all: &Table) -> Result<Table> {
    let week_idx = all.require_column(WEEK_COLUMN)?;
    let player_idx = all.require_column(PLAYER_COLUMN)?;
    let stat_idx: Vec<usize> = STAT_COLUMNS
        .iter()
        .map(|s| all.require_column(s))
        .collect::<Result<_>>()?;

    let mut weeks: Vec<String> = Vec::new();
    let mut seen_weeks: HashSet<String> = HashSet::new();
    let mut players: BTreeSet<String> = BTreeSet::new();
    let mut cells: HashMap<(String, String), &[Value]> = HashMap::new();

    for row in all.rows() {
        let week = row[week_idx].to_string();
        let player = row[player_idx].to_string();

        if seen_weeks.insert(week.clone()) {
            weeks.push(week.clone());
        }
        players.insert(player.clone());

        if cells.insert((week.clone(), player.clone()), row.as_slice()).is_some() {
            return Err(EtlError::DuplicateEntry { week, player });
        }
    }

    let mut columns = vec![WEEK_COLUMN.to_string()];
    for stat in STAT_COLUMNS {
        for player in &players {
            columns.push(format!("{stat} {player}"));
        }
    }
    let mut wide = Table::new(columns);

    for week in &weeks {
        let mut row = vec![Value::Text(week.clone())];
        for &idx in &stat_idx {
            for player in &players {
                let cell = cells
                    .get(&(week.clone(), player.clone()))
                    .map(|r| r[idx].clone())
                    .filter(|v| !v.is_null())
                    .unwrap_or(Value::Int(0));
                row.push(cell);
            }
        }
        wide.push_row(row);
    }

    debug!(weeks = wide.len(), players = players.len(), "Pivoted receiver data");
    Ok(wide)
}

/// Fetches every receiver in [`RECEIVER_KEYS`] in turn and returns the wide
/// receiver table.
#[tracing::instrument(skip_all)]
pub async fn get_receiver_data<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Table> {
    info!(receivers = RECEIVER_KEYS.len(), "Getting receiver data");

    let mut per_player = Vec::with_capacity(RECEIVER_KEYS.len());
    for key in RECEIVER_KEYS {
        per_player.push(process_receiver(store, key, config.excluded_weeks.as_slice()).await?);
    }

    let all = union(&per_player)?;
    pivot(&all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_table(player: &str, rows: &[(&str, i64, i64)]) -> Table {
        let mut table = Table::new(vec![
            "Week".into(),
            "Yards".into(),
            "TD".into(),
            PLAYER_COLUMN.into(),
        ]);
        for (week, yards, td) in rows {
            table.push_row(vec![
                Value::from(*week),
                Value::Int(*yards),
                Value::Int(*td),
                Value::from(player),
            ]);
        }
        table
    }

    fn cell<'a>(table: &'a Table, row: usize, column: &str) -> &'a Value {
        &table.rows()[row][table.require_column(column).unwrap()]
    }

    #[test]
    fn test_player_name_from_key() {
        assert_eq!(player_name("boyd_receiving.csv"), "Boyd");
        assert_eq!(player_name("HIGGINS_receiving.csv"), "Higgins");
        assert_eq!(player_name("chase.csv"), "Chase.Csv");
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let a = player_table("A", &[("REG6", 50, 1)]);
        let b = player_table("B", &[("REG7", 30, 0)]);

        let wide = pivot(&union(&[a, b]).unwrap()).unwrap();

        assert_eq!(wide.columns(), &["Week", "Yards A", "Yards B", "TD A", "TD B"]);
        assert_eq!(wide.len(), 2);
        assert_eq!(cell(&wide, 0, "Week"), &Value::from("REG6"));
        assert_eq!(cell(&wide, 0, "Yards A"), &Value::Int(50));
        assert_eq!(cell(&wide, 0, "Yards B"), &Value::Int(0));
        assert_eq!(cell(&wide, 1, "Week"), &Value::from("REG7"));
        assert_eq!(cell(&wide, 1, "Yards A"), &Value::Int(0));
        assert_eq!(cell(&wide, 1, "Yards B"), &Value::Int(30));
    }

    #[test]
    fn test_pivot_overlapping_weeks_single_row() {
        let a = player_table("Boyd", &[("REG1", 10, 0), ("REG2", 20, 1)]);
        let b = player_table("Chase", &[("REG2", 100, 2), ("REG3", 5, 0)]);

        let wide = pivot(&union(&[a, b]).unwrap()).unwrap();

        assert_eq!(wide.len(), 3);
        assert_eq!(cell(&wide, 1, "Week"), &Value::from("REG2"));
        assert_eq!(cell(&wide, 1, "Yards Boyd"), &Value::Int(20));
        assert_eq!(cell(&wide, 1, "TD Chase"), &Value::Int(2));
        assert_eq!(cell(&wide, 2, "TD Boyd"), &Value::Int(0));
    }

    #[test]
    fn test_pivot_null_cell_becomes_zero() {
        let mut a = player_table("A", &[]);
        a.push_row(vec!["REG1".into(), Value::Null, Value::Int(1), "A".into()]);

        let wide = pivot(&a).unwrap();
        assert_eq!(cell(&wide, 0, "Yards A"), &Value::Int(0));
        assert_eq!(cell(&wide, 0, "TD A"), &Value::Int(1));
    }

    #[test]
    fn test_pivot_duplicate_week_for_player() {
        let a = player_table("A", &[("REG1", 1, 0), ("REG1", 2, 0)]);

        assert!(matches!(
            pivot(&a),
            Err(EtlError::DuplicateEntry { ref week, ref player }) if week == "REG1" && player == "A"
        ));
    }

    #[test]
    fn test_union_aligns_columns_by_name() {
        let a = player_table("A", &[("REG1", 1, 0)]);
        let mut b = Table::new(vec![
            "TD".into(),
            "Week".into(),
            PLAYER_COLUMN.into(),
            "Yards".into(),
        ]);
        b.push_row(vec![Value::Int(3), "REG2".into(), "B".into(), Value::Int(70)]);

        let all = union(&[a, b]).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(cell(&all, 1, "Yards"), &Value::Int(70));
        assert_eq!(cell(&all, 1, "TD"), &Value::Int(3));
    }

    #[test]
    fn test_union_schema_mismatch() {
        let a = player_table("A", &[("REG1", 1, 0)]);
        let b = Table::new(vec!["Week".into(), "Yards".into(), PLAYER_COLUMN.into()]);

        assert!(matches!(union(&[a, b]), Err(EtlError::SchemaMismatch(_))));
    }

    #[test]
    fn test_pivot_requires_stat_columns() {
        let t = Table::new(vec!["Week".into(), "Yards".into(), PLAYER_COLUMN.into()]);

        assert!(matches!(pivot(&t), Err(EtlError::MissingColumn(ref c)) if c == "TD"));
    }

    #[test]
    fn test_pivot_missing_markers_become_zero() {
        let raw = Table::from_csv(b"Week,Yards,TD\nREG1,NA,0\nREG2,10,N/A\n").unwrap();
        let tagged = raw.with_constant_column(PLAYER_COLUMN, Value::from("Boyd"));

        let wide = pivot(&tagged).unwrap();

        assert_eq!(cell(&wide, 0, "Yards Boyd"), &Value::Int(0));
        assert_eq!(cell(&wide, 1, "Yards Boyd"), &Value::Int(10));
        assert_eq!(cell(&wide, 1, "TD Boyd"), &Value::Int(0));
    }

    #[test]
    fn test_pivot_week_order_is_first_seen() {
        let a = player_table("A", &[("REG3", 1, 0), ("REG1", 1, 0), ("REG2", 1, 0)]);
        let b = player_table("B", &[("REG2", 1, 0), ("REG4", 1, 0), ("REG3", 1, 0)]);
        let c = player_table("C", &[("REG1", 1, 0), ("REG4", 1, 0)]);

        let wide = pivot(&union(&[a, b, c]).unwrap()).unwrap();

        let weeks: Vec<String> = wide
            .column_values("Week")
            .unwrap()
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(weeks, vec!["REG3", "REG1", "REG2", "REG4"]);
    }
}
