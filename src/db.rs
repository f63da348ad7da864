//! Relational persistence: full-replace table writes, table reads and
//! ad-hoc query files.
//!
//! Connections go through the sqlx `Any` driver, so the connection string
//! picks the backend (`postgres://…` in production, `sqlite://…` in tests).
//! Each call opens one fresh connection and closes it before returning.

use std::path::Path;

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, Column, Connection, Row};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::table::{ColumnType, Table, Value};

async fn connect(url: &str) -> Result<AnyConnection> {
    sqlx::any::install_default_drivers();
    AnyConnection::connect(url).await.map_err(EtlError::Connection)
}

/// Quotes an identifier for use in SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .zip(table.column_types())
        .map(|(c, ty)| format!("{} {}", quote_ident(c), ty.sql()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", "))
}

fn insert_sql(name: &str, table: &Table) -> String {
    let columns: Vec<String> = table.columns().iter().map(|c| quote_ident(c)).collect();
    let params: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(name),
        columns.join(", "),
        params.join(", ")
    )
}

/// Replaces the table `name` with the contents of `table`. No index column
/// is written.
///
/// Drop, create and inserts run in one transaction on one connection; an
/// error rolls the transaction back when it is dropped.
#[tracing::instrument(skip(url, table), fields(rows = table.len()))]
pub async fn load_data_to_database(url: &str, table: &Table, name: &str) -> Result<()> {
    let mut conn = connect(url).await?;
    let types = table.column_types();

    let mut tx = conn.begin().await?;

    sqlx::query::<Any>(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))
        .execute(&mut *tx)
        .await?;
    sqlx::query::<Any>(&create_table_sql(name, table))
        .execute(&mut *tx)
        .await?;

    let insert = insert_sql(name, table);
    for row in table.rows() {
        let mut query = sqlx::query::<Any>(&insert);
        for (value, ty) in row.iter().zip(&types) {
            query = match ty {
                ColumnType::Integer => query.bind(match value {
                    Value::Int(i) => Some(*i),
                    _ => None,
                }),
                ColumnType::Float => query.bind(value.as_f64()),
                ColumnType::Text => query.bind(match value {
                    Value::Null => None,
                    other => Some(other.to_string()),
                }),
            };
        }
        query.execute(&mut *tx).await?;
    }

    tx.commit().await?;
    conn.close().await?;

    info!(table = name, rows = table.len(), "Table replaced");
    Ok(())
}

/// Reads the whole of table `name`.
#[tracing::instrument(skip(url))]
pub async fn view_table(url: &str, name: &str) -> Result<Table> {
    fetch_table(url, &format!("SELECT * FROM {}", quote_ident(name))).await
}

/// Executes the SQL in the file at `path` verbatim and returns its rows.
#[tracing::instrument(skip(url, path), fields(path = %path.as_ref().display()))]
pub async fn run_query_file(url: &str, path: impl AsRef<Path>) -> Result<Table> {
    let sql = std::fs::read_to_string(path.as_ref())?;
    fetch_table(url, &sql).await
}

async fn fetch_table(url: &str, sql: &str) -> Result<Table> {
    let mut conn = connect(url).await?;

    let rows = sqlx::query::<Any>(sql).fetch_all(&mut conn).await?;
    conn.close().await?;

    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => Vec::new(),
    };
    let mut table = Table::new(columns);
    for row in &rows {
        table.push_row(decode_row(row));
    }

    debug!(rows = table.len(), "Query returned");
    Ok(table)
}

fn decode_row(row: &AnyRow) -> Vec<Value> {
    (0..row.len()).map(|i| decode_cell(row, i)).collect()
}

fn decode_cell(row: &AnyRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::Int).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(|i| Value::Int(i64::from(i))).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::Float).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::Text).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(|b| Value::Int(i64::from(b))).unwrap_or(Value::Null);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Week".into(), "Result".into(), "Yards Boyd".into()]);
        table.push_row(vec!["REG1".into(), "Win".into(), Value::Float(12.0)]);
        table.push_row(vec!["REG2".into(), "Loss".into(), Value::Int(0)]);
        table
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("Yards Boyd"), "\"Yards Boyd\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_create_table_sql_uses_inferred_types() {
        assert_eq!(
            create_table_sql("drew_ringo", &sample()),
            "CREATE TABLE \"drew_ringo\" (\"Week\" TEXT, \"Result\" TEXT, \"Yards Boyd\" DOUBLE PRECISION)"
        );
    }

    #[test]
    fn test_insert_sql_numbers_parameters() {
        assert_eq!(
            insert_sql("t", &sample()),
            "INSERT INTO \"t\" (\"Week\", \"Result\", \"Yards Boyd\") VALUES ($1, $2, $3)"
        );
    }

    #[tokio::test]
    async fn test_connect_invalid_url_is_connection_error() {
        let err = load_data_to_database("notadb://nowhere", &sample(), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::Connection(_)));
    }
}
