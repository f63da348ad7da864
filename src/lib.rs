pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod table;

pub use config::Config;
pub use error::{EtlError, Result};
pub use table::{Table, Value};

use store::ObjectStore;
use tracing::info;

/// One full run: fetch and clean team and receiver data, join them, and
/// overwrite `config.dest_table`. Returns the table that was written.
pub async fn run<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Table> {
    info!("Getting Bengals data");
    let data = pipeline::get_bengals_data(store, config).await?;

    info!(table = %config.dest_table, "Loading to database");
    db::load_data_to_database(&config.db_connection_string, &data, &config.dest_table).await?;

    Ok(data)
}
