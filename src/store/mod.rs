//! Object store access.
//!
//! [`ObjectStore`] is the async seam every CSV read goes through.
//! [`S3Store`] reads from an S3 bucket, [`MemoryStore`] serves objects held
//! in memory (tests, offline runs from a local directory).

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;
use crate::table::Table;

/// Fetches whole objects by key.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, key: &str) -> Result<Bytes>;
}

/// Fetches `key` and parses it as a CSV table whose first line is the header.
#[tracing::instrument(skip(store))]
pub async fn read_csv<S: ObjectStore + ?Sized>(store: &S, key: &str) -> Result<Table> {
    let bytes = store.get_object(key).await?;
    let table = Table::from_csv(&bytes)?;
    debug!(rows = table.len(), columns = table.columns().len(), "CSV object parsed");
    Ok(table)
}
