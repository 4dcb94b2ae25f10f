pub mod postgres_store;
pub mod row_store;
pub mod sqlite_store;

pub use postgres_store::PostgresStore;
pub use row_store::{RowStore, StoreError};
pub use sqlite_store::SqliteStore;
