mod memory;
mod models;
mod postgres;
mod sql;
mod store;

pub use self::{
    memory::MemoryStore,
    postgres::{DBPool, migrate, migrate_sql, new_db_pool},
    store::{AdminStore, ContactStore, NewsStore, Store},
};
