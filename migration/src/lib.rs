pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261019_000001_urls_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261019_000001_urls_table::Migration)]
    }
}
