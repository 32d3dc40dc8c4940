pub use sea_orm_migration::prelude::*;

mod m20240901_000001_users_and_jobs;
mod m20240901_000002_candidate_sources;
mod m20240901_000003_candidates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_users_and_jobs::Migration),
            Box::new(m20240901_000002_candidate_sources::Migration),
            Box::new(m20240901_000003_candidates::Migration),
        ]
    }
}
