//! Shared fixtures for the Postgres-backed suites.
//!
//! `TEST_DATABASE_URL` names a server and a base database. Each [`PgTestContext`] gets
//! its own scratch database on that server, migrated and seeded, and dropped again in
//! [`PgTestContext::cleanup`]. Without the variable the suites are skipped; with it,
//! any setup failure fails the test.

use std::sync::Arc;

use async_graphql::{Request, Response};
use migration::{Migrator, MigratorTrait};
use products_talent::cv_token::JwtTokenProvider;
use products_talent::seed::{SeededRecords, seed_demo};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use talent_server::graphql::{GraphqlData, RequestUser, SchemaType, build_schema};
use url::Url;
use uuid::Uuid;

pub const TEST_TOKEN_SECRET: &str = "integration-secret";
pub const TEST_CV_BASE_URL: &str = "https://cv.test/";

const DATABASE_URL_VAR: &str = "TEST_DATABASE_URL";

/// A uniquely named database on the test server.
struct ScratchDatabase {
    maintenance_url: String,
    name: String,
    url: String,
}

impl ScratchDatabase {
    fn plan(base: &str) -> Self {
        let base_url = Url::parse(base)
            .unwrap_or_else(|err| panic!("{DATABASE_URL_VAR} is not a valid URL: {err}"));
        let prefix = match base_url.path().trim_start_matches('/') {
            "" => "talent_test",
            name => name,
        };
        let name = format!("{prefix}_{}", Uuid::new_v4().simple());

        let mut maintenance = base_url.clone();
        maintenance.set_path("/postgres");
        let mut scratch = base_url;
        scratch.set_path(&format!("/{name}"));
        Self {
            maintenance_url: maintenance.into(),
            name,
            url: scratch.into(),
        }
    }

    async fn create(&self) -> Result<DatabaseConnection, DbErr> {
        let server = Database::connect(&self.maintenance_url).await?;
        server
            .execute_unprepared(&format!("CREATE DATABASE \"{}\"", self.name))
            .await?;
        Database::connect(&self.url).await
    }

    async fn drop_now(&self) -> Result<(), DbErr> {
        let server = Database::connect(&self.maintenance_url).await?;
        server
            .execute_unprepared(&format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.name
            ))
            .await?;
        Ok(())
    }
}

pub struct PgTestContext {
    pub db: Arc<DatabaseConnection>,
    pub schema: SchemaType,
    pub seeded: SeededRecords,
    scratch: ScratchDatabase,
}

impl PgTestContext {
    /// `None` only when no test server is configured.
    pub async fn new_seeded() -> Option<Self> {
        let Ok(base) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("skipping Postgres suite: {DATABASE_URL_VAR} is not set");
            return None;
        };
        let scratch = ScratchDatabase::plan(&base);
        let conn = scratch
            .create()
            .await
            .unwrap_or_else(|err| panic!("creating {}: {err}", scratch.name));
        Migrator::up(&conn, None)
            .await
            .unwrap_or_else(|err| panic!("migrating {}: {err}", scratch.name));
        let seeded = seed_demo(&conn)
            .await
            .unwrap_or_else(|err| panic!("seeding {}: {err:?}", scratch.name));

        let db = Arc::new(conn);
        let schema = build_schema(GraphqlData {
            db: db.clone(),
            tokens: Arc::new(JwtTokenProvider::new(TEST_TOKEN_SECRET)),
            public_cv_base_url: TEST_CV_BASE_URL.into(),
        });
        Some(Self {
            db,
            schema,
            seeded,
            scratch,
        })
    }

    /// Run `request` with `user_id` as the caller.
    pub async fn execute_as(&self, user_id: i64, request: impl Into<Request>) -> Response {
        self.schema
            .execute(request.into().data(RequestUser { id: user_id }))
            .await
    }

    pub async fn cleanup(self) {
        let Self {
            db, schema, scratch, ..
        } = self;
        drop(schema);
        drop(db);
        if let Err(err) = scratch.drop_now().await {
            eprintln!("leaving scratch database {} behind: {err}", scratch.name);
        }
    }
}
