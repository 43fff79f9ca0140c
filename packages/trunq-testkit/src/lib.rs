//! Throwaway Postgres databases and Qdrant collections for integration tests.
//!
//! Tests that need live backends read `TRUNQ_PG_DSN` and `TRUNQ_QDRANT_URL` and are marked
//! `#[ignore]` so the default test run stays hermetic.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, time::Duration};

use qdrant_client::Qdrant;
use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::time;
use uuid::Uuid;

const ADMIN_DATABASE: &str = "postgres";
const QDRANT_TIMEOUT: Duration = Duration::from_secs(10);

/// A freshly created database named `trunq_test_<uuid>`, dropped by [`TestDatabase::cleanup`].
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
	collections: Vec<String>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::InvalidDsn { message: err.to_string() })?;
		let admin_options = base_options.clone().database(ADMIN_DATABASE);
		let mut admin_conn = PgConnection::connect_with(&admin_options).await?;
		let name = format!("trunq_test_{}", Uuid::new_v4().simple());

		admin_conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin_options, collections: Vec::new() })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Returns a collection name unique to this database and remembers it for cleanup.
	pub fn collection_name(&mut self, prefix: &str) -> String {
		let collection = format!("{prefix}_{}", self.name);

		if !self.collections.contains(&collection) {
			self.collections.push(collection.clone());
		}

		collection
	}

	pub async fn cleanup(self) -> Result<()> {
		let qdrant_result = drop_collections(&self.collections).await;
		let mut conn = PgConnection::connect_with(&self.admin_options).await?;

		sqlx::query(
			"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(self.name.as_str())
		.fetch_all(&mut conn)
		.await?;
		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str()).await?;

		qdrant_result
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("TRUNQ_PG_DSN").ok()
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("TRUNQ_QDRANT_URL").ok()
}

async fn drop_collections(collections: &[String]) -> Result<()> {
	if collections.is_empty() {
		return Ok(());
	}

	let Some(url) = env_qdrant_url() else {
		eprintln!("Skipping Qdrant cleanup; set TRUNQ_QDRANT_URL to delete test collections.");

		return Ok(());
	};
	let client = Qdrant::from_url(&url).build()?;

	for collection in collections {
		time::timeout(QDRANT_TIMEOUT, client.delete_collection(collection.clone()))
			.await
			.map_err(|_| Error::CleanupTimeout { collection: collection.clone() })??;
	}

	Ok(())
}
