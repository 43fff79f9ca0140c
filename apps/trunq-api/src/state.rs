use std::sync::Arc;

use trunq_service::TrunqService;
use trunq_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TrunqService>,
}
impl AppState {
	/// Connects both stores, bootstraps their schemas, and wires the default providers.
	pub async fn new(config: trunq_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		Ok(Self::from_service(TrunqService::new(config, db, qdrant)?))
	}

	pub fn from_service(service: TrunqService) -> Self {
		Self { service: Arc::new(service) }
	}
}
