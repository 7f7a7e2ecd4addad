use std::sync::Arc;

use tooldeck_service::CatalogService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CatalogService>,
}
impl AppState {
	pub fn new(config: tooldeck_config::Config) -> color_eyre::Result<Self> {
		let service = CatalogService::from_config(config)?;

		Ok(Self::from_service(Arc::new(service)))
	}

	pub fn from_service(service: Arc<CatalogService>) -> Self {
		Self { service }
	}
}
