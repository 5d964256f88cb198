//! Serves the token endpoints on `127.0.0.1:8080` with one registered owner.
//!
//! ```sh
//! cargo run --example serve
//! curl -si -d 'grant_type=basic-credentials&client_id=&client_secret=&username=demo&password=demo&scope=read' \
//!   http://127.0.0.1:8080/oauth/token
//! ```

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use oauth2_provider::{
	auth::{MemoryDirectory, OwnerDirectory, Username},
	config::ProviderConfig,
	controller::AuthorizationController,
	http,
	service::DefaultAuthorizationService,
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let config = ProviderConfig::builder().token_lifetime(time::Duration::minutes(15)).build()?;
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let directory = MemoryDirectory::default();

	directory.register(Username::new("demo")?, "demo")?;

	let directory: Arc<dyn OwnerDirectory> = Arc::new(directory);
	let service = Arc::new(DefaultAuthorizationService::new(config.clone(), store, directory));
	let sweeper = service.clone();

	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(StdDuration::from_secs(60));

		loop {
			ticker.tick().await;

			if let Err(e) = sweeper.purge_expired().await {
				tracing::warn!(error = %e, "Expired token sweep failed.");
			}
		}
	});

	let controller = AuthorizationController::new(config, service);
	let app = http::router(controller);
	let listener = TcpListener::bind("127.0.0.1:8080").await?;

	tracing::info!(addr = %listener.local_addr()?, "Token endpoints listening.");

	axum::serve(listener, app).await?;

	Ok(())
}
