// std
use std::{net::SocketAddr, sync::Arc};
// crates.io
use reqwest::{Client, StatusCode, header};
use tokio::{net::TcpListener, task::JoinHandle};
// self
use oauth2_provider::{
	auth::{MemoryDirectory, OwnerDirectory, Username},
	config::ProviderConfig,
	controller::AuthorizationController,
	http::{self, GrantPayload, TokenInformation},
	service::DefaultAuthorizationService,
	store::{MemoryStore, TokenStore},
};

async fn spawn_server() -> (SocketAddr, JoinHandle<()>) {
	let config = ProviderConfig::default();
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let directory = MemoryDirectory::default();

	directory.register(
		Username::new("bob").expect("Owner fixture should be a valid username."),
		"builder",
	)
	.expect("Owner password should hash.");

	let directory: Arc<dyn OwnerDirectory> = Arc::new(directory);
	let service = DefaultAuthorizationService::new(config.clone(), store, directory);
	let app = http::router(AuthorizationController::new(config, Arc::new(service)));
	let listener =
		TcpListener::bind("127.0.0.1:0").await.expect("Test listener should bind to loopback.");
	let addr = listener.local_addr().expect("Bound listener should expose its address.");
	let handle = tokio::spawn(async move {
		axum::serve(listener, app).await.expect("Test server should run until aborted.");
	});

	(addr, handle)
}

#[tokio::test]
async fn live_server_issues_and_describes_tokens() {
	let (addr, server) = spawn_server().await;
	let client = Client::new();
	let response = client
		.post(format!("http://{addr}{}", http::TOKEN_PATH))
		.form(&[
			("grant_type", "basic-credentials"),
			("client_id", ""),
			("client_secret", ""),
			("username", "bob"),
			("password", "builder"),
			("scope", "read  write"),
		])
		.send()
		.await
		.expect("Token request should reach the server.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
		Some("no-store")
	);
	assert_eq!(
		response.headers().get(header::PRAGMA).and_then(|v| v.to_str().ok()),
		Some("no-cache")
	);

	let payload: GrantPayload =
		response.json().await.expect("Grant payload should deserialize from the wire.");

	assert_eq!(payload.scope.as_deref(), Some("read  write"));

	let info: TokenInformation = client
		.get(format!("http://{addr}{}", http::TOKEN_DETAILS_PATH))
		.query(&[("access_token", payload.access_token.as_str())])
		.send()
		.await
		.expect("Lookup request should reach the server.")
		.error_for_status()
		.expect("Lookup should succeed for a fresh token.")
		.json()
		.await
		.expect("Token information should deserialize from the wire.");

	assert_eq!(info.owner, "bob");
	assert_eq!(info.scope.iter().collect::<Vec<_>>(), vec!["read", "write"]);

	server.abort();
}

#[tokio::test]
async fn live_server_rejects_confidential_clients() {
	let (addr, server) = spawn_server().await;
	let response = Client::new()
		.post(format!("http://{addr}{}", http::TOKEN_PATH))
		.form(&[
			("grant_type", "basic-credentials"),
			("client_id", "confidential"),
			("client_secret", "secret"),
			("username", "bob"),
			("password", "builder"),
		])
		.send()
		.await
		.expect("Token request should reach the server.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let body: serde_json::Value = response.json().await.expect("Error body should be JSON.");

	assert_eq!(body["error"], "invalid_client_credentials");

	server.abort();
}
