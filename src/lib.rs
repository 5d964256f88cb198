//! OAuth 2.0 token endpoint for public clients: validated basic-credentials grants, pluggable
//! token services and stores, and an axum transport with strict no-store semantics.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
#[cfg(feature = "axum")] pub mod http;
pub mod obs;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// crates.io
	use parking_lot::Mutex;
	// self
	use crate::{
		auth::{MemoryDirectory, OwnerDirectory, ScopeList, TokenRecord, Username},
		config::ProviderConfig,
		controller::{AuthorizationController, GrantRequest},
		service::{AuthorizationService, DefaultAuthorizationService, ServiceFuture},
		store::{MemoryStore, TokenStore},
	};

	/// Resource owner registered by [`build_test_controller`].
	pub const TEST_OWNER: &str = "alice";
	/// Password registered for [`TEST_OWNER`].
	pub const TEST_PASSWORD: &str = "wonderland";

	/// Controller type alias used by integration tests.
	pub type TestController = AuthorizationController<DefaultAuthorizationService>;

	/// Builds a directory seeded with [`TEST_OWNER`].
	pub fn test_directory() -> MemoryDirectory {
		let directory = MemoryDirectory::default();

		directory.register(
			Username::new(TEST_OWNER).expect("Test owner fixture should be a valid username."),
			TEST_PASSWORD,
		)
		.expect("Test owner password should hash.");

		directory
	}

	/// Constructs a [`AuthorizationController`] backed by the default service, an in-memory
	/// store, and a directory seeded with [`TEST_OWNER`].
	pub fn build_test_controller(config: ProviderConfig) -> (TestController, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let directory: Arc<dyn OwnerDirectory> = Arc::new(test_directory());
		let service = Arc::new(DefaultAuthorizationService::new(config.clone(), store, directory));
		let controller = AuthorizationController::new(config, service);

		(controller, store_backend)
	}

	/// Grant request carrying valid public-client parameters for [`TEST_OWNER`].
	pub fn valid_grant_request(scope: Option<&str>) -> GrantRequest {
		GrantRequest {
			client_id: Some(String::new()),
			client_secret: Some(String::new()),
			grant_type: Some(ProviderConfig::DEFAULT_GRANT_TYPE.into()),
			scope: scope.map(Into::into),
			username: Some(TEST_OWNER.into()),
			password: Some(TEST_PASSWORD.into()),
		}
	}

	/// Recording service that captures generate calls and returns canned results.
	#[derive(Debug, Default)]
	pub struct RecordingService {
		/// Arguments seen by `generate_token`, in call order.
		pub calls: Mutex<Vec<RecordedGrant>>,
		/// When set, `generate_token` fails with `Error::InvalidArgument`.
		pub reject_arguments: bool,
	}

	/// Snapshot of one `generate_token` invocation.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct RecordedGrant {
		/// Scopes forwarded by the controller.
		pub scopes: Vec<String>,
		/// Client identifier forwarded by the controller.
		pub client_id: String,
		/// Username forwarded by the controller.
		pub username: String,
	}

	impl AuthorizationService for RecordingService {
		fn generate_token<'a>(
			&'a self,
			scopes: ScopeList,
			client_id: &'a str,
			_client_secret: &'a str,
			username: &'a str,
			_password: &'a str,
		) -> ServiceFuture<'a, TokenRecord> {
			Box::pin(async move {
				self.calls.lock().push(RecordedGrant {
					scopes: scopes.iter().map(Into::into).collect(),
					client_id: client_id.into(),
					username: username.into(),
				});

				if self.reject_arguments {
					return Err(Error::InvalidArgument { reason: "username is malformed".into() });
				}

				let owner = Username::new(username).map_err(|e| Error::InvalidArgument {
					reason: e.to_string(),
				})?;

				Ok(TokenRecord::builder(owner, scopes)
					.client_id(client_id)
					.access_token("recorded-token")
					.expires_in(Duration::hours(1))
					.build()?)
			})
		}

		fn token_information<'a>(
			&'a self,
			access_token: &'a str,
		) -> ServiceFuture<'a, TokenRecord> {
			Box::pin(async move {
				let owner = Username::new(TEST_OWNER).map_err(|e| Error::InvalidArgument {
					reason: e.to_string(),
				})?;

				Ok(TokenRecord::builder(owner, ScopeList::default())
					.access_token(access_token)
					.expires_in(Duration::hours(1))
					.build()?)
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "axum")] pub use axum;
#[cfg(test)] use {http_body_util as _, reqwest as _, tower as _, tracing_subscriber as _};
