//! Token service boundary and the default store-backed implementation.
//!
//! [`AuthorizationService`] is the collaborator the controller delegates to once a grant request
//! passed validation. [`DefaultAuthorizationService`] authenticates the resource owner against an
//! [`OwnerDirectory`], mints a random bearer secret, and persists the resulting [`TokenRecord`] in a
//! [`TokenStore`].

// self
use crate::{
	_prelude::*,
	auth::{OwnerDirectory, ScopeList, TokenRecord, TokenSecret, TokenStatus, Username},
	config::ProviderConfig,
	error::ProtocolError,
	store::TokenStore,
};

/// Boxed future returned by [`AuthorizationService`] operations.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Issues and looks up access tokens.
///
/// Implementations signal malformed arguments with [`Error::InvalidArgument`]; the controller turns
/// those into `invalid_request` protocol errors for grant calls.
pub trait AuthorizationService
where
	Self: Send + Sync,
{
	/// Issues a token for the resource owner identified by `username`/`password`.
	fn generate_token<'a>(
		&'a self,
		scopes: ScopeList,
		client_id: &'a str,
		client_secret: &'a str,
		username: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, TokenRecord>;

	/// Returns the record issued under `access_token`.
	fn token_information<'a>(&'a self, access_token: &'a str) -> ServiceFuture<'a, TokenRecord>;
}

/// Store-backed [`AuthorizationService`].
#[derive(Clone)]
pub struct DefaultAuthorizationService {
	config: ProviderConfig,
	store: Arc<dyn TokenStore>,
	directory: Arc<dyn OwnerDirectory>,
}
impl DefaultAuthorizationService {
	/// Wires the service to its store and owner directory.
	pub fn new(
		config: ProviderConfig,
		store: Arc<dyn TokenStore>,
		directory: Arc<dyn OwnerDirectory>,
	) -> Self {
		Self { config, store, directory }
	}

	/// Settings the service mints tokens with.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Removes every record that has expired, returning how many were dropped.
	pub async fn purge_expired(&self) -> Result<usize> {
		let removed = <dyn TokenStore>::purge_expired(self.store.as_ref(), OffsetDateTime::now_utc())
			.await
			.map_err(Error::from)?;

		if removed > 0 {
			tracing::debug!(removed, "Purged expired access tokens.");
		}

		Ok(removed)
	}

	/// Revokes the record issued under `access_token`; later lookups treat it as unknown.
	pub async fn revoke(&self, access_token: &str) -> Result<TokenRecord> {
		<dyn TokenStore>::revoke(self.store.as_ref(), access_token, OffsetDateTime::now_utc())
			.await
			.map_err(Error::from)?
			.ok_or(Error::UnknownToken)
	}

	async fn issue(
		&self,
		scopes: ScopeList,
		client_id: &str,
		username: &str,
		password: &str,
	) -> Result<TokenRecord> {
		let owner = Username::new(username)
			.map_err(|e| Error::InvalidArgument { reason: e.to_string() })?;

		if password.is_empty() {
			return Err(Error::InvalidArgument { reason: "password cannot be empty".into() });
		}
		if !<dyn OwnerDirectory>::authenticate(self.directory.as_ref(), &owner, password).await? {
			tracing::debug!(owner = %owner, "Resource owner authentication failed.");

			return Err(ProtocolError::invalid_grant("Invalid resource owner credentials").into());
		}

		let record = TokenRecord::builder(owner, scopes)
			.client_id(client_id)
			.access_secret(TokenSecret::generate(self.config.token_length))
			.issued_at(OffsetDateTime::now_utc())
			.expires_in(self.config.token_lifetime)
			.build()?;

		<dyn TokenStore>::save(self.store.as_ref(), record.clone()).await.map_err(Error::from)?;

		tracing::trace!(?record, "Issued access token.");

		Ok(record)
	}

	async fn lookup(&self, access_token: &str) -> Result<TokenRecord> {
		let record = <dyn TokenStore>::fetch(self.store.as_ref(), access_token)
			.await
			.map_err(Error::from)?
			.ok_or(Error::UnknownToken)?;

		match record.status() {
			TokenStatus::Active => Ok(record),
			status => {
				tracing::debug!(?status, "Rejected lookup of inactive access token.");

				Err(Error::UnknownToken)
			},
		}
	}
}
impl AuthorizationService for DefaultAuthorizationService {
	fn generate_token<'a>(
		&'a self,
		scopes: ScopeList,
		client_id: &'a str,
		_client_secret: &'a str,
		username: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, TokenRecord> {
		Box::pin(self.issue(scopes, client_id, username, password))
	}

	fn token_information<'a>(&'a self, access_token: &'a str) -> ServiceFuture<'a, TokenRecord> {
		Box::pin(self.lookup(access_token))
	}
}
impl Debug for DefaultAuthorizationService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DefaultAuthorizationService").field("config", &self.config).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::MemoryDirectory,
		error::ProtocolErrorKind,
		store::MemoryStore,
	};

	fn service(lifetime: Duration) -> (DefaultAuthorizationService, MemoryStore) {
		let config = ProviderConfig::builder()
			.token_lifetime(lifetime)
			.build()
			.expect("Service config fixture should validate.");
		let store = MemoryStore::default();
		let directory = MemoryDirectory::default();

		directory
			.register(Username::new("alice").expect("Username fixture is valid."), "pw")
			.expect("Owner password should hash.");

		let service =
			DefaultAuthorizationService::new(config, Arc::new(store.clone()), Arc::new(directory));

		(service, store)
	}

	#[tokio::test]
	async fn issued_tokens_can_be_looked_up() {
		let (service, store) = service(Duration::minutes(10));
		let scopes = ScopeList::parse("read write").expect("Scope fixture should parse.");
		let record = service
			.generate_token(scopes.clone(), "", "", "alice", "pw")
			.await
			.expect("Valid owner credentials should yield a token.");

		assert_eq!(store.len(), 1);
		assert_eq!(record.scope, scopes);
		assert_eq!(&*record.owner, "alice");
		assert!(record.expires_in() > 590);

		let fetched = service
			.token_information(record.access_token.expose())
			.await
			.expect("Freshly issued token should be found.");

		assert_eq!(fetched.access_token, record.access_token);
	}

	#[tokio::test]
	async fn bad_arguments_and_credentials_are_classified() {
		let (service, store) = service(Duration::minutes(10));
		let invalid_user = service
			.generate_token(ScopeList::default(), "", "", "", "pw")
			.await
			.expect_err("Empty usernames must be rejected.");

		assert!(matches!(invalid_user, Error::InvalidArgument { .. }));

		let empty_password = service
			.generate_token(ScopeList::default(), "", "", "alice", "")
			.await
			.expect_err("Empty passwords must be rejected.");

		assert!(matches!(empty_password, Error::InvalidArgument { .. }));

		let wrong_password = service
			.generate_token(ScopeList::default(), "", "", "alice", "nope")
			.await
			.expect_err("Wrong passwords must be rejected.");

		assert_eq!(
			wrong_password.as_protocol().map(|e| e.kind),
			Some(ProtocolErrorKind::InvalidGrant)
		);
		assert!(store.is_empty(), "Rejected grants must not persist anything.");
	}

	#[tokio::test]
	async fn unknown_and_revoked_tokens_are_rejected() {
		let (service, _) = service(Duration::minutes(10));

		assert!(matches!(
			service.token_information("missing").await,
			Err(Error::UnknownToken)
		));

		let record = service
			.generate_token(ScopeList::default(), "", "", "alice", "pw")
			.await
			.expect("Valid owner credentials should yield a token.");

		service.revoke(record.access_token.expose()).await.expect("Revocation should succeed.");

		assert!(matches!(
			service.token_information(record.access_token.expose()).await,
			Err(Error::UnknownToken)
		));
	}

	#[tokio::test]
	async fn expired_tokens_are_purged() {
		let (service, store) = service(Duration::minutes(10));
		let expired = TokenRecord::builder(
			Username::new("alice").expect("Username fixture is valid."),
			ScopeList::default(),
		)
		.access_token("expired")
		.issued_at(OffsetDateTime::now_utc() - Duration::hours(2))
		.expires_in(Duration::hours(1))
		.build()
		.expect("Expired fixture should build.");

		store.save(expired).await.expect("Saving the fixture should succeed.");
		service
			.generate_token(ScopeList::default(), "", "", "alice", "pw")
			.await
			.expect("Valid owner credentials should yield a token.");

		assert!(matches!(service.token_information("expired").await, Err(Error::UnknownToken)));
		assert_eq!(service.purge_expired().await.expect("Purge should succeed."), 1);
		assert_eq!(store.len(), 1);
	}
}
