//! Token endpoint controller: validates grant parameters, delegates to the token service, and
//! wraps the outcome for the transport layer.
//!
//! The controller is stateless. It only holds the immutable [`ProviderConfig`] and a handle to the
//! [`AuthorizationService`], so one instance can be cloned into every request handler.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenRecord},
	config::ProviderConfig,
	error::ProtocolError,
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	service::AuthorizationService,
};

/// Description carried by `invalid_request` errors for incomplete grant requests.
pub const MANDATORY_GRANT_PARAMETERS: &str =
	"grant_type, client_id, client_secret, username and password parameters are mandatory";

/// Raw token-endpoint parameters as received from the client.
///
/// Every field is optional at this level; absence is reported by the validator rather than by
/// the transport.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GrantRequest {
	/// `client_id` parameter.
	pub client_id: Option<String>,
	/// `client_secret` parameter.
	pub client_secret: Option<String>,
	/// `grant_type` parameter.
	pub grant_type: Option<String>,
	/// `scope` parameter.
	pub scope: Option<String>,
	/// `username` parameter.
	pub username: Option<String>,
	/// `password` parameter.
	pub password: Option<String>,
}
impl GrantRequest {
	/// Collects grant parameters from decoded name/value pairs.
	///
	/// The first occurrence of a parameter wins; unknown names are ignored.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut request = Self::default();

		for (name, value) in pairs {
			let slot = match name.as_ref() {
				"client_id" => &mut request.client_id,
				"client_secret" => &mut request.client_secret,
				"grant_type" => &mut request.grant_type,
				"scope" => &mut request.scope,
				"username" => &mut request.username,
				"password" => &mut request.password,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into());
			}
		}

		request
	}
}
impl Debug for GrantRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GrantRequest")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("grant_type", &self.grant_type)
			.field("scope", &self.scope)
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Grant parameters that passed validation.
#[derive(Clone, Debug)]
pub struct ValidatedGrant<'a> {
	/// Parsed scopes in request order.
	pub scopes: ScopeList,
	/// Client identifier (always empty for now).
	pub client_id: &'a str,
	/// Client secret (always empty for now).
	pub client_secret: &'a str,
	/// Resource owner login.
	pub username: &'a str,
	/// Resource owner password.
	pub password: &'a str,
}

/// Cache directive attached to a transport response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheDirective {
	/// Neither the client nor intermediaries may store the response.
	NoStore,
}
impl CacheDirective {
	/// `Cache-Control` header value.
	pub const fn header_value(self) -> &'static str {
		match self {
			Self::NoStore => "no-store",
		}
	}
}

/// Successful grant outcome, ready for the transport layer.
#[derive(Clone, Debug)]
pub struct TokenResponse {
	token: TokenRecord,
	scope: Option<String>,
	cache: CacheDirective,
}
impl TokenResponse {
	fn no_store(token: TokenRecord, scope: Option<String>) -> Self {
		Self { token, scope, cache: CacheDirective::NoStore }
	}

	/// Issued token.
	pub fn token(&self) -> &TokenRecord {
		&self.token
	}

	/// Scope parameter echoed exactly as the client sent it.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Cache directive the transport must apply; always [`CacheDirective::NoStore`].
	pub fn cache_directive(&self) -> CacheDirective {
		self.cache
	}

	/// Consumes the response, returning the token and echoed scope.
	pub fn into_parts(self) -> (TokenRecord, Option<String>) {
		(self.token, self.scope)
	}
}

/// Validates token-endpoint input and delegates to an [`AuthorizationService`].
pub struct AuthorizationController<S>
where
	S: ?Sized + AuthorizationService,
{
	config: ProviderConfig,
	service: Arc<S>,
}
impl<S> AuthorizationController<S>
where
	S: ?Sized + AuthorizationService,
{
	/// Creates a controller for the provided configuration and token service.
	pub fn new(config: ProviderConfig, service: Arc<S>) -> Self {
		Self { config, service }
	}

	/// Settings used for validation.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Token service the controller delegates to.
	pub fn service(&self) -> &Arc<S> {
		&self.service
	}

	/// Issues an access token for the basic-credentials grant.
	pub async fn obtain_access_token_basic_credentials(
		&self,
		request: GrantRequest,
	) -> Result<TokenResponse> {
		const KIND: EndpointKind = EndpointKind::TokenGrant;

		let span = EndpointSpan::new(KIND, "obtain_access_token_basic_credentials");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result: Result<TokenResponse> = span
			.instrument(async {
				tracing::trace!(
					client_id = ?request.client_id,
					username = ?request.username,
					grant_type = ?request.grant_type,
					scope = ?request.scope,
					"Token generation requested."
				);

				let grant = validate_grant(&self.config, &request)?;
				let token = <S as AuthorizationService>::generate_token(
					self.service.as_ref(),
					grant.scopes,
					grant.client_id,
					grant.client_secret,
					grant.username,
					grant.password,
				)
				.await
				.map_err(|e| match e {
					Error::InvalidArgument { reason } => {
						tracing::debug!(%reason, "Token service rejected an argument.");

						ProtocolError::invalid_request(MANDATORY_GRANT_PARAMETERS).into()
					},
					other => other,
				})?;

				tracing::trace!(?token, "Generated token.");

				Ok(TokenResponse::no_store(token, request.scope.clone()))
			})
			.await;

		record(KIND, &result);

		result
	}

	/// Returns the metadata of an issued access token.
	pub async fn obtain_token_information(&self, access_token: Option<&str>) -> Result<TokenRecord> {
		const KIND: EndpointKind = EndpointKind::TokenInformation;

		let span = EndpointSpan::new(KIND, "obtain_token_information");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result: Result<TokenRecord> = span
			.instrument(async {
				let Some(access_token) = access_token else {
					tracing::debug!("Missing access_token parameter.");

					return Err(Error::InvalidArgument {
						reason: "access_token parameter is mandatory".into(),
					});
				};
				let token = <S as AuthorizationService>::token_information(
					self.service.as_ref(),
					access_token,
				)
				.await?;

				tracing::trace!(?token, "Retrieved token.");

				Ok(token)
			})
			.await;

		record(KIND, &result);

		result
	}
}
impl<S> Clone for AuthorizationController<S>
where
	S: ?Sized + AuthorizationService,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), service: self.service.clone() }
	}
}
impl<S> Debug for AuthorizationController<S>
where
	S: ?Sized + AuthorizationService,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationController").field("config", &self.config).finish()
	}
}

/// Checks a grant request in a fixed order: presence, grant type, client credentials, scope.
pub fn validate_grant<'a>(
	config: &ProviderConfig,
	request: &'a GrantRequest,
) -> Result<ValidatedGrant<'a>, ProtocolError> {
	let (
		Some(grant_type),
		Some(client_id),
		Some(client_secret),
		Some(username),
		Some(password),
	) = (
		request.grant_type.as_deref(),
		request.client_id.as_deref(),
		request.client_secret.as_deref(),
		request.username.as_deref(),
		request.password.as_deref(),
	)
	else {
		tracing::debug!("Missing mandatory grant parameters.");

		return Err(ProtocolError::invalid_request(MANDATORY_GRANT_PARAMETERS));
	};

	if grant_type != config.grant_type {
		tracing::debug!(grant_type, "Unsupported grant type.");

		return Err(ProtocolError::unsupported_grant_type(format!(
			"Only grant_type '{}' is supported",
			config.grant_type
		)));
	}
	if !client_id.is_empty() || !client_secret.is_empty() {
		tracing::debug!(client_id, "Non-empty client credentials.");

		return Err(ProtocolError::invalid_client_credentials(
			"For now, client id and secret must be empty",
		));
	}

	let scopes = match request.scope.as_deref() {
		Some(raw) => ScopeList::parse(raw).map_err(|e| {
			tracing::debug!(error = %e, "Malformed scope.");

			ProtocolError::invalid_scope("Scope must be a whitespace delimited string")
		})?,
		None => ScopeList::default(),
	};

	Ok(ValidatedGrant { scopes, client_id, client_secret, username, password })
}

fn record<T>(kind: EndpointKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_endpoint_outcome(kind, EndpointOutcome::Success),
		Err(_) => obs::record_endpoint_outcome(kind, EndpointOutcome::Failure),
	}
}
