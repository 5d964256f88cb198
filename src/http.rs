//! Axum transport for the token endpoints.
//!
//! [`router`] exposes an explicit route table:
//!
//! - `POST /oauth/token` reads [`GrantRequest`] parameters from the query string and a form-encoded
//!   body, then answers with a [`GrantPayload`].
//! - `GET /oauth/tokenDetails?access_token=...` answers with a [`TokenInformation`].
//!
//! Failures are rendered by the [`IntoResponse`] implementation on [`Error`]: protocol errors keep
//! the OAuth `{error, error_description}` shape, everything else becomes `{message}` with a status
//! that reflects the failure class.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Query, RawQuery, State, rejection::BytesRejection},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenRecord},
	controller::{
		AuthorizationController, CacheDirective, GrantRequest, MANDATORY_GRANT_PARAMETERS,
		TokenResponse,
	},
	error::{ProtocolError, ProtocolErrorKind},
	service::AuthorizationService,
};

/// Path of the token grant endpoint.
pub const TOKEN_PATH: &str = "/oauth/token";
/// Path of the token lookup endpoint.
pub const TOKEN_DETAILS_PATH: &str = "/oauth/tokenDetails";

/// Builds the route table for the provided controller.
pub fn router<S>(controller: AuthorizationController<S>) -> Router
where
	S: 'static + ?Sized + AuthorizationService,
{
	Router::new()
		.route(TOKEN_PATH, post(obtain_access_token::<S>))
		.route(TOKEN_DETAILS_PATH, get(obtain_token_information::<S>))
		.with_state(controller)
}

/// JSON body returned by a successful grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantPayload {
	/// Bearer secret.
	pub access_token: String,
	/// Always `bearer`.
	pub token_type: String,
	/// Seconds until the token expires.
	pub expires_in: i64,
	/// Scope parameter echoed from the request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}
impl From<TokenResponse> for GrantPayload {
	fn from(response: TokenResponse) -> Self {
		let (token, scope) = response.into_parts();

		Self {
			access_token: token.access_token.expose().to_owned(),
			token_type: token.token_type().to_owned(),
			expires_in: token.expires_in(),
			scope,
		}
	}
}

/// JSON body returned by the lookup endpoint; never includes the bearer secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInformation {
	/// Resource owner the token belongs to.
	pub owner: String,
	/// Client identifier recorded at issuance.
	pub client_id: String,
	/// Granted scopes, in request order.
	pub scope: ScopeList,
	/// Issued-at instant as a unix timestamp.
	pub issued_at: i64,
	/// Expiry instant as a unix timestamp.
	pub expires_at: i64,
	/// Seconds until the token expires.
	pub expires_in: i64,
}
impl From<TokenRecord> for TokenInformation {
	fn from(record: TokenRecord) -> Self {
		Self {
			expires_in: record.expires_in(),
			issued_at: record.issued_at.unix_timestamp(),
			expires_at: record.expires_at.unix_timestamp(),
			owner: record.owner.into(),
			client_id: record.client_id,
			scope: record.scope,
		}
	}
}

/// Query string accepted by the lookup endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenDetailsQuery {
	/// `access_token` parameter.
	pub access_token: Option<String>,
}

#[derive(Serialize)]
struct MessageBody {
	message: String,
}

async fn obtain_access_token<S>(
	State(controller): State<AuthorizationController<S>>,
	RawQuery(query): RawQuery,
	body: Result<Bytes, BytesRejection>,
) -> Result<Response>
where
	S: 'static + ?Sized + AuthorizationService,
{
	let request = grant_request(query.as_deref(), body)?;
	let response = controller.obtain_access_token_basic_credentials(request).await?;
	let cache = response.cache_directive();

	Ok((
		StatusCode::OK,
		no_store_headers(cache),
		Json(GrantPayload::from(response)),
	)
		.into_response())
}

async fn obtain_token_information<S>(
	State(controller): State<AuthorizationController<S>>,
	Query(query): Query<TokenDetailsQuery>,
) -> Result<Json<TokenInformation>>
where
	S: 'static + ?Sized + AuthorizationService,
{
	let record = controller.obtain_token_information(query.access_token.as_deref()).await?;

	Ok(Json(record.into()))
}

/// Merges body and query parameters; body values come first, and the first occurrence wins.
fn grant_request(
	query: Option<&str>,
	body: Result<Bytes, BytesRejection>,
) -> Result<GrantRequest, ProtocolError> {
	let malformed = |reason: String| {
		tracing::debug!(%reason, "Unreadable grant parameters.");

		ProtocolError::invalid_request(MANDATORY_GRANT_PARAMETERS)
	};
	let body = body.map_err(|e| malformed(e.body_text()))?;
	let mut pairs: Vec<(String, String)> =
		serde_urlencoded::from_bytes(&body).map_err(|e| malformed(e.to_string()))?;

	if let Some(query) = query {
		let query_pairs: Vec<(String, String)> =
			serde_urlencoded::from_str(query).map_err(|e| malformed(e.to_string()))?;

		pairs.extend(query_pairs);
	}

	Ok(GrantRequest::from_pairs(pairs))
}

fn no_store_headers(cache: CacheDirective) -> [(header::HeaderName, &'static str); 2] {
	[(header::CACHE_CONTROL, cache.header_value()), (header::PRAGMA, "no-cache")]
}

/// Status code a failure maps to.
pub fn status_for(error: &Error) -> StatusCode {
	match error {
		Error::Protocol(e) => match e.kind {
			ProtocolErrorKind::InvalidClientCredentials => StatusCode::UNAUTHORIZED,
			_ => StatusCode::BAD_REQUEST,
		},
		Error::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
		Error::UnknownToken => StatusCode::NOT_FOUND,
		Error::Storage(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = status_for(&self);

		match self {
			Self::Protocol(e) =>
				(status, no_store_headers(CacheDirective::NoStore), Json(e)).into_response(),
			other => {
				if status.is_server_error() {
					tracing::error!(error = %other, "Token endpoint failed.");
				}

				(status, Json(MessageBody { message: other.to_string() })).into_response()
			},
		}
	}
}
