//! Immutable token record structs, lifecycle helpers, and builders.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Username, token::secret::TokenSecret},
};

/// Token type advertised for every issued credential.
pub const BEARER: &str = "bearer";

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is not yet valid because the issued-at instant is in the future.
	Pending,
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
	/// Token has been revoked.
	Revoked,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when the expiry does not come after the issued-at instant.
	#[error("Expiry must be later than the issued-at instant.")]
	ExpiryBeforeIssue,
}

/// Immutable record describing an issued access token.
#[derive(Serialize, Deserialize, Clone)]
pub struct TokenRecord {
	/// Resource owner the token was issued to.
	pub owner: Username,
	/// Client identifier presented during the grant; empty for public clients.
	pub client_id: String,
	/// Scopes granted to this record, in request order.
	pub scope: ScopeList,
	/// Bearer secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Issued-at instant.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus the lifetime or an absolute expiry.
	pub expires_at: OffsetDateTime,
	/// Revocation instant if the record has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl TokenRecord {
	/// Returns a builder for the provided owner and scope list.
	pub fn builder(owner: Username, scope: ScopeList) -> TokenRecordBuilder {
		TokenRecordBuilder::new(owner, scope)
	}

	/// Token type reported to clients.
	pub fn token_type(&self) -> &'static str {
		BEARER
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.revoked_at.is_some() {
			return TokenStatus::Revoked;
		}
		if instant < self.issued_at {
			return TokenStatus::Pending;
		}
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record is currently active (not pending/expired/revoked).
	pub fn is_active(&self) -> bool {
		matches!(self.status(), TokenStatus::Active)
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the record has been revoked.
	pub fn is_revoked(&self) -> bool {
		self.revoked_at.is_some()
	}

	/// Whole seconds left before expiry at `instant`, clamped at zero.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> i64 {
		(self.expires_at - instant).whole_seconds().max(0)
	}

	/// Whole seconds left before expiry relative to the current clock.
	pub fn expires_in(&self) -> i64 {
		self.expires_in_at(OffsetDateTime::now_utc())
	}

	/// Marks the record as revoked.
	pub fn revoke(&mut self, instant: OffsetDateTime) {
		self.revoked_at = Some(instant);
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("owner", &self.owner)
			.field("client_id", &self.client_id)
			.field("scope", &self.scope)
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("revoked_at", &self.revoked_at)
			.finish()
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug)]
pub struct TokenRecordBuilder {
	owner: Username,
	scope: ScopeList,
	client_id: String,
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenRecordBuilder {
	fn new(owner: Username, scope: ScopeList) -> Self {
		Self {
			owner,
			scope,
			client_id: String::new(),
			access_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Sets the client identifier (defaults to empty).
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides an already wrapped access token.
	pub fn access_secret(mut self, secret: TokenSecret) -> Self {
		self.access_token = Some(secret);

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self.access_token.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenRecordBuilderError::MissingExpiry),
		};

		if expires_at <= issued_at {
			return Err(TokenRecordBuilderError::ExpiryBeforeIssue);
		}

		Ok(TokenRecord {
			owner: self.owner,
			client_id: self.client_id,
			scope: self.scope,
			access_token,
			issued_at,
			expires_at,
			revoked_at: None,
		})
	}
}
