//! Provider configuration and its validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable settings shared by the controller and the default token service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// The only `grant_type` value the token endpoint accepts.
	pub grant_type: String,
	/// Lifetime applied to every issued access token.
	pub token_lifetime: Duration,
	/// Entropy, in bytes, behind each generated access token.
	pub token_length: usize,
}
impl ProviderConfig {
	/// Grant literal accepted when none is configured.
	pub const DEFAULT_GRANT_TYPE: &'static str = "basic-credentials";
	/// Token entropy used when none is configured.
	pub const DEFAULT_TOKEN_LENGTH: usize = 32;
	/// Smallest accepted token entropy.
	pub const MIN_TOKEN_LENGTH: usize = 16;

	/// Token lifetime used when none is configured.
	pub const fn default_token_lifetime() -> Duration {
		Duration::hours(1)
	}

	/// Creates a builder seeded with defaults.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::default()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.grant_type.is_empty() || self.grant_type.chars().any(char::is_whitespace) {
			return Err(ConfigError::InvalidGrantType { grant: self.grant_type.clone() });
		}
		if !self.token_lifetime.is_positive() {
			return Err(ConfigError::NonPositiveLifetime);
		}
		if self.token_length < Self::MIN_TOKEN_LENGTH {
			return Err(ConfigError::TokenTooShort {
				min: Self::MIN_TOKEN_LENGTH,
				actual: self.token_length,
			});
		}

		Ok(())
	}
}
impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			grant_type: Self::DEFAULT_GRANT_TYPE.into(),
			token_lifetime: Self::default_token_lifetime(),
			token_length: Self::DEFAULT_TOKEN_LENGTH,
		}
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	grant_type: Option<String>,
	token_lifetime: Option<Duration>,
	token_length: Option<usize>,
}
impl ProviderConfigBuilder {
	/// Overrides the accepted grant literal.
	pub fn grant_type(mut self, grant: impl Into<String>) -> Self {
		self.grant_type = Some(grant.into());

		self
	}

	/// Overrides the access token lifetime.
	pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = Some(lifetime);

		self
	}

	/// Overrides the access token entropy in bytes.
	pub fn token_length(mut self, bytes: usize) -> Self {
		self.token_length = Some(bytes);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let defaults = ProviderConfig::default();
		let config = ProviderConfig {
			grant_type: self.grant_type.unwrap_or(defaults.grant_type),
			token_lifetime: self.token_lifetime.unwrap_or(defaults.token_lifetime),
			token_length: self.token_length.unwrap_or(defaults.token_length),
		};

		config.validate()?;

		Ok(config)
	}
}
