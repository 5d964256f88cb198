//! Scope parsing and the ordered scope list carried by issued tokens.

// std
use std::sync::OnceLock;
// crates.io
use regex::Regex;
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Zero or more whitespace-delimited ASCII word tokens.
const SCOPE_SYNTAX: &str = r"^(?:[A-Za-z0-9_]*[ \t\n\x0B\x0C\r])*[A-Za-z0-9_]*$";

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// The raw scope parameter is not a whitespace-delimited list of word tokens.
	#[error("Scope string is malformed: {raw}.")]
	Malformed {
		/// The offending input.
		raw: String,
	},
	/// A single scope entry is empty or contains non-word characters.
	#[error("Scope entry is invalid: {scope}.")]
	InvalidEntry {
		/// The offending entry.
		scope: String,
	},
}

/// Ordered list of granted scopes.
///
/// Entries keep the order in which the client listed them. Empty entries never make it in, and a
/// repeated entry only keeps its first position.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeList {
	scopes: Arc<[String]>,
}
impl ScopeList {
	/// Builds a list from individual entries, rejecting anything that is not a word token.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut ordered = Vec::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() || !owned.chars().all(is_word_char) {
				return Err(ScopeValidationError::InvalidEntry { scope: owned });
			}
			if !ordered.contains(&owned) {
				ordered.push(owned);
			}
		}

		Ok(Self { scopes: ordered.into() })
	}

	/// Parses the raw `scope` request parameter.
	///
	/// The empty string yields an empty list. Runs of whitespace collapse, so `"a b  c"` parses to
	/// `["a", "b", "c"]`.
	pub fn parse(raw: &str) -> Result<Self, ScopeValidationError> {
		if raw.is_empty() {
			return Ok(Self::default());
		}
		if !syntax().is_some_and(|re| re.is_match(raw)) {
			return Err(ScopeValidationError::Malformed { raw: raw.to_owned() });
		}

		Self::new(raw.split(is_scope_delimiter).filter(|scope| !scope.is_empty()))
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the list contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Space-delimited representation.
	pub fn joined(&self) -> String {
		self.scopes.join(" ")
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.scopes).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined())
	}
}

impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Serialize for ScopeList {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeList {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeList::new(values).map_err(DeError::custom)
	}
}

fn is_word_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

// ASCII whitespace including vertical tab, matching the delimiter class of `SCOPE_SYNTAX`.
fn is_scope_delimiter(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn syntax() -> Option<&'static Regex> {
	static SYNTAX: OnceLock<Option<Regex>> = OnceLock::new();

	SYNTAX.get_or_init(|| Regex::new(SCOPE_SYNTAX).ok()).as_ref()
}
