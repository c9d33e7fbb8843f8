use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ExchangeError;

const REDACTED: &str = "[REDACTED]";

/// Short-lived bearer token issued by the external identity provider.
///
/// The host obtains it from its own sign-in flow and hands it to
/// [`SessionController::sign_in`](crate::SessionController::sign_in), which
/// consumes it. It is never persisted, and neither `Debug` nor `Display`
/// reveal the value.
///
/// # Examples
///
/// ```
/// use core_auth::IdentityToken;
///
/// let token = IdentityToken::new("firebase-id-token");
/// assert_eq!(format!("{:?}", token), "IdentityToken([REDACTED])");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value, for building the exchange request only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityToken").field(&format_args!("{}", REDACTED)).finish()
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Backend-issued bearer credential that authenticates the device profile.
///
/// A credential is never blank: [`SessionCredential::new`] returns `None` for
/// empty or whitespace-only values, which is how the store treats a blank
/// persisted value (as absent). There is no client-side expiry.
///
/// # Examples
///
/// ```
/// use core_auth::SessionCredential;
///
/// let credential = SessionCredential::new("eyJhbGciOi...").unwrap();
/// assert_eq!(credential.to_string(), "[REDACTED]");
/// assert!(SessionCredential::new("   ").is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Wrap a credential value, rejecting blank strings.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Raw credential value, for persistence and header injection only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length of the credential in bytes, safe to log.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCredential").field(&format_args!("{}", REDACTED)).finish()
    }
}

impl fmt::Display for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Successful body of the token exchange endpoint.
///
/// Only the `token` field is read; any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResponse {
    pub token: SessionCredential,
}

impl ExchangeResponse {
    /// Parse a 2xx response body.
    ///
    /// # Errors
    ///
    /// `ExchangeError::MalformedResponse` when the body is not a JSON object,
    /// or its `token` field is missing, not a string, or blank.
    pub fn from_body(body: &[u8]) -> Result<Self, ExchangeError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ExchangeError::malformed(format!("body is not valid JSON: {}", e)))?;

        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ExchangeError::malformed(format!(
                    "body is a JSON {}, expected an object",
                    json_type_name(&other)
                )));
            }
        };

        let token = match fields.remove("token") {
            Some(Value::String(token)) => token,
            Some(Value::Null) | None => {
                return Err(ExchangeError::malformed("missing `token` field"));
            }
            Some(other) => {
                return Err(ExchangeError::malformed(format!(
                    "`token` field is a {}, expected a string",
                    json_type_name(&other)
                )));
            }
        };

        let token = SessionCredential::new(token)
            .ok_or_else(|| ExchangeError::malformed("`token` field is blank"))?;

        Ok(Self { token })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Authentication state of the device profile.
///
/// Derived from the credential store: a stored credential means
/// `Authenticated`. There is no transition back to `Unauthenticated` inside
/// the core; logout belongs to the host.
///
/// ```text
/// Unauthenticated --sign_in ok--> Authenticated --sign_in ok--> Authenticated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No session credential is stored
    #[default]
    Unauthenticated,
    /// A session credential is stored and attached to outbound requests
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Unauthenticated => write!(f, "Unauthenticated"),
            AuthState::Authenticated => write!(f, "Authenticated"),
        }
    }
}
