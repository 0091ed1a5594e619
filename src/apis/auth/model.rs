use secrecy::{ExposeSecret, Secret, SecretVec};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use serde::{Deserialize, Serialize};

/// Claims of the self-identity assertion exchanged for a bearer token.
///
/// The assertion is a compact JWT signed with HS512 using the program HMAC key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssertionClaims {
    /// Issue time, in seconds since the Unix epoch.
    pub iat: i64,
    /// Program identifier.
    pub sub: String,
}

/// Successful response of the `auth` bootstrap.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: Token,
}

/// Wrapper for a secret string that makes it harder to accidentally expose secrets
/// and ensures the backing memory is wiped on drop.
///
/// It is a wrapper around a [`secrecy::Secret`](secrecy::Secret).
///
/// ```rust
/// # use coreledger_rust::apis::auth::Token;
/// let token = Token::new("supersecret");
///
/// // The secret is redacted when printed with Debug
/// assert!(!format!("{:?}", token).contains("supersecret"));
///
/// // But can be manually exposed calling `expose_secret()`...
/// assert_eq!(token.expose_secret(), "supersecret");
///
/// // ... Or if serialized with Serde
/// let serialized = serde_json::to_string(&token).unwrap();
/// assert!(serialized.contains("supersecret"));
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Token(#[serde(serialize_with = "serialize_secret")] Secret<String>);

impl Token {
    /// Wraps a secret string in a new `Token`.
    pub fn new<T: Into<String>>(s: T) -> Self {
        Self(Secret::new(s.into()))
    }

    /// Exposes a reference to the underlying secret string.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Returns `true` if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.expose_secret().is_empty()
    }
}

impl<T> From<T> for Token
where
    T: Into<String>,
{
    fn from(s: T) -> Self {
        Token::new(s)
    }
}

/// HMAC key signing the self-identity assertion.
///
/// Any non-empty byte string is a valid key, not only UTF-8 text.
///
/// ```rust
/// # use coreledger_rust::apis::auth::HmacKey;
/// let key = HmacKey::from(vec![0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(key.expose_secret(), &[0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(format!("{:?}", key), "HmacKey([REDACTED])");
/// ```
#[derive(Clone)]
pub struct HmacKey(Arc<SecretVec<u8>>);

impl HmacKey {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self(Arc::new(Secret::new(key.into())))
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose_secret().is_empty()
    }
}

impl Debug for HmacKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacKey([REDACTED])")
    }
}

impl<T> From<T> for HmacKey
where
    T: Into<Vec<u8>>,
{
    fn from(key: T) -> Self {
        HmacKey::new(key)
    }
}

fn serialize_secret<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    secret.expose_secret().serialize(serializer)
}
