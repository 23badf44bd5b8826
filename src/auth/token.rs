//! Defines the claims carried by the identity provider's bearer tokens and how to verify them.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The contents of a JSON Web Token issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user's ID at the identity provider.
    pub sub: String,
    /// The user's email, absent for e.g. phone sign-ins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The expiry time of the token as a unix timestamp.
    pub exp: u64,
}

/// The key and rules used to verify bearer tokens.
#[derive(Clone)]
pub struct AuthConfig {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthConfig {
    /// Create a config for HS256 tokens signed with `secret`.
    ///
    /// If `audience` is given, tokens must carry a matching `aud` claim,
    /// otherwise the `aud` claim is ignored.
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidToken] if the token is malformed, has a bad
    /// signature, has expired, has the wrong audience or has an empty subject.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, Error> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| Error::InvalidToken(error.to_string()))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(Error::InvalidToken("the subject claim is empty".to_owned()));
        }

        Ok(claims)
    }
}
