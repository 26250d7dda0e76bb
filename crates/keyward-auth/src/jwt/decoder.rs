//! Credential verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use keyward_core::config::AuthConfig;

use super::claims::{Claims, TokenType};
use crate::error::TokenFailure;

/// Validates access and refresh credentials by signature, expiry and type.
///
/// Purely stateless: no store lookups happen here.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.clock_skew_leeway_seconds;

        Self {
            access_key: DecodingKey::from_secret(config.jwt_access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access credential.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenFailure> {
        self.decode_token(token, &self.access_key, TokenType::Access)
    }

    /// Decodes and validates a refresh credential.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenFailure> {
        self.decode_token(token, &self.refresh_key, TokenType::Refresh)
    }

    fn decode_token(
        &self,
        token: &str,
        key: &DecodingKey,
        expected: TokenType,
    ) -> Result<Claims, TokenFailure> {
        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenFailure::Expired,
                _ => {
                    debug!(error = %e, "Token verification failed");
                    TokenFailure::Invalid
                }
            })?
            .claims;

        if claims.token_type != expected {
            debug!(?expected, actual = ?claims.token_type, "Unexpected token type");
            return Err(TokenFailure::Invalid);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use keyward_core::PrincipalId;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_access_secret: "access-secret".into(),
            jwt_refresh_secret: "refresh-secret".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_round_trip_access() {
        let config = config();
        let id = PrincipalId::generate();
        let pair = JwtEncoder::new(&config).generate_token_pair(id).unwrap();
        let claims = JwtDecoder::new(&config)
            .decode_access_token(&pair.access_token)
            .unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_not_accepted_as_access() {
        let config = config();
        let pair = JwtEncoder::new(&config)
            .generate_token_pair(PrincipalId::generate())
            .unwrap();
        let decoder = JwtDecoder::new(&config);
        assert_eq!(
            decoder.decode_access_token(&pair.refresh_token).unwrap_err(),
            TokenFailure::Invalid
        );
        assert!(decoder.decode_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let pair = JwtEncoder::new(&config())
            .generate_token_pair(PrincipalId::generate())
            .unwrap();
        let other = AuthConfig {
            jwt_access_secret: "another".into(),
            ..config()
        };
        assert_eq!(
            JwtDecoder::new(&other)
                .decode_access_token(&pair.access_token)
                .unwrap_err(),
            TokenFailure::Invalid
        );
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(
            JwtDecoder::new(&config())
                .decode_access_token("not.a.jwt")
                .unwrap_err(),
            TokenFailure::Invalid
        );
    }

    #[test]
    fn test_expired_is_distinguished() {
        let config = config();
        let mut claims = Claims::new(PrincipalId::generate(), TokenType::Access, 60);
        claims.iat -= 3600;
        claims.exp -= 3600;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(config.jwt_access_secret.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            JwtDecoder::new(&config).decode_access_token(&token).unwrap_err(),
            TokenFailure::Expired
        );
    }
}
