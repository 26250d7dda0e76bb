//! The credential authority: issue, validate, rotate, revoke.
//!
//! At most one refresh credential is honored per principal. [`issue`]
//! overwrites the stored slot, so the previous refresh credential becomes
//! unredeemable the moment a new login completes; [`revoke`] empties it.
//! Access credentials are stateless and stay valid until they expire.
//!
//! [`issue`]: CredentialAuthority::issue
//! [`revoke`]: CredentialAuthority::revoke

use std::sync::Arc;

use tracing::{debug, info, warn};

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;
use keyward_core::PrincipalId;
use keyward_database::PrincipalStore;
use keyward_entity::principal::Principal;

use crate::error::{RefreshError, TokenFailure};
use crate::jwt::{IssuedAccess, JwtDecoder, JwtEncoder, TokenPair};

/// Issues and validates credentials against a [`PrincipalStore`].
#[derive(Debug, Clone)]
pub struct CredentialAuthority {
    store: Arc<dyn PrincipalStore>,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl CredentialAuthority {
    /// Creates an authority from auth configuration.
    pub fn new(config: &AuthConfig, store: Arc<dyn PrincipalStore>) -> Self {
        Self {
            store,
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }

    /// Mint a credential pair and persist the refresh half on the principal.
    pub async fn issue(&self, principal: &Principal) -> Result<TokenPair, AppError> {
        let pair = self.encoder.generate_token_pair(principal.id)?;

        let stored = self
            .store
            .set_refresh_token(principal.id, Some(&pair.refresh_token))
            .await?;
        if !stored {
            return Err(AppError::not_found("User not found"));
        }

        debug!(principal_id = %principal.id, "Issued credential pair");
        Ok(pair)
    }

    /// Check an access credential by signature and expiry only.
    pub fn validate_access(&self, token: Option<&str>) -> Result<PrincipalId, TokenFailure> {
        let token = token.filter(|t| !t.is_empty()).ok_or(TokenFailure::Missing)?;
        let claims = self.decoder.decode_access_token(token)?;
        Ok(claims.principal_id())
    }

    /// Redeem a refresh credential for a new access credential.
    ///
    /// The stored refresh credential is left in place.
    pub async fn rotate_access(&self, refresh_token: Option<&str>) -> Result<IssuedAccess, RefreshError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(TokenFailure::Missing)?;

        let claims = self.decoder.decode_refresh_token(token)?;
        let principal_id = claims.principal_id();

        let current = self
            .store
            .find_by_id(principal_id)
            .await?
            .filter(|principal| principal.holds_refresh_token(token));
        if current.is_none() {
            warn!(principal_id = %principal_id, "Refresh with superseded credential");
            return Err(TokenFailure::Stale.into());
        }

        let access = self.encoder.generate_access_token(principal_id)?;
        info!(principal_id = %principal_id, "Access credential refreshed");
        Ok(access)
    }

    /// Clear the stored refresh credential. Idempotent.
    pub async fn revoke(&self, principal_id: PrincipalId) -> Result<(), AppError> {
        self.store.set_refresh_token(principal_id, None).await?;
        debug!(principal_id = %principal_id, "Refresh credential revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keyward_database::MemoryPrincipalStore;
    use keyward_entity::principal::{CreatePrincipal, PrincipalRole};

    use super::*;

    async fn setup() -> (CredentialAuthority, Arc<MemoryPrincipalStore>, Principal) {
        let store = Arc::new(MemoryPrincipalStore::new());
        let config = AuthConfig {
            jwt_access_secret: "a-secret".into(),
            jwt_refresh_secret: "r-secret".into(),
            ..AuthConfig::default()
        };
        let authority = CredentialAuthority::new(&config, store.clone());
        let principal = store
            .create(&CreatePrincipal {
                email: "a@x.com".into(),
                name: "Ada".into(),
                password_hash: "hash".into(),
                role: PrincipalRole::Standard,
            })
            .await
            .unwrap();
        (authority, store, principal)
    }

    #[tokio::test]
    async fn test_issue_persists_refresh() {
        let (authority, store, principal) = setup().await;
        let pair = authority.issue(&principal).await.unwrap();

        let stored = store.find_by_id(principal.id).await.unwrap().unwrap();
        assert!(stored.holds_refresh_token(&pair.refresh_token));
        assert_eq!(
            authority.validate_access(Some(&pair.access_token)).unwrap(),
            principal.id
        );
    }

    #[tokio::test]
    async fn test_validate_missing_and_invalid() {
        let (authority, _, _) = setup().await;
        assert_eq!(authority.validate_access(None), Err(TokenFailure::Missing));
        assert_eq!(authority.validate_access(Some("")), Err(TokenFailure::Missing));
        assert_eq!(
            authority.validate_access(Some("garbage")),
            Err(TokenFailure::Invalid)
        );
    }

    #[tokio::test]
    async fn test_rotate_does_not_rotate_refresh() {
        let (authority, store, principal) = setup().await;
        let pair = authority.issue(&principal).await.unwrap();

        let access = authority
            .rotate_access(Some(&pair.refresh_token))
            .await
            .unwrap();
        assert_eq!(
            authority.validate_access(Some(&access.access_token)).unwrap(),
            principal.id
        );

        let stored = store.find_by_id(principal.id).await.unwrap().unwrap();
        assert!(stored.holds_refresh_token(&pair.refresh_token));
        assert!(authority.rotate_access(Some(&pair.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_issue_makes_first_stale() {
        let (authority, _, principal) = setup().await;
        let first = authority.issue(&principal).await.unwrap();
        let second = authority.issue(&principal).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        let err = authority
            .rotate_access(Some(&first.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Rejected(TokenFailure::Stale)));
        assert!(authority.rotate_access(Some(&second.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_blocks_refresh() {
        let (authority, _, principal) = setup().await;
        let pair = authority.issue(&principal).await.unwrap();

        authority.revoke(principal.id).await.unwrap();
        authority.revoke(principal.id).await.unwrap();

        let err = authority
            .rotate_access(Some(&pair.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Rejected(TokenFailure::Stale)));
        // Already-issued access credentials stay valid until expiry.
        assert!(authority.validate_access(Some(&pair.access_token)).is_ok());
    }

    #[tokio::test]
    async fn test_rotate_missing_and_access_token() {
        let (authority, _, principal) = setup().await;
        let pair = authority.issue(&principal).await.unwrap();

        assert!(matches!(
            authority.rotate_access(None).await.unwrap_err(),
            RefreshError::Rejected(TokenFailure::Missing)
        ));
        assert!(matches!(
            authority.rotate_access(Some(&pair.access_token)).await.unwrap_err(),
            RefreshError::Rejected(TokenFailure::Invalid)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_leave_one_redeemable() {
        let (authority, _, principal) = setup().await;

        let logins = (0..8).map(|_| {
            let authority = authority.clone();
            let principal = principal.clone();
            async move { authority.issue(&principal).await.unwrap() }
        });
        let pairs = futures::future::join_all(logins).await;

        let mut redeemable = 0;
        for pair in &pairs {
            if authority.rotate_access(Some(&pair.refresh_token)).await.is_ok() {
                redeemable += 1;
            }
        }
        assert_eq!(redeemable, 1);
    }
}
