//! Account flows: registration, login, profile lookup, logout.

use std::sync::Arc;

use tracing::{info, warn};

use keyward_core::error::{AppError, ErrorCode};
use keyward_core::PrincipalId;
use keyward_database::PrincipalStore;
use keyward_entity::principal::{CreatePrincipal, Principal, PrincipalProfile, PrincipalRole};

use crate::authority::CredentialAuthority;
use crate::jwt::TokenPair;
use crate::password::{PasswordHasher, PasswordValidator};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration input.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Display name.
    pub name: String,
    /// Identity attribute.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Freshly issued credential pair.
    pub tokens: TokenPair,
    /// The authenticated principal's profile.
    pub profile: PrincipalProfile,
}

/// Orchestrates the store, hasher and credential authority.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn PrincipalStore>,
    authority: Arc<CredentialAuthority>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("validator", &self.validator)
            .finish()
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        authority: Arc<CredentialAuthority>,
        validator: PasswordValidator,
    ) -> Self {
        Self {
            store,
            authority,
            hasher: PasswordHasher::new(),
            validator,
        }
    }

    /// Register a new principal with the standard role.
    pub async fn register(&self, input: RegisterInput) -> Result<Principal, AppError> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::validation("Please add all fields"));
        }
        self.validator.validate(&input.password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "Registration with existing email");
            return Err(AppError::conflict("Email already exists"));
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let principal = self
            .store
            .create(&CreatePrincipal {
                email,
                name: name.to_string(),
                password_hash,
                role: PrincipalRole::Standard,
            })
            .await?;

        info!(principal_id = %principal.id, email = %principal.email, "Principal registered");
        Ok(principal)
    }

    /// Verify an email/password pair and issue credentials.
    ///
    /// Any earlier refresh credential for the principal stops being honored.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let email = email.trim().to_lowercase();
        let principal = match self.store.find_by_email(&email).await? {
            Some(principal) => principal,
            None => {
                warn!(email = %email, "Login for unknown email");
                return Err(invalid_credentials());
            }
        };

        if !self.hasher.verify_password(password, &principal.password_hash)? {
            warn!(principal_id = %principal.id, "Login with wrong password");
            return Err(invalid_credentials());
        }

        let tokens = self.authority.issue(&principal).await?;
        info!(principal_id = %principal.id, "Login successful");
        Ok(LoginOutcome {
            tokens,
            profile: principal.profile(),
        })
    }

    /// Look up the profile of an authenticated principal.
    pub async fn profile(&self, principal_id: PrincipalId) -> Result<PrincipalProfile, AppError> {
        self.store
            .find_by_id(principal_id)
            .await?
            .map(|principal| principal.profile())
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Revoke the principal's refresh credential.
    pub async fn logout(&self, principal_id: PrincipalId) -> Result<(), AppError> {
        self.authority.revoke(principal_id).await?;
        info!(principal_id = %principal_id, "Logout");
        Ok(())
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS)
}

#[cfg(test)]
mod tests {
    use keyward_core::config::AuthConfig;
    use keyward_core::error::ErrorKind;
    use keyward_database::MemoryPrincipalStore;

    use super::*;

    fn service() -> AccountService {
        let config = AuthConfig {
            jwt_access_secret: "a-secret".into(),
            jwt_refresh_secret: "r-secret".into(),
            ..AuthConfig::default()
        };
        let store: Arc<dyn PrincipalStore> = Arc::new(MemoryPrincipalStore::new());
        let authority = Arc::new(CredentialAuthority::new(&config, store.clone()));
        AccountService::new(store, authority, PasswordValidator::new(&config))
    }

    fn input(email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            name: "Ada".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_login_profile_round_trip() {
        let service = service();
        let created = service.register(input("A@X.com", "secret1")).await.unwrap();
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.role, PrincipalRole::Standard);

        let outcome = service.authenticate("a@x.com", "secret1").await.unwrap();
        assert_eq!(outcome.profile, created.profile());

        let profile = service.profile(created.id).await.unwrap();
        assert_eq!(profile, created.profile());
    }

    #[tokio::test]
    async fn test_register_password_boundary() {
        let service = service();
        let err = service.register(input("a@x.com", "12345")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(service.register(input("a@x.com", "123456")).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let service = service();
        let err = service.register(input("", "secret1")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let service = service();
        service.register(input("a@x.com", "secret1")).await.unwrap();
        let err = service.register(input("A@x.com", "secret2")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.register(input("a@x.com", "secret1")).await.unwrap();

        let unknown = service.authenticate("b@x.com", "secret1").await.unwrap_err();
        let wrong = service.authenticate("a@x.com", "wrong!!").await.unwrap_err();
        assert_eq!(unknown.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong.code, ErrorCode::InvalidCredentials);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_profile_missing_principal() {
        let err = service().profile(PrincipalId::generate()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
