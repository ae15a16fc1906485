//! Company registration and login against the credential store.
//!
//! Login failures never say whether the company exists: an unknown name and a
//! wrong password both come back as [`AuthError::InvalidCredentials`].

use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tracing::{debug, info};

use crate::db::Database;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Company name and password are required")]
    MissingFields,

    #[error("A company with that name is already registered")]
    AlreadyRegistered,

    #[error("Invalid company name or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Hashing task failed: {0}")]
    Task(#[from] JoinError),
}

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub id: i64,
    pub name: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    cost: u32,
}

impl AuthService {
    pub fn new(db: Database, cost: u32) -> Self {
        Self { db, cost }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn register(&self, name: &str, password: &str) -> Result<Registration, AuthError> {
        require(name, password)?;

        if self.db.company_exists(name).await? {
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = hash_password(password, self.cost).await?;

        // The existence check above is not atomic with the insert; a racing
        // registration surfaces here as a UNIQUE violation.
        let id = self
            .db
            .create_company(name, &password_hash)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::AlreadyRegistered
                } else {
                    AuthError::Database(e)
                }
            })?;

        info!("Registered company {name} with id {id}");

        Ok(Registration {
            id,
            name: name.to_string(),
        })
    }

    /// Check a company's password, returning the stored company name on success
    pub async fn login(&self, name: &str, password: &str) -> Result<String, AuthError> {
        require(name, password)?;

        let Some(company) = self.db.find_company(name).await? else {
            debug!("Login attempt for unknown company");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &company.password_hash).await? {
            info!("Company {} logged in", company.name);
            Ok(company.name)
        } else {
            debug!("Password mismatch for company {}", company.name);
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn require(name: &str, password: &str) -> Result<(), AuthError> {
    if name.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_owned();
    let hash = spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    Ok(hash)
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

    Ok(matches)
}

#[cfg(test)]
pub(crate) const TEST_COST: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn service() -> AuthService {
        AuthService::new(db::memory().await, TEST_COST)
    }

    #[tokio::test]
    async fn register_returns_id_and_name() {
        let auth = service().await;

        let registration = auth.register("Acme", "secret").await.unwrap();

        assert_eq!(registration.name, "Acme");
        assert!(registration.id > 0);
    }

    #[tokio::test]
    async fn second_registration_with_same_name_conflicts() {
        let auth = service().await;
        auth.register("Acme", "secret").await.unwrap();

        let err = auth.register("Acme", "other").await.unwrap_err();

        assert!(matches!(err, AuthError::AlreadyRegistered));
    }

    #[tokio::test]
    async fn concurrent_registrations_of_one_name_conflict_once() {
        let auth = service().await;

        let (first, second) = tokio::join!(
            auth.register("Acme", "first"),
            auth.register("Acme", "second")
        );

        let results = [first, second];
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::AlreadyRegistered)))
            .count();
        assert_eq!(conflicts, 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_plaintext() {
        let auth = service().await;
        auth.register("Acme", "secret").await.unwrap();

        let company = auth.database().find_company("Acme").await.unwrap().unwrap();

        assert_ne!(company.password_hash, "secret");
        assert!(bcrypt::verify("secret", &company.password_hash).unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_a_different_salt() {
        let auth = service().await;
        auth.register("One", "secret").await.unwrap();
        auth.register("Two", "secret").await.unwrap();

        let one = auth.database().find_company("One").await.unwrap().unwrap();
        let two = auth.database().find_company("Two").await.unwrap().unwrap();

        assert_ne!(one.password_hash, two.password_hash);
    }

    #[tokio::test]
    async fn login_with_correct_password_returns_company_name() {
        let auth = service().await;
        auth.register("Acme", "secret").await.unwrap();

        assert_eq!(auth.login("Acme", "secret").await.unwrap(), "Acme");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_company_fail_identically() {
        let auth = service().await;
        auth.register("Acme", "secret").await.unwrap();

        let wrong = auth.login("Acme", "nope").await.unwrap_err();
        let unknown = auth.login("Ghost", "secret").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_touching_the_store() {
        let auth = service().await;

        assert!(matches!(
            auth.register("", "secret").await.unwrap_err(),
            AuthError::MissingFields
        ));
        assert!(matches!(
            auth.register("Acme", "").await.unwrap_err(),
            AuthError::MissingFields
        ));
        assert!(matches!(
            auth.login("", "").await.unwrap_err(),
            AuthError::MissingFields
        ));
        assert!(!auth.database().company_exists("Acme").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_cost_is_a_hashing_error() {
        let auth = AuthService::new(db::memory().await, 99);

        let err = auth.register("Acme", "secret").await.unwrap_err();

        assert!(matches!(err, AuthError::Hashing(_)));
    }
}
