// Credential store - signup and password verification over the graph's
// username index. Hashing is CPU-bound and runs outside the graph lock.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{AppError, AppResult};
use crate::models::UserId;
use crate::store::SharedGraph;

#[derive(Clone)]
pub struct CredentialStore {
    graph: SharedGraph,
}

impl CredentialStore {
    pub fn new(graph: SharedGraph) -> Self {
        Self { graph }
    }

    /// Derive a salted verifier and create the account. The duplicate check
    /// happens under the graph's write lock, so concurrent signups for the
    /// same username cannot both succeed.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<UserId> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "username and password required".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;

        let mut graph = self.graph.write().await;
        let user_id = graph.create_user(username, password_hash)?;
        tracing::info!(user_id, username, "user registered");
        Ok(user_id)
    }

    /// Resolve credentials to an identity. Unknown usernames and bad
    /// passwords are indistinguishable to the caller.
    pub async fn verify(&self, username: &str, password: &str) -> AppResult<UserId> {
        let (user_id, password_hash) = {
            let graph = self.graph.read().await;
            let user = graph
                .user_by_username(username)
                .ok_or_else(|| AppError::Unauthenticated("invalid credentials".to_string()))?;
            (user.id, user.password_hash.clone())
        };

        if !verify_password(password, &password_hash)? {
            tracing::warn!(username, "failed login attempt");
            return Err(AppError::Unauthenticated("invalid credentials".to_string()));
        }

        Ok(user_id)
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SocialGraph;

    fn store() -> CredentialStore {
        CredentialStore::new(SocialGraph::shared())
    }

    #[tokio::test]
    async fn register_then_verify_resolves_the_same_identity() {
        let creds = store();
        let id = creds.register("alice", "pw1").await.unwrap();
        assert_eq!(creds.verify("alice", "pw1").await.unwrap(), id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_identical() {
        let creds = store();
        creds.register("alice", "pw1").await.unwrap();

        let bad_password = creds.verify("alice", "pw2").await.unwrap_err();
        let unknown_user = creds.verify("mallory", "pw1").await.unwrap_err();
        assert!(matches!(bad_password, AppError::Unauthenticated(_)));
        assert!(matches!(unknown_user, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let creds = store();
        creds.register("alice", "pw1").await.unwrap();
        let err = creds.register("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let creds = store();
        assert!(matches!(
            creds.register("", "pw").await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            creds.register("alice", "").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn verifiers_are_salted_per_record() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("pw", &a).unwrap());
        assert!(verify_password("pw", &b).unwrap());
        assert!(!verify_password("other", &a).unwrap());
    }
}
