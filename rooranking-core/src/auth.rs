use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, thread_rng, Rng};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, NewSession, NewUser, PrimaryKey, QuestionnaireData, SessionData,
    UpdatedUser, UserData,
};

/// Credential and session management.
///
/// Sessions are bearer tokens with a fixed lifetime. An expired session is
/// equivalent to a missing one and stays in the store until the owning user
/// logs out or is deleted.
pub struct Auth {
    db: Arc<dyn Database>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// No session, or an expired one
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Admin access required")]
    AdminRequired,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,
    #[error("An admin already exists")]
    AdminExists,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl Auth {
    const SESSION_DURATION_IN_DAYS: i64 = 30;
    const TOKEN_LENGTH: usize = 64;
    const MIN_PASSWORD_LENGTH: usize = 6;

    pub fn new(db: &Arc<dyn Database>) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::default(),
        }
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        let user = self
            .db
            .user_by_username(&credentials.username)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AuthError::InvalidCredentials,
                err => AuthError::Db(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS);

        let new_session = NewSession {
            token: random_string(Self::TOKEN_LENGTH),
            user_id: user.id,
            expires_at,
        };

        let new_session = self
            .db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)?;

        Ok(new_session)
    }

    /// Deletes the associated session. Logging out a token that no longer
    /// exists is not an error.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        match self.db.delete_session_by_token(token).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(AuthError::Db(e)),
        }
    }

    /// Resolves a token to its session, treating expired sessions as absent.
    /// Expired rows are left in place until logout or user deletion.
    pub async fn session(&self, token: &str) -> Result<SessionData, AuthError> {
        let session = self.db.session_by_token(token).await.map_err(|e| match e {
            DatabaseError::NotFound { .. } => AuthError::NotAuthenticated,
            err => AuthError::Db(err),
        })?;

        if Utc::now() >= session.expires_at {
            return Err(AuthError::NotAuthenticated);
        }

        Ok(session)
    }

    /// Like [Self::session], but also requires the admin flag
    pub async fn require_admin(&self, token: &str) -> Result<SessionData, AuthError> {
        let session = self.session(token).await?;

        if !session.user.is_admin {
            return Err(AuthError::AdminRequired);
        }

        Ok(session)
    }

    /// Registers a new account through the onboarding flow
    pub async fn register(&self, registration: NewRegistration) -> Result<UserData, AuthError> {
        self.insert_user(NewUser {
            username: registration.username,
            password: registration.password,
            is_admin: false,
            avatar_color: registration.avatar_color,
            avatar_image: registration.avatar_image,
            years_attended: registration.years_attended,
            questionnaire: registration.questionnaire,
            onboarding_complete: true,
        })
        .await
    }

    /// Creates an account on behalf of someone else. The new user completes
    /// onboarding themselves on first login.
    pub async fn create_user(
        &self,
        username: String,
        password: String,
        avatar_color: String,
    ) -> Result<UserData, AuthError> {
        self.insert_user(NewUser {
            username,
            password,
            is_admin: false,
            avatar_color,
            avatar_image: None,
            years_attended: vec![],
            questionnaire: None,
            onboarding_complete: false,
        })
        .await
    }

    /// Creates the admin account, if it doesn't already exist
    pub async fn register_admin(
        &self,
        username: String,
        password: String,
        avatar_color: String,
    ) -> Result<UserData, AuthError> {
        let has_admin = self.db.check_for_admin().await.map_err(AuthError::Db)?;

        if has_admin {
            return Err(AuthError::AdminExists);
        }

        self.insert_user(NewUser {
            username,
            password,
            is_admin: true,
            avatar_color,
            avatar_image: None,
            years_attended: vec![],
            questionnaire: None,
            onboarding_complete: true,
        })
        .await
    }

    /// Changes a user's password, verifying the current one first
    pub async fn change_password(
        &self,
        user_id: PrimaryKey,
        current_password: &str,
        new_password: String,
    ) -> Result<(), AuthError> {
        let user = self.db.user_by_id(user_id).await.map_err(AuthError::Db)?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(current_password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCurrentPassword)?;

        self.replace_password(user_id, new_password).await
    }

    /// Replaces a user's password without the current-password check.
    /// Admin gating happens at the call site.
    pub async fn reset_password(
        &self,
        user_id: PrimaryKey,
        new_password: String,
    ) -> Result<(), AuthError> {
        self.replace_password(user_id, new_password).await
    }

    /// Updates a user's profile
    pub async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData, DatabaseError> {
        self.db.update_user(updated_user).await
    }

    pub async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData, DatabaseError> {
        self.db.user_by_id(user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserData>, DatabaseError> {
        self.db.list_users().await
    }

    /// Deletes a user completely: their rankings and sessions go first, then
    /// the user row, so no ranking ever references a deleted user.
    pub async fn delete_user(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        // Ensure user exists before touching dependents
        let _ = self.db.user_by_id(user_id).await?;

        self.db.delete_rankings_by_user(user_id).await?;
        self.db.delete_sessions_by_user(user_id).await?;
        self.db.delete_user(user_id).await
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<UserData, AuthError> {
        if new_user.password.len() < Self::MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort(Self::MIN_PASSWORD_LENGTH));
        }

        let hashed_password = self.hash_password(&new_user.password)?;

        self.db
            .create_user(NewUser {
                password: hashed_password,
                ..new_user
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict { .. } => AuthError::UsernameTaken,
                err => AuthError::Db(err),
            })
    }

    async fn replace_password(
        &self,
        user_id: PrimaryKey,
        new_password: String,
    ) -> Result<(), AuthError> {
        if new_password.len() < Self::MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort(Self::MIN_PASSWORD_LENGTH));
        }

        let hashed_password = self.hash_password(&new_password)?;

        self.db
            .update_user_password(user_id, hashed_password)
            .await
            .map_err(AuthError::Db)
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub username: String,
    pub password: String,
    pub avatar_color: String,
    pub avatar_image: Option<String>,
    pub years_attended: Vec<i32>,
    pub questionnaire: Option<QuestionnaireData>,
}

fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDatabase;

    fn setup() -> Auth {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        Auth::new(&db)
    }

    fn registration(username: &str, password: &str) -> NewRegistration {
        NewRegistration {
            username: username.to_string(),
            password: password.to_string(),
            avatar_color: "#22c55e".to_string(),
            avatar_image: None,
            years_attended: vec![2023, 2025],
            questionnaire: None,
        }
    }

    #[tokio::test]
    async fn register_rejects_short_passwords() {
        let auth = setup();

        let err = auth
            .register(registration("alice", "nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PasswordTooShort(6)));
        assert!(auth.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_rejects_taken_usernames() {
        let auth = setup();

        auth.register(registration("alice", "secret1")).await.unwrap();
        let err = auth
            .register(registration("alice", "secret2"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(auth.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_never_stores_the_plain_password() {
        let auth = setup();

        let user = auth.register(registration("alice", "secret1")).await.unwrap();

        assert_ne!(user.password, "secret1");
        assert!(user.onboarding_complete);
    }

    #[tokio::test]
    async fn login_resolves_to_the_authenticated_user() {
        let auth = setup();

        let user = auth.register(registration("alice", "secret1")).await.unwrap();
        let session = auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.token.len(), 64);

        let resolved = auth.session(&session.token).await.unwrap();
        assert_eq!(resolved.user.id, user.id);
    }

    #[tokio::test]
    async fn login_fails_the_same_way_for_unknown_users_and_bad_passwords() {
        let auth = setup();
        auth.register(registration("alice", "secret1")).await.unwrap();

        let unknown = auth
            .login(Credentials {
                username: "bob".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        let wrong = auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "wrong pass".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logged_out_sessions_stop_resolving() {
        let auth = setup();

        auth.register(registration("alice", "secret1")).await.unwrap();
        let session = auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        auth.logout(&session.token).await.unwrap();

        let err = auth.session(&session.token).await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));

        // A second logout of the same token is fine
        auth.logout(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_inert_without_logout() {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let auth = Auth::new(&db);

        let user = auth.register(registration("alice", "secret1")).await.unwrap();
        let session = db
            .create_session(NewSession {
                token: "a".repeat(64),
                user_id: user.id,
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap();

        let err = auth.session(&session.token).await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));

        // The expired row is filtered, not deleted
        assert!(db.session_by_token(&session.token).await.is_ok());
    }

    #[tokio::test]
    async fn require_admin_rejects_regular_users() {
        let auth = setup();

        auth.register(registration("alice", "secret1")).await.unwrap();
        let session = auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let err = auth.require_admin(&session.token).await.unwrap_err();
        assert!(matches!(err, AuthError::AdminRequired));
    }

    #[tokio::test]
    async fn only_one_admin_can_be_registered() {
        let auth = setup();

        auth.register_admin("matt".to_string(), "bonnaroo".to_string(), "#f59e0b".to_string())
            .await
            .unwrap();

        let err = auth
            .register_admin("mallory".to_string(), "hunter22".to_string(), "#f59e0b".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::AdminExists));
    }

    #[tokio::test]
    async fn change_password_verifies_the_current_one() {
        let auth = setup();

        let user = auth.register(registration("alice", "secret1")).await.unwrap();

        let err = auth
            .change_password(user.id, "wrong pass", "secret2".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCurrentPassword));

        auth.change_password(user.id, "secret1", "secret2".to_string())
            .await
            .unwrap();

        auth.login(Credentials {
            username: "alice".to_string(),
            password: "secret2".to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_sessions() {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let auth = Auth::new(&db);

        let user = auth.register(registration("alice", "secret1")).await.unwrap();
        let session = auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        auth.delete_user(user.id).await.unwrap();

        assert!(db.session_by_token(&session.token).await.is_err());
        assert!(db.user_by_id(user.id).await.is_err());
    }
}
