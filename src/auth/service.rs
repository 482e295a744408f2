use crate::auth::extractors::Session;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{LoginForm, RegisterForm};
use crate::error::AppError;
use crate::models::{new_session_id, CredentialStore, SessionStore};

const INVALID_CREDENTIALS: &str = "invalid username and/or password";

/// Registration, login and logout against the credential and session stores.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    sessions: SessionStore,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, sessions: SessionStore, bcrypt_cost: u32) -> Self {
        Self {
            credentials,
            sessions,
            bcrypt_cost,
        }
    }

    /// Creates an account and returns a newly issued session logged into it.
    ///
    /// The caller's previous session id is discarded.
    pub async fn register(&self, session: &Session, form: &RegisterForm) -> Result<Session, AppError> {
        let username = require(form.username.as_deref(), "must provide username")?;

        if self.credentials.find_by_username(username).await?.is_some() {
            log::warn!("Registration rejected, username {:?} is taken", username);
            return Err(AppError::Conflict("username is already taken".into()));
        }

        let password = require(form.password.as_deref(), "must provide password")?;
        let confirmation = require(form.confirmation.as_deref(), "must provide confirmation")?;
        if password != confirmation {
            return Err(AppError::Validation("passwords don't match".into()));
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let user = self
            .credentials
            .insert(username, &password_hash, None)
            .await?;

        let issued = self.issue(session, user.user_id).await?;
        log::info!("Registered user {} ({:?})", user.user_id, user.username);

        Ok(issued)
    }

    /// Authenticates the caller and returns a newly issued session bound to the user.
    ///
    /// Any identity already bound to the session is forgotten first, so a failed attempt
    /// leaves the caller logged out. An unknown username and a wrong password produce the
    /// same `AppError::Auth`.
    pub async fn login(&self, session: &Session, form: &LoginForm) -> Result<Session, AppError> {
        self.sessions.clear(&session.id).await?;

        let username = require(form.username.as_deref(), "must provide username")?;
        let password = require(form.password.as_deref(), "must provide password")?;

        let user = match self.credentials.find_by_username(username).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                log::warn!("Failed login attempt for {:?}", username);
                return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
            }
        };

        let issued = self.issue(session, user.user_id).await?;
        log::info!("User {} logged in", user.user_id);

        Ok(issued)
    }

    /// Forgets the session's identity. Logging out an anonymous session is a no-op.
    pub async fn logout(&self, session: &Session) -> Result<(), AppError> {
        self.sessions.clear(&session.id).await?;
        if let Some(user_id) = session.user_id {
            log::info!("User {} logged out", user_id);
        }
        Ok(())
    }

    /// Retires `previous` and binds `user_id` to a fresh id, so an id known before
    /// authentication never carries the new identity.
    async fn issue(&self, previous: &Session, user_id: i64) -> Result<Session, AppError> {
        self.sessions.clear(&previous.id).await?;

        let issued = Session {
            id: new_session_id(),
            user_id: Some(user_id),
        };
        self.sessions.bind(&issued.id, user_id).await?;
        Ok(issued)
    }
}

/// Returns the submitted value, or a validation error when it is absent or empty.
fn require<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use pretty_assertions::assert_eq;

    async fn service() -> (AuthService, SessionStore) {
        let pool = db::connect("sqlite::memory:", 1).await.unwrap();
        db::migrate(&pool).await.unwrap();
        let sessions = SessionStore::new(pool.clone());
        let auth = AuthService::new(CredentialStore::new(pool), sessions.clone(), 4);
        (auth, sessions)
    }

    fn anonymous(id: &str) -> Session {
        Session {
            id: id.to_string(),
            user_id: None,
        }
    }

    fn register_form(username: &str, password: &str, confirmation: &str) -> RegisterForm {
        RegisterForm {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            confirmation: Some(confirmation.to_string()),
        }
    }

    fn login_form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[actix_rt::test]
    async fn test_register_then_login() {
        let (auth, sessions) = service().await;

        let registered = auth
            .register(&anonymous("a"), &register_form("alice", "pw", "pw"))
            .await
            .unwrap();
        let user_id = registered.user_id.expect("registration logs the user in");
        assert_eq!(sessions.user_for(&registered.id).await.unwrap(), Some(user_id));

        let logged_in = auth
            .login(&anonymous("b"), &login_form("alice", "pw"))
            .await
            .unwrap();
        assert_eq!(logged_in.user_id, Some(user_id));
        assert_eq!(sessions.user_for(&logged_in.id).await.unwrap(), Some(user_id));
        assert_ne!(logged_in.id, registered.id);
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let (auth, sessions) = service().await;
        let session = anonymous("s");

        let cases = vec![
            (register_form("", "pw", "pw"), "must provide username"),
            (register_form("alice", "", "pw"), "must provide password"),
            (register_form("alice", "pw", ""), "must provide confirmation"),
            (register_form("alice", "pw", "other"), "passwords don't match"),
        ];

        for (form, expected) in cases {
            match auth.register(&session, &form).await {
                Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
                other => panic!("expected validation error {:?}, got {:?}", expected, other),
            }
        }

        let missing = RegisterForm {
            username: None,
            password: None,
            confirmation: None,
        };
        assert!(matches!(
            auth.register(&session, &missing).await,
            Err(AppError::Validation(_))
        ));

        assert_eq!(sessions.user_for("s").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_register_duplicate_username_conflicts() {
        let (auth, _) = service().await;
        auth.register(&anonymous("a"), &register_form("alice", "pw", "pw"))
            .await
            .unwrap();

        for password in ["pw", "different"] {
            let result = auth
                .register(&anonymous("b"), &register_form("alice", password, password))
                .await;
            assert!(matches!(result, Err(AppError::Conflict(_))));
        }
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _) = service().await;
        auth.register(&anonymous("a"), &register_form("alice", "pw", "pw"))
            .await
            .unwrap();

        let unknown = auth
            .login(&anonymous("b"), &login_form("mallory", "pw"))
            .await
            .unwrap_err();
        let wrong = auth
            .login(&anonymous("b"), &login_form("alice", "nope"))
            .await
            .unwrap_err();

        match (&unknown, &wrong) {
            (AppError::Auth(a), AppError::Auth(b)) => assert_eq!(a, b),
            other => panic!("expected two auth errors, got {:?}", other),
        }
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[actix_rt::test]
    async fn test_authentication_never_reuses_the_callers_id() {
        let (auth, sessions) = service().await;
        let planted = anonymous("planted");

        let registered = auth
            .register(&planted, &register_form("alice", "pw", "pw"))
            .await
            .unwrap();
        assert_ne!(registered.id, "planted");
        assert_eq!(sessions.user_for("planted").await.unwrap(), None);

        // An id that was already logged in is retired on the next login
        let relogged = auth
            .login(&registered, &login_form("alice", "pw"))
            .await
            .unwrap();
        assert_ne!(relogged.id, registered.id);
        assert_eq!(sessions.user_for(&registered.id).await.unwrap(), None);
        assert_eq!(sessions.user_for(&relogged.id).await.unwrap(), relogged.user_id);
    }

    #[actix_rt::test]
    async fn test_failed_login_clears_existing_session() {
        let (auth, sessions) = service().await;
        let session = auth
            .register(&anonymous("a"), &register_form("alice", "pw", "pw"))
            .await
            .unwrap();

        let result = auth.login(&session, &login_form("", "")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(sessions.user_for(&session.id).await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_logout_clears_session() {
        let (auth, sessions) = service().await;
        let session = auth
            .register(&anonymous("a"), &register_form("alice", "pw", "pw"))
            .await
            .unwrap();

        auth.logout(&session).await.unwrap();
        assert_eq!(sessions.user_for(&session.id).await.unwrap(), None);

        // Logging out twice is harmless
        auth.logout(&anonymous(&session.id)).await.unwrap();
    }
}
