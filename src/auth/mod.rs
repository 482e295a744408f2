pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;

use serde::Deserialize;

// Re-export necessary items
pub use extractors::{AuthenticatedUser, Session};
pub use middleware::SessionMiddleware;
pub use password::{hash_password, verify_password};
pub use service::AuthService;

/// Fields posted by the login form.
///
/// Fields are optional so that a missing value reaches the service and is reported with
/// its own message rather than as a generic decoding failure.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fields posted by the registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn test_forms_decode_missing_fields_as_none() {
        let form = Query::<RegisterForm>::from_query("username=alice&password=pw")
            .unwrap()
            .into_inner();
        assert_eq!(form.username.as_deref(), Some("alice"));
        assert_eq!(form.password.as_deref(), Some("pw"));
        assert!(form.confirmation.is_none());

        let form = Query::<LoginForm>::from_query("").unwrap().into_inner();
        assert!(form.username.is_none());
        assert!(form.password.is_none());
    }
}
