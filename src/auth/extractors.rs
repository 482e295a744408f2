use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The request-scoped session resolved by `SessionMiddleware`.
///
/// `id` is the opaque session identifier from the cookie; `user_id` is the identity bound
/// to it when the request arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: Option<i64>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Makes this the request's session. `SessionMiddleware` sends its id back to the
    /// client when it differs from the one the request arrived with.
    pub fn attach(self, req: &HttpRequest) {
        req.extensions_mut().insert(self);
    }
}

impl FromRequest for Session {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Session>().cloned() {
            Some(session) => ready(Ok(session)),
            None => {
                let err = AppError::InternalServerError(
                    "Session not found in request. Ensure SessionMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// The session guard: extracts the logged-in user's ID.
///
/// Declared as the first argument of every task handler. When no user is bound to the
/// session the extraction fails with `AppError::LoginRequired`, the handler never runs and
/// the client is redirected to `/login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .extensions()
            .get::<Session>()
            .and_then(|session| session.user_id);

        match user_id {
            Some(user_id) => ready(Ok(AuthenticatedUser(user_id))),
            None => ready(Err(AppError::LoginRequired.into())),
        }
    }
}
