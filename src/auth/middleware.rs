use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::Session;
use crate::error::AppError;
use crate::models::{new_session_id, SessionStore};

/// Resolves the server-side session for every request.
///
/// The session id travels in an HTTP-only cookie and carries no data of its own. Only ids
/// that resolve to a live record in the store are honoured. A missing or unknown id is
/// replaced by a freshly minted one. Whenever the session id changes during the request
/// (a new visitor, or a handler attaching a new `Session` on login) the final id is set on
/// the response.
pub struct SessionMiddleware {
    store: SessionStore,
    cookie_name: Rc<str>,
}

impl SessionMiddleware {
    pub fn new(store: SessionStore, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: Rc::from(cookie_name.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            cookie_name: Rc::clone(&self.cookie_name),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    store: SessionStore,
    cookie_name: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = self.store.clone();
        let cookie_name = Rc::clone(&self.cookie_name);

        Box::pin(async move {
            let presented = req
                .cookie(&cookie_name)
                .map(|cookie| cookie.value().to_string())
                .filter(|id| !id.is_empty());

            let resolved = match presented.as_deref() {
                Some(id) => store
                    .user_for(id)
                    .await
                    .map_err(AppError::from)?
                    .map(|user_id| Session {
                        id: id.to_string(),
                        user_id: Some(user_id),
                    }),
                None => None,
            };

            let session = resolved.unwrap_or_else(|| Session {
                id: new_session_id(),
                user_id: None,
            });
            req.extensions_mut().insert(session);

            let mut res = service.call(req).await?;

            let final_id = res
                .request()
                .extensions()
                .get::<Session>()
                .map(|session| session.id.clone());

            if let Some(id) = final_id {
                if presented.as_deref() != Some(id.as_str()) {
                    let cookie = Cookie::build(cookie_name.to_string(), id)
                        .path("/")
                        .http_only(true)
                        .same_site(SameSite::Lax)
                        .finish();
                    res.response_mut().add_cookie(&cookie)?;
                }
            }

            Ok(res)
        })
    }
}
