#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::header,
    test, web, App,
};
use sqlx::SqlitePool;
use todo_web::{
    auth::{AuthService, SessionMiddleware},
    db,
    models::{CredentialStore, SessionStore, TaskStore},
    routes,
    tasks::TaskService,
};

pub const COOKIE_NAME: &str = "todo_session";

/// A fresh, migrated in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn task_service(pool: &SqlitePool) -> TaskService {
    TaskService::new(TaskStore::new(pool.clone()))
}

pub fn auth_service(pool: &SqlitePool) -> AuthService {
    AuthService::new(
        CredentialStore::new(pool.clone()),
        SessionStore::new(pool.clone()),
        4,
    )
}

/// The full application, wired the same way `main` wires it.
pub async fn init_app(
    pool: &SqlitePool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(auth_service(pool)))
            .app_data(web::Data::new(task_service(pool)))
            .wrap(SessionMiddleware::new(SessionStore::new(pool.clone()), COOKIE_NAME))
            .configure(routes::config),
    )
    .await
}

pub async fn user_id(pool: &SqlitePool, username: &str) -> i64 {
    CredentialStore::new(pool.clone())
        .find_by_username(username)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("user {} should exist", username))
        .user_id
}

/// Remembers the session cookie between requests, the way a browser would.
#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A browser that already carries `session_id`, as if it had been handed one.
    pub fn with_session(session_id: &str) -> Self {
        Self {
            cookie: Some(Cookie::new(COOKIE_NAME, session_id.to_string())),
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.cookie.as_ref().map(|c| c.value().to_string())
    }

    pub async fn get<S, B>(&mut self, app: &S, uri: &str) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = self.with_cookie(test::TestRequest::get().uri(uri));
        let resp = test::call_service(app, req.to_request()).await;
        self.remember(&resp);
        resp
    }

    pub async fn post<S, B>(&mut self, app: &S, uri: &str, form: &[(&str, &str)]) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = self.with_cookie(test::TestRequest::post().uri(uri).set_form(form));
        let resp = test::call_service(app, req.to_request()).await;
        self.remember(&resp);
        resp
    }

    pub async fn register<S, B>(&mut self, app: &S, username: &str, password: &str) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        self.post(
            app,
            "/register",
            &[
                ("username", username),
                ("password", password),
                ("confirmation", password),
            ],
        )
        .await
    }

    pub async fn login<S, B>(&mut self, app: &S, username: &str, password: &str) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        self.post(
            app,
            "/login",
            &[("username", username), ("password", password)],
        )
        .await
    }

    fn with_cookie(&self, req: test::TestRequest) -> test::TestRequest {
        match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    fn remember<B>(&mut self, resp: &ServiceResponse<B>) {
        if let Some(cookie) = resp
            .response()
            .cookies()
            .find(|c| c.name() == COOKIE_NAME)
        {
            self.cookie = Some(cookie.into_owned());
        }
    }
}

/// The session id set by `resp`, if it set one.
pub fn issued_session<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.value().to_string())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8_lossy(&bytes).into_owned()
}
