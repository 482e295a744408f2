use crate::{
    auth::{AuthService, LoginForm, RegisterForm, Session},
    error::AppError,
    views,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};

/// Login form
///
/// Showing the form forgets any identity bound to the session.
#[get("/login")]
pub async fn login_form(
    auth: web::Data<AuthService>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    auth.logout(&session).await?;
    views::render("login.html", &views::context(false))
}

/// Log user in
///
/// A successful login replaces the session id presented by the client.
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    auth.login(&session, &form).await?.attach(&req);
    Ok(views::redirect("/"))
}

/// Log user out
#[get("/logout")]
pub async fn logout(
    auth: web::Data<AuthService>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    auth.logout(&session).await?;
    Ok(views::redirect("/"))
}

#[get("/register")]
pub async fn register_form(session: Session) -> Result<HttpResponse, AppError> {
    views::render("register.html", &views::context(session.is_authenticated()))
}

/// Register a new user
///
/// Validation failures are reported with status 400 on this form.
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    auth.register(&session, &form)
        .await
        .map_err(AppError::into_registration_error)?
        .attach(&req);
    Ok(views::redirect("/"))
}
