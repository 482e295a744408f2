//! HTML presentation: the embedded template set and the apology page.

use actix_web::{http::StatusCode, HttpResponse};
use lazy_static::lazy_static;
use tera::{Context, Tera};

use crate::error::AppError;

lazy_static! {
    // Built-in templates, embedded at compile time.
    static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("../templates/layout.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("add_task.html", include_str!("../templates/add_task.html")),
            ("edit_task.html", include_str!("../templates/edit_task.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("register.html", include_str!("../templates/register.html")),
            ("apology.html", include_str!("../templates/apology.html")),
        ])
        .unwrap();
        tera
    };
}

/// A context pre-filled with the values `layout.html` expects.
pub fn context(logged_in: bool) -> Context {
    let mut context = base_context();
    context.insert("logged_in", &logged_in);
    context
}

// Without `logged_in` the layout shows only the home link.
fn base_context() -> Context {
    let mut context = Context::new();
    context.insert("today", &chrono::Local::now().date_naive());
    context
}

/// Renders `template` into a `200 OK` HTML response.
pub fn render(template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    let html = TEMPLATES.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Renders the uniform error page.
///
/// Errors are rendered without access to the session, so the page carries no
/// account links. Falls back to a bare HTML body if the apology template itself fails
/// to render.
pub fn apology(message: &str, status: StatusCode) -> HttpResponse {
    let mut ctx = base_context();
    ctx.insert("message", message);
    ctx.insert("status", &status.as_u16());

    let html = TEMPLATES.render("apology.html", &ctx).unwrap_or_else(|e| {
        log::error!("Failed to render apology.html: {}", e);
        format!(
            "<!DOCTYPE html><html><body><h1>{}</h1><p>{}</p></body></html>",
            status.as_u16(),
            tera::escape_html(message)
        )
    });

    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Redirect issued after every successful mutation.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, location))
        .finish()
}
