pub mod auth;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(tasks::index)
    .service(tasks::add_task_form)
    .service(tasks::add_task)
    .service(tasks::delete_task)
    .service(tasks::task_completion)
    .service(tasks::edit_task)
    .service(tasks::update_task)
    .service(auth::login_form)
    .service(auth::login)
    .service(auth::logout)
    .service(auth::register_form)
    .service(auth::register);
}
