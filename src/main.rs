use actix_web::{middleware::Logger, rt, web, App, HttpServer};
use std::time::Duration;
use todo_web::{
    auth::{AuthService, SessionMiddleware},
    config::Config,
    db,
    models::{CredentialStore, SessionStore, TaskStore},
    routes,
    tasks::TaskService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(to_io_error)?;
    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(to_io_error)?;
    db::migrate(&pool).await.map_err(to_io_error)?;

    let sessions = SessionStore::new(pool.clone())
        .with_ttl(chrono::Duration::hours(config.session_ttl_hours));
    spawn_session_sweep(sessions.clone());
    let auth = web::Data::new(AuthService::new(
        CredentialStore::new(pool.clone()),
        sessions.clone(),
        config.bcrypt_cost,
    ));
    let tasks = web::Data::new(TaskService::new(TaskStore::new(pool)));
    let cookie_name = config.session_cookie_name.clone();

    log::info!("Starting to-do server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth.clone())
            .app_data(tasks.clone())
            .wrap(SessionMiddleware::new(sessions.clone(), cookie_name.clone()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

/// Deletes expired session records at startup and then hourly.
fn spawn_session_sweep(sessions: SessionStore) {
    rt::spawn(async move {
        let mut interval = rt::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => log::info!("Purged {} expired sessions", purged),
                Err(e) => log::error!("Failed to purge expired sessions: {}", e),
            }
        }
    });
}

fn to_io_error(err: todo_web::AppError) -> std::io::Error {
    log::error!("{}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
