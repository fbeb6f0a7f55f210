use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use taskvault::{
    auth::{AuthMiddleware, PasswordHasher, TokenIssuer},
    config::Config,
    routes::{self, health},
    PgUserStore, UserStore,
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pg_store = PgUserStore::connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;
    pg_store
        .migrate()
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let store: Arc<dyn UserStore> = Arc::new(pg_store);
    let store = web::Data::from(store);
    let issuer = web::Data::new(TokenIssuer::from_config(&config));
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(issuer.clone())
            .app_data(hasher.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(issuer.clone()))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
