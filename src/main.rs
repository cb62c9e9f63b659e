use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    api::error,
    configs::{RedisCache, connect_database},
    middlewares::{authentication, verified},
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        user::{
            repository_pg::UserRepositoryPg,
            service::{AuthSettings, UserService},
        },
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool = connect_database().await.map_err(|e| {
        log::error!("Database connection error: {e}");
        std::io::Error::other("Database connection error")
    })?;

    let redis_pool = RedisCache::new().await.map_err(|e| {
        log::error!("Redis connection error: {e}");
        std::io::Error::other("Redis connection error")
    })?;

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let message_repo = MessageRepositoryPg::new(db_pool.clone());

    let user_service = UserService::with_dependencies(
        Arc::new(user_repo.clone()),
        Arc::new(redis_pool),
        AuthSettings::from_env(),
    );
    let friend_service =
        FriendService::with_dependencies(friend_repo.clone(), Arc::new(user_repo));
    let message_service = MessageService::with_dependencies(Arc::new(message_repo), friend_repo);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                error::Error::not_found(err.to_string()).into()
            }))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .service(health_check)
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(verified))
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure)
                        .configure(modules::message::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
