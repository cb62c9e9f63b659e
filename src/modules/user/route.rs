use crate::{middlewares::authentication, modules::user::handle::*};
use actix_web::{
    middleware::from_fn,
    web::{self, ServiceConfig, scope},
};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth").service(register).service(login).service(
            web::resource("/logout").wrap(from_fn(authentication)).route(web::post().to(logout)),
        ),
    )
    .service(scope("/email").service(verify_email).service(resend_verification));
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/users").service(list_users));
}
