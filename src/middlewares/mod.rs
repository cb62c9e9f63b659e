use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};

use crate::{api::error, modules::user::service::UserService, utils::Claims};

fn user_service(req: &ServiceRequest) -> Result<web::Data<UserService>, error::Error> {
    req.app_data::<web::Data<UserService>>().cloned().ok_or_else(|| {
        log::error!("UserService is not registered as app data");
        error::Error::internal_server_error()
    })
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t.to_owned(),
        None => {
            return Err(error::Error::unauthorized("Unauthenticated.").into());
        }
    };

    let claims = user_service(&req)?.authenticate(&token).await.map_err(error::Error::from)?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

/// Requires the authenticated user to have a verified email address.
pub async fn verified<B>(req: ServiceRequest, next: Next<B>) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let user_id = get_claims(req.request())?.sub;

    if let Err(e) = user_service(&req)?.ensure_active(user_id).await {
        if matches!(e, error::SystemError::Forbidden(_)) {
            log::warn!("User {} rejected: email not verified", user_id);
        }
        return Err(error::Error::from(e).into());
    }

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthenticated."))?
        .clone();

    Ok(claims)
}
