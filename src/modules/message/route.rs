use actix_web::web::{ServiceConfig, scope};

use crate::modules::message::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/messages").service(send_message).service(list_conversation));
}
