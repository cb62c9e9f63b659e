use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::repository_pg::FriendRepositoryPg,
        message::{
            model::{ListMessagesQuery, MessagePage, MessageResponse, SendMessageBody},
            repository_pg::MessageRepositoryPg,
            service::MessageService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type MessageSvc = MessageService<MessageRepositoryPg, FriendRepositoryPg>;

#[post("")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    body: ValidatedJson<SendMessageBody>,
    req: HttpRequest,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let SendMessageBody { receiver_id, message } = body.0;
    let message = message_service.send_message(sender_id, receiver_id, message).await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully."))
}

#[get("/{friend_id}")]
pub async fn list_conversation(
    message_service: web::Data<MessageSvc>,
    friend_id: web::Path<i64>,
    query: ValidatedQuery<ListMessagesQuery>,
    req: HttpRequest,
) -> Result<success::Success<MessagePage>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let page = message_service.list_conversation(user_id, friend_id.into_inner(), query.0).await?;

    Ok(success::Success::ok(Some(page)))
}
