use crate::{
    api::error,
    modules::friend::schema::{FriendRequestEntity, FriendRequestStatus},
};

/// Only the receiver may move a request, and only to a terminal status.
pub fn can_transition(
    acting_user_id: i64,
    request: &FriendRequestEntity,
    target: FriendRequestStatus,
) -> bool {
    request.receiver_id == acting_user_id && !target.is_pending()
}

/// Authorization first, then the pending check; both run against the locked row.
pub fn ensure_transition(
    acting_user_id: i64,
    request: &FriendRequestEntity,
    target: FriendRequestStatus,
) -> Result<(), error::SystemError> {
    if !can_transition(acting_user_id, request, target) {
        log::warn!(
            "User {} tried to move friend request {} to {:?}",
            acting_user_id,
            request.id,
            target
        );
        return Err(error::SystemError::forbidden("This action is unauthorized."));
    }

    if !request.status.is_pending() {
        return Err(error::SystemError::conflict(
            "This friend request has already been processed.",
        ));
    }

    Ok(())
}
