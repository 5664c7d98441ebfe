//! Notification business logic.
//!
//! Notifications are written as a side effect of order transitions. The create function
//! is generic over the connection so it can join the caller's database transaction.

use crate::{
    core::session::Session,
    entities::{Notification, notification},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Inserts a notification for `user_id`.
pub async fn create_notification<C>(
    db: &C,
    user_id: &str,
    order_id: Option<i64>,
    title: &str,
    message: &str,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let notification = notification::ActiveModel {
        user_id: Set(user_id.to_string()),
        order_id: Set(order_id),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    notification.insert(db).await.map_err(Into::into)
}

/// Lists a user's notifications, newest first.
pub async fn list_notifications_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every notification attached to an order, oldest first.
pub async fn list_notifications_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::OrderId.eq(order_id))
        .order_by_asc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts a user's unread notifications.
pub async fn unread_count(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks one of the caller's notifications as read.
///
/// # Errors
/// Returns `NotFound` if the notification does not exist and `Forbidden` if it belongs
/// to someone else.
pub async fn mark_notification_read(
    db: &DatabaseConnection,
    session: &Session,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("notification", notification_id))?;

    if !session.is(&existing.user_id) {
        return Err(Error::forbidden("notification belongs to another user"));
    }

    if existing.is_read {
        return Ok(existing);
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_list_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "buyer-1").await?;

        create_notification(&db, "buyer-1", None, "First", "one").await?;
        create_notification(&db, "buyer-1", None, "Second", "two").await?;
        create_notification(&db, "someone-else", None, "Other", "x").await?;

        let list = list_notifications_for_user(&db, "buyer-1").await?;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Second");
        assert_eq!(list[1].title, "First");
        assert_eq!(unread_count(&db, "buyer-1").await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_only_by_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let note = create_notification(&db, "buyer-1", None, "Hello", "hi").await?;

        let result = mark_notification_read(&db, &Session::new("intruder"), note.id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let updated = mark_notification_read(&db, &Session::new("buyer-1"), note.id).await?;
        assert!(updated.is_read);
        assert_eq!(unread_count(&db, "buyer-1").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let result = mark_notification_read(&db, &Session::new("buyer-1"), 42).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
