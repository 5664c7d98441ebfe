//! Notification inbox endpoints.

use super::AppState;
use super::error::ApiResult;
use crate::core::notification;
use crate::core::session::Session;
use crate::entities::NotificationModel;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

/// Notification route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", post(mark_read))
}

/// The caller's inbox.
#[derive(Debug, Serialize)]
pub struct Inbox {
    /// Number of unread notifications
    pub unread: u64,
    /// Newest first
    pub notifications: Vec<NotificationModel>,
}

/// `GET /notifications`
pub async fn list_notifications(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Inbox>> {
    let notifications =
        notification::list_notifications_for_user(&state.db, &session.user_id).await?;
    let unread = notification::unread_count(&state.db, &session.user_id).await?;
    Ok(Json(Inbox {
        unread,
        notifications,
    }))
}

/// `POST /notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    session: Session,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<NotificationModel>> {
    Ok(Json(
        notification::mark_notification_read(&state.db, &session, notification_id).await?,
    ))
}
