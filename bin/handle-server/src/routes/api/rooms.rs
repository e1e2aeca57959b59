//! Room creation.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::api::rooms::{CreateRoomResponse, RoomBody};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(create_room), components(schemas(CreateRoomResponse, RoomBody)))]
pub struct RoomsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/createRoom", post(create_room))
}

/// Create a vendor room for a new chat session (`POST /api/createRoom`).
///
/// One vendor call, no retry.
#[utoipa::path(
    post,
    path = "/api/createRoom",
    tag = "widget",
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse),
        (status = 500, description = "Missing credential or vendor failure"),
    )
)]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreateRoomResponse>, ServerError> {
    let room = state.vendor()?.create_room().await?;
    info!(room = %room.uuid, "room created");
    Ok(Json(CreateRoomResponse { room: room.into() }))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use handle_vendor::VendorError;

    use super::super::test_support::{FakeVendor, app, call};

    #[tokio::test]
    async fn returns_room_with_greeting() {
        let (status, body) =
            call(app(Some(Arc::new(FakeVendor::default()))), "POST", "/api/createRoom", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room"]["uuid"], "r1");
        assert_eq!(body["room"]["greeting_message"], "Welcome!");
    }

    #[tokio::test]
    async fn missing_credential_is_500() {
        let (status, body) = call(app(None), "POST", "/api/createRoom", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "server misconfiguration");
    }

    #[tokio::test]
    async fn vendor_failure_is_500_after_one_call() {
        let vendor = Arc::new(FakeVendor::default());
        *vendor.room.lock().unwrap() = Some(Err(VendorError::Status {
            status: 401,
            reason: "Unauthorized".into(),
        }));

        let (status, body) = call(app(Some(vendor.clone())), "POST", "/api/createRoom", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "HTTP error 401: Unauthorized");
        assert_eq!(FakeVendor::count(&vendor.rooms), 1);
    }

    #[tokio::test]
    async fn get_is_not_allowed() {
        let (status, _) = call(app(None), "GET", "/api/createRoom", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
