use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::AppendHeaders,
};
use std::sync::Arc;

use super::auth::{CurrentUser, clear_cookie, session_cookie};
use super::types::{LoginRequest, MessageResponse, RegisterRequest, UserDto};
use super::validation::{validate_email, validate_name, validate_password};
use super::{ApiError, AppState};
use crate::db::UserPatch;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let user = state
        .users
        .register(req.name, req.email, req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(header::HeaderName, String); 1]>, Json<UserDto>), ApiError> {
    let (user, token) = state.users.login(&req.email, &req.password).await?;

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.user_session_days * 86400,
        state.config.server.secure_cookies,
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(user.into()),
    ))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
) -> (
    AppendHeaders<[(header::HeaderName, String); 1]>,
    Json<MessageResponse>,
) {
    let cookie = clear_cookie(
        &state.config.auth.cookie_name,
        state.config.server.secure_cookies,
    );

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

pub async fn get_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserDto> {
    Json(user.into())
}

/// Profile update arrives as multipart form data so an image file can
/// ride along with the text fields. All fields are optional.
pub async fn edit_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UserDto>, ApiError> {
    let mut patch = UserPatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => {
                let value = read_text(field).await?;
                validate_name(&value)?;
                patch.name = Some(value);
            }
            "email" => {
                let value = read_text(field).await?;
                validate_email(&value)?;
                patch.email = Some(value);
            }
            "password" => {
                let value = read_text(field).await?;
                validate_password(&value)?;
                patch.password = Some(value);
            }
            "image" => {
                let filename = field.file_name().unwrap_or("upload.jpg").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
                patch.image_url = Some(state.uploads.save_image(&filename, &bytes).await?);
            }
            _ => {}
        }
    }

    let updated = state.users.edit_profile(user.id, patch).await?;
    Ok(Json(updated.into()))
}

pub(super) async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart field: {e}")))
}
