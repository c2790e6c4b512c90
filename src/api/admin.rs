use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::types::{AdminLoginResponse, LoginRequest, MessageResponse, UserDto};
use super::users::read_text;
use super::validation::{validate_email, validate_name, validate_password};
use super::{ApiError, AppState};
use crate::db::{NewUser, UserPatch};

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let token = state.admin.login(&req.email, &req.password).await?;

    Ok(Json(AdminLoginResponse {
        message: "Admin login successful".to_string(),
        token,
    }))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.admin.list_users().await?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.admin.get_user(id).await?;

    Ok(Json(user.into()))
}

/// Admin user creation, multipart so an initial profile image can be
/// attached. Unlike self-registration, `isAdmin` is honored here.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let fields = collect_fields(&state, multipart).await?;

    let name = fields
        .name
        .ok_or_else(|| ApiError::validation("Name is required"))?;
    let email = fields
        .email
        .ok_or_else(|| ApiError::validation("Email is required"))?;
    let password = fields
        .password
        .ok_or_else(|| ApiError::validation("Password is required"))?;

    let user = state
        .admin
        .create_user(NewUser {
            name,
            email,
            password,
            is_admin: fields.is_admin.unwrap_or(false),
            image_url: fields.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UserDto>, ApiError> {
    let fields = collect_fields(&state, multipart).await?;

    let user = state
        .admin
        .update_user(
            id,
            UserPatch {
                name: fields.name,
                email: fields.email,
                password: fields.password,
                is_admin: fields.is_admin,
                image_url: fields.image_url,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.admin.delete_user(id).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[derive(Default)]
struct UserFields {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    is_admin: Option<bool>,
    image_url: Option<String>,
}

async fn collect_fields(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UserFields, ApiError> {
    let mut fields = UserFields::default();

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
                fields.name = Some(value);
            }
            "email" => {
                let value = read_text(field).await?;
                validate_email(&value)?;
                fields.email = Some(value);
            }
            "password" => {
                let value = read_text(field).await?;
                validate_password(&value)?;
                fields.password = Some(value);
            }
            "isAdmin" => {
                let value = read_text(field).await?;
                fields.is_admin = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::validation("isAdmin must be true or false"))?,
                );
            }
            "image" => {
                let filename = field.file_name().unwrap_or("upload.jpg").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
                fields.image_url = Some(state.uploads.save_image(&filename, &bytes).await?);
            }
            _ => {}
        }
    }

    Ok(fields)
}
