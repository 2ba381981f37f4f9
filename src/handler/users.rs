use std::sync::Arc;

use axum::{extract::{Multipart, Query}, response::IntoResponse, routing::{get, put}, Extension, Json, Router};
use validator::Validate;

use crate::{db::userdb::UserExt, dtos::userdtos::{ApiResponse, FilterUserDto, Pagination, RequestQueryDto, UpdateProfileDto, UserData, UserListData}, error::{ErrorMessage, HttpError}, middleware::JWTAuthMiddeware, AppState};

pub fn users_handler() -> Router {
    Router::new()
        .route("/", get(get_all_users))
        .route("/profile", get(get_me).put(update_profile))
        .route("/profile/avatar", put(update_avatar))
}

pub async fn get_me(
    Extension(_app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(ApiResponse::success(
        UserData { user: filtered_user },
        "Success",
    )))
}

pub async fn get_all_users(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let users = app_state.db_client
        .get_users(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user_count = app_state.db_client
        .get_user_count()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = ApiResponse::success(
        UserListData {
            users: FilterUserDto::filter_users(&users),
            pagination: Pagination::new(user_count, limit, page),
        },
        "Success",
    );

    Ok(Json(response))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let updated_user = app_state.db_client
        .update_user_profile(
            user.user.id,
            body.full_name,
            body.username,
            body.email,
            body.phone_number,
            body.whatsapp_number,
            body.agent_title,
        )
        .await
        .map_err(|e| {
            // Username and email keep their unique indexes on this path too
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return HttpError::conflict(ErrorMessage::UserAlreadyExists.to_string());
                }
            }
            HttpError::server_error(e.to_string())
        })?;

    let filtered_user = FilterUserDto::filter_user(&updated_user);

    Ok(Json(ApiResponse::success(
        UserData { user: filtered_user },
        "Profile updated successfully",
    )))
}

pub async fn update_avatar(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut avatar_file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        if field.name() == Some("avatar") {
            let file_name = field.file_name().unwrap_or("avatar").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| HttpError::bad_request(e.to_string()))?;
            avatar_file = Some((file_name, data.to_vec()));
        }
    }

    let (file_name, data) =
        avatar_file.ok_or(HttpError::bad_request("Avatar file is required"))?;

    let uploaded = app_state.uploader
        .upload(&file_name, data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let avatar_url = uploaded.ok_or(HttpError::bad_request("Avatar upload failed"))?;

    let updated_user = app_state.db_client
        .update_user_avatar(user.user.id, &avatar_url)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_user = FilterUserDto::filter_user(&updated_user);

    Ok(Json(ApiResponse::success(
        UserData { user: filtered_user },
        "Avatar updated successfully",
    )))
}
