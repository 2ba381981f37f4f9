use std::sync::Arc;

use axum::{http::{header, HeaderMap, StatusCode}, middleware, response::IntoResponse, routing::post, Extension, Json, Router};
use axum_extra::extract::cookie::Cookie;
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{db::userdb::UserExt, dtos::userdtos::{ApiResponse, FilterUserDto, LoginUserDto, RegisterUserDto, RegisteredUserData, UserLoginData, VerifyOtpDto}, error::{ErrorMessage, HttpError}, mail::mails::send_otp_email, middleware::{auth, JWTAuthMiddeware}, utils::{otp, password, token}, AppState};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify_otp))
        .route("/login", post(login))
        .route("/logout", post(logout).layer(middleware::from_fn(auth)))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    if body.full_name.trim().is_empty()
        || body.username.trim().is_empty()
        || body.email.trim().is_empty()
        || body.password.trim().is_empty()
    {
        return Err(HttpError::bad_request("All fields are required"));
    }

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing_user = app_state.db_client
        .get_user(None, None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::conflict(ErrorMessage::UserAlreadyExists.to_string()));
    }

    let existing_user = app_state.db_client
        .get_user(None, Some(&body.username), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::conflict(ErrorMessage::UserAlreadyExists.to_string()));
    }

    let hashed_password = password::hash(&body.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let otp_code = otp::generate_otp();
    let otp_expires_at = Utc::now() + Duration::minutes(10);

    let user = app_state.db_client
        .save_user(
            body.full_name,
            body.username,
            body.email,
            hashed_password,
            otp_code.clone(),
            otp_expires_at,
        )
        .await
        .map_err(|e| {
            // Concurrent registrations can slip past the pre-checks
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return HttpError::conflict(ErrorMessage::UserAlreadyExists.to_string());
                }
            }
            HttpError::server_error(e.to_string())
        })?;

    send_otp_email(&app_state.env, &user.email, &otp_code)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = ApiResponse::success(
        RegisteredUserData { user_id: user.id },
        "OTP sent to email.",
    );

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn verify_otp(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyOtpDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let verified = app_state.db_client
        .verify_user_otp(&body.email, &body.otp)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if verified.is_none() {
        return Err(HttpError::bad_request("Invalid or expired OTP"));
    }

    Ok(Json(ApiResponse::success(
        serde_json::json!({}),
        "Verified successfully",
    )))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state.db_client
        .get_user(None, None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = result.ok_or(HttpError::not_found("User not found"))?;

    if !user.is_verified {
        return Err(HttpError::forbidden("Verify email first"));
    }

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()));
    }

    let access_token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let refresh_token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_refresh_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state.db_client
        .update_refresh_token(user.id, Some(&refresh_token))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("User not found"))?;

    let access_cookie = Cookie::build(("access_token", access_token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .secure(true)
        .build();

    let refresh_cookie = Cookie::build(("refresh_token", refresh_token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_refresh_maxage))
        .http_only(true)
        .secure(true)
        .build();

    let response = Json(ApiResponse::success(
        UserLoginData {
            user: FilterUserDto::filter_user(&user),
            access_token,
            refresh_token,
        },
        "Logged in",
    ));

    let mut headers = HeaderMap::new();

    headers.append(header::SET_COOKIE, access_cookie.to_string().parse().unwrap());
    headers.append(header::SET_COOKIE, refresh_cookie.to_string().parse().unwrap());

    let mut response = response.into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

pub async fn logout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.db_client
        .update_refresh_token(user.user.id, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let access_cookie = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::hours(-1))
        .http_only(true)
        .secure(true)
        .build();

    let refresh_cookie = Cookie::build(("refresh_token", ""))
        .path("/")
        .max_age(time::Duration::hours(-1))
        .http_only(true)
        .secure(true)
        .build();

    let response = Json(ApiResponse::success(serde_json::json!({}), "Logged out"));

    let mut headers = HeaderMap::new();

    headers.append(header::SET_COOKIE, access_cookie.to_string().parse().unwrap());
    headers.append(header::SET_COOKIE, refresh_cookie.to_string().parse().unwrap());

    let mut response = response.into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}
