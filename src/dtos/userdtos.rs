use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::usermodel::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub errors: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: message.into(),
            errors: vec![],
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: None,
            message: message.into(),
            errors: vec![],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub total: i64,
    pub pages: i64,
    #[serde(rename = "currentPage")]
    pub current_page: usize,
}

impl Pagination {
    // pages = ceil(total / limit); the requested page is echoed back unclamped
    pub fn new(total: i64, limit: usize, page: usize) -> Self {
        let limit = limit.max(1) as i64;
        Pagination {
            total,
            pages: (total + limit - 1) / limit,
            current_page: page,
        }
    }
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Full name is required"))]
    #[serde(rename = "fullName")]
    pub full_name: String,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOtpDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,

    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,

    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: Option<String>,

    #[serde(rename = "agentTitle")]
    pub agent_title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterUserDto {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: Option<String>,
    #[serde(rename = "agentTitle")]
    pub agent_title: Option<String>,
    pub avatar: Option<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            full_name: user.full_name.to_owned(),
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            phone_number: user.phone_number.clone(),
            whatsapp_number: user.whatsapp_number.clone(),
            agent_title: user.agent_title.clone(),
            avatar: user.avatar.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUserData {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginData {
    pub user: FilterUserDto,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListData {
    pub users: Vec<FilterUserDto>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Ada Obi".to_string(),
            username: "ada_obi".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$stub".to_string(),
            phone_number: Some("+2348012345678".to_string()),
            whatsapp_number: None,
            agent_title: Some("Property Agent".to_string()),
            avatar: None,
            is_verified: true,
            otp: Some("123456".to_string()),
            otp_expires_at: None,
            refresh_token: Some("secret-token".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pagination_pages_is_ceil_of_total_over_limit() {
        assert_eq!(Pagination::new(25, 10, 1).pages, 3);
        assert_eq!(Pagination::new(30, 10, 1).pages, 3);
        assert_eq!(Pagination::new(0, 10, 1).pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).pages, 1);
    }

    #[test]
    fn pagination_echoes_requested_page_without_clamping() {
        let meta = Pagination::new(25, 10, 99);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.current_page, 99);
    }

    #[test]
    fn filter_user_excludes_credentials() {
        let user = sample_user();
        let filtered = FilterUserDto::filter_user(&user);
        let json = serde_json::to_value(&filtered).unwrap();

        assert_eq!(json["fullName"], "Ada Obi");
        assert_eq!(json["isVerified"], true);
        assert!(json.get("password").is_none());
        assert!(json.get("otp").is_none());
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("refresh_token").is_none());
    }

    #[test]
    fn register_dto_rejects_blank_fields() {
        let body = RegisterUserDto {
            full_name: "".to_string(),
            username: "ada".to_string(),
            email: "not-an-email".to_string(),
            password: "pass".to_string(),
        };
        let result = body.validate();

        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn success_envelope_shape() {
        let body = ApiResponse::success(
            RegisteredUserData { user_id: Uuid::nil() },
            "OTP sent to email.",
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "OTP sent to email.");
        assert_eq!(json["data"]["userId"], Uuid::nil().to_string());
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn message_envelope_carries_null_data() {
        let body = ApiResponse::message("Logged out successfully");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], true);
        assert!(json["data"].is_null());
    }
}

