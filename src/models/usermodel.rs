use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub agent_title: Option<String>,
    pub avatar: Option<String>,
    pub is_verified: bool,

    // Credential state, excluded from API responses by the filter DTOs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
