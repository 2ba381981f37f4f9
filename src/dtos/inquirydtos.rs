use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

use crate::dtos::userdtos::Pagination;
use crate::models::inquirymodel::Inquiry;
use crate::models::propertymodel::Property;
use crate::models::usermodel::User;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitInquiryDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Property id is required"))]
    #[serde(rename = "propertyId")]
    pub property_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InquiryPropertyDto {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InquiryOwnerDto {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterInquiryDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    // Populated summaries; null when the referenced row no longer exists
    pub property: Option<InquiryPropertyDto>,
    pub owner: Option<InquiryOwnerDto>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FilterInquiryDto {
    pub fn from_inquiry(
        inquiry: &Inquiry,
        property: Option<&Property>,
        owner: Option<&User>,
    ) -> Self {
        FilterInquiryDto {
            id: inquiry.id.to_string(),
            name: inquiry.name.to_owned(),
            email: inquiry.email.to_owned(),
            phone: inquiry.phone.to_owned(),
            description: inquiry.description.to_owned(),
            property: property.map(|p| InquiryPropertyDto {
                id: p.id.to_string(),
                title: p.title.to_owned(),
            }),
            owner: owner.map(|u| InquiryOwnerDto {
                full_name: u.full_name.to_owned(),
                email: u.email.to_owned(),
            }),
            created_at: inquiry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InquiryData {
    pub inquiry: FilterInquiryDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InquiryListData {
    pub inquiries: Vec<FilterInquiryDto>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_dto_rejects_missing_contact_details() {
        let body: SubmitInquiryDto = serde_json::from_str(
            r#"{"name": "", "email": "not-an-email", "phone": "", "description": "", "propertyId": ""}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn submit_dto_reads_property_id_from_the_renamed_key() {
        let body: SubmitInquiryDto = serde_json::from_str(
            r#"{
                "name": "Ada",
                "email": "ada@example.com",
                "phone": "+2348010000000",
                "description": "Is this still available?",
                "propertyId": "6e9c1b2a-5f4d-4c3b-9a8e-7d6f5e4d3c2b"
            }"#,
        )
        .unwrap();
        assert!(body.validate().is_ok());
        assert_eq!(body.property_id, "6e9c1b2a-5f4d-4c3b-9a8e-7d6f5e4d3c2b");
    }

    #[test]
    fn filter_dto_leaves_dangling_references_null() {
        use uuid::Uuid;

        let inquiry = Inquiry {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+2348010000000".to_string(),
            description: "Is this still available?".to_string(),
            property_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_value(FilterInquiryDto::from_inquiry(&inquiry, None, None)).unwrap();
        assert!(json["property"].is_null());
        assert!(json["owner"].is_null());
        assert_eq!(json["name"], "Ada");
    }
}
