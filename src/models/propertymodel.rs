use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "price_unit", rename_all = "lowercase")]
pub enum PriceUnit {
    Night,
    Month,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
pub enum PropertyType {
    Lodge,
    Apartment,
    Condo,
    Suite,
    Luxue,
}

impl PropertyType {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyType::Lodge => "lodge",
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::Suite => "suite",
            PropertyType::Luxue => "luxue",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_for", rename_all = "lowercase")]
pub enum PropertyFor {
    Rent,
    Buy,
}

impl PropertyFor {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyFor::Rent => "rent",
            PropertyFor::Buy => "buy",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PropertyAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for PropertyAddress {
    fn default() -> Self {
        PropertyAddress {
            street: None,
            city: None,
            state: None,
            country: None,
            zip: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

// Appliance fields are counts (how many of each), not flags
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyFeatures {
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
    pub floor: Option<String>,
    pub wardrobe: i32,
    pub parking: i32,
    pub balcony: String,
    pub tv: i32,
    pub ac: i32,
    pub fridge: i32,
    pub microwave: i32,
    pub water_purifier: i32,
    pub curtains: String,
}

impl Default for PropertyFeatures {
    fn default() -> Self {
        PropertyFeatures {
            bedrooms: 0,
            bathrooms: 0,
            sqft: 0,
            floor: None,
            wardrobe: 0,
            parking: 0,
            balcony: "No".to_string(),
            tv: 0,
            ac: 0,
            fridge: 0,
            microwave: 0,
            water_purifier: 0,
            curtains: "No".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    #[serde(default = "FloorPlan::default_title")]
    pub title: String,
    pub file_url: String,
}

impl FloorPlan {
    fn default_title() -> String {
        "Floor Plan".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,

    // Basic listing info
    pub title: String,
    pub description: String,
    pub price: i64,
    pub price_unit: PriceUnit,
    pub property_type: PropertyType,
    pub property_for: PropertyFor,

    // Placement flags
    pub is_new: bool,
    pub is_featured: bool,
    pub is_trending: bool,

    // Structured sub-documents
    pub address: Json<PropertyAddress>,
    pub features: Json<PropertyFeatures>,
    pub amenities: Json<Vec<String>>,
    pub highlights: Json<Vec<String>>,
    pub why_book_with_us: Json<Vec<String>>,
    pub nearby_landmarks: Json<Vec<String>>,

    // Media
    pub images: Json<Vec<String>>,
    pub floor_plans: Json<Vec<FloorPlan>>,

    pub rating: f64,
    pub review_count: i32,
    pub total_visits: i64,

    pub owner_id: Uuid,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_defaults_missing_coordinates_to_zero() {
        let address: PropertyAddress =
            serde_json::from_str(r#"{"city": "Enugu", "country": "Nigeria"}"#).unwrap();

        assert_eq!(address.city.as_deref(), Some("Enugu"));
        assert_eq!(address.latitude, 0.0);
        assert_eq!(address.longitude, 0.0);
        assert!(address.street.is_none());
    }

    #[test]
    fn features_default_balcony_and_curtains_to_no() {
        let features: PropertyFeatures =
            serde_json::from_str(r#"{"bedrooms": 2, "waterPurifier": 1}"#).unwrap();

        assert_eq!(features.bedrooms, 2);
        assert_eq!(features.water_purifier, 1);
        assert_eq!(features.wardrobe, 0);
        assert_eq!(features.balcony, "No");
        assert_eq!(features.curtains, "No");
    }

    #[test]
    fn floor_plan_title_defaults_when_missing() {
        let plan: FloorPlan =
            serde_json::from_str(r#"{"fileUrl": "https://cdn.example.com/p.png"}"#).unwrap();

        assert_eq!(plan.title, "Floor Plan");
        assert_eq!(plan.file_url, "https://cdn.example.com/p.png");
    }
}
