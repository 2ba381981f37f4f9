use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

use crate::dtos::userdtos::Pagination;
use crate::models::propertymodel::{
    FloorPlan, Property, PropertyAddress, PropertyFeatures, PropertyFor, PropertyType, PriceUnit,
};
use crate::models::usermodel::User;

#[derive(Serialize, Deserialize, Validate)]
pub struct PropertyListQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,

    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<i64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<i64>,
    #[serde(rename = "propertyFor")]
    pub property_for: Option<PropertyFor>,

    // Only honored by the admin listing
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PropertySearchFilters {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub property_for: Option<PropertyFor>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OwnerDetailsDto {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub agent_title: Option<String>,
}

// Accumulates the multipart fields of a property create/update request.
// File fields are uploaded as they stream in; their URLs land here.
#[derive(Debug, Default, Clone)]
pub struct PropertyForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub price_unit: Option<PriceUnit>,
    pub property_type: Option<PropertyType>,
    pub property_for: Option<PropertyFor>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub address: Option<PropertyAddress>,
    pub features: Option<PropertyFeatures>,
    pub amenities: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
    pub why_book_with_us: Option<Vec<String>>,
    pub nearby_landmarks: Option<Vec<String>>,
    pub floor_plan_titles: Vec<String>,
    pub owner: OwnerDetailsDto,
    pub images: Vec<String>,
    pub floor_plan_files: Vec<String>,
    pub owner_avatar: Option<String>,
}

fn parse_enum<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl PropertyForm {
    pub fn set_text_field(&mut self, name: &str, value: String) -> Result<(), String> {
        match name {
            "title" => self.title = non_empty(value),
            "description" => self.description = non_empty(value),
            "price" => {
                self.price = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| format!("Invalid price: {}", value))?,
                )
            }
            "priceUnit" => {
                self.price_unit =
                    Some(parse_enum(&value).ok_or(format!("Invalid price unit: {}", value))?)
            }
            "type" => {
                self.property_type =
                    Some(parse_enum(&value).ok_or(format!("Invalid property type: {}", value))?)
            }
            "propertyFor" => {
                self.property_for =
                    Some(parse_enum(&value).ok_or(format!("Invalid propertyFor value: {}", value))?)
            }
            "isNew" => {
                self.is_new = Some(
                    value
                        .parse::<bool>()
                        .map_err(|_| format!("Invalid isNew flag: {}", value))?,
                )
            }
            "isFeatured" => {
                self.is_featured = Some(
                    value
                        .parse::<bool>()
                        .map_err(|_| format!("Invalid isFeatured flag: {}", value))?,
                )
            }
            "isTrending" => {
                self.is_trending = Some(
                    value
                        .parse::<bool>()
                        .map_err(|_| format!("Invalid isTrending flag: {}", value))?,
                )
            }
            "rating" => {
                self.rating = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid rating: {}", value))?,
                )
            }
            "reviewCount" => {
                self.review_count = Some(
                    value
                        .parse::<i32>()
                        .map_err(|_| format!("Invalid review count: {}", value))?,
                )
            }
            "address" => {
                self.address =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid address JSON")?)
            }
            "features" => {
                self.features =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid features JSON")?)
            }
            "amenities" => {
                self.amenities =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid amenities JSON")?)
            }
            "highlights" => {
                self.highlights =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid highlights JSON")?)
            }
            "whyBookWithUs" => {
                self.why_book_with_us =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid whyBookWithUs JSON")?)
            }
            "nearbyLandmarks" => {
                self.nearby_landmarks =
                    Some(serde_json::from_str(&value).map_err(|_| "Invalid nearbyLandmarks JSON")?)
            }
            "floorPlanTitles" => self.floor_plan_titles.push(value),
            "ownerEmail" => self.owner.email = non_empty(value),
            "ownerFullName" => self.owner.full_name = non_empty(value),
            "ownerUsername" => self.owner.username = non_empty(value),
            "ownerPhoneNumber" => self.owner.phone_number = non_empty(value),
            "ownerWhatsAppNumber" => self.owner.whatsapp_number = non_empty(value),
            "ownerAgentTitle" => self.owner.agent_title = non_empty(value),
            // Unknown fields are ignored
            _ => {}
        }
        Ok(())
    }

    pub fn require_create_fields(&self) -> Result<(), String> {
        if self.title.is_none() {
            return Err("Title is required".to_string());
        }
        if self.description.is_none() {
            return Err("Description is required".to_string());
        }
        if self.price.is_none() {
            return Err("Price is required".to_string());
        }
        if self.property_type.is_none() {
            return Err("Property type is required".to_string());
        }
        if self.property_for.is_none() {
            return Err("propertyFor is required".to_string());
        }
        Ok(())
    }

    // Pairs uploaded floor plan files with their submitted titles by position
    pub fn floor_plans(&self) -> Vec<FloorPlan> {
        self.floor_plan_files
            .iter()
            .enumerate()
            .map(|(i, file_url)| FloorPlan {
                title: self
                    .floor_plan_titles
                    .get(i)
                    .filter(|title| !title.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| "Plan".to_string()),
                file_url: file_url.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PropertyOwnerDto {
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
}

impl PropertyOwnerDto {
    pub fn from_user(user: &User) -> Self {
        PropertyOwnerDto {
            id: user.id.to_string(),
            full_name: user.full_name.to_owned(),
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            phone_number: user.phone_number.clone(),
            whatsapp_number: user.whatsapp_number.clone(),
            agent_title: user.agent_title.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterPropertyDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    #[serde(rename = "priceUnit")]
    pub price_unit: PriceUnit,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(rename = "propertyFor")]
    pub property_for: PropertyFor,
    #[serde(rename = "isNew")]
    pub is_new: bool,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    #[serde(rename = "isTrending")]
    pub is_trending: bool,
    pub address: PropertyAddress,
    pub features: PropertyFeatures,
    pub amenities: Vec<String>,
    pub highlights: Vec<String>,
    #[serde(rename = "whyBookWithUs")]
    pub why_book_with_us: Vec<String>,
    #[serde(rename = "nearbyLandmarks")]
    pub nearby_landmarks: Vec<String>,
    pub images: Vec<String>,
    #[serde(rename = "floorPlans")]
    pub floor_plans: Vec<FloorPlan>,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: i32,
    #[serde(rename = "totalVisits")]
    pub total_visits: i64,
    pub owner: Option<PropertyOwnerDto>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FilterPropertyDto {
    pub fn from_property(property: &Property, owner: Option<&User>) -> Self {
        FilterPropertyDto {
            id: property.id.to_string(),
            title: property.title.to_owned(),
            description: property.description.to_owned(),
            price: property.price,
            price_unit: property.price_unit,
            property_type: property.property_type,
            property_for: property.property_for,
            is_new: property.is_new,
            is_featured: property.is_featured,
            is_trending: property.is_trending,
            address: property.address.0.clone(),
            features: property.features.0.clone(),
            amenities: property.amenities.0.clone(),
            highlights: property.highlights.0.clone(),
            why_book_with_us: property.why_book_with_us.0.clone(),
            nearby_landmarks: property.nearby_landmarks.0.clone(),
            images: property.images.0.clone(),
            floor_plans: property.floor_plans.0.clone(),
            rating: property.rating,
            review_count: property.review_count,
            total_visits: property.total_visits,
            owner: owner.map(PropertyOwnerDto::from_user),
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyData {
    pub property: FilterPropertyDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyListData {
    pub properties: Vec<FilterPropertyDto>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_parse_into_typed_slots() {
        let mut form = PropertyForm::default();
        form.set_text_field("title", "Lakeside Suite".to_string()).unwrap();
        form.set_text_field("price", "2500".to_string()).unwrap();
        form.set_text_field("priceUnit", "Night".to_string()).unwrap();
        form.set_text_field("type", "Suite".to_string()).unwrap();
        form.set_text_field("propertyFor", "Rent".to_string()).unwrap();
        form.set_text_field("isFeatured", "true".to_string()).unwrap();
        form.set_text_field(
            "address",
            r#"{"city": "Lagos", "country": "Nigeria"}"#.to_string(),
        )
        .unwrap();
        form.set_text_field("amenities", r#"["Wifi", "Pool"]"#.to_string()).unwrap();

        assert_eq!(form.title.as_deref(), Some("Lakeside Suite"));
        assert_eq!(form.price, Some(2500));
        assert_eq!(form.price_unit, Some(PriceUnit::Night));
        assert_eq!(form.property_type, Some(PropertyType::Suite));
        assert_eq!(form.property_for, Some(PropertyFor::Rent));
        assert_eq!(form.is_featured, Some(true));
        assert_eq!(
            form.address.as_ref().and_then(|a| a.city.as_deref()),
            Some("Lagos")
        );
        assert_eq!(form.amenities.as_deref(), Some(&["Wifi".to_string(), "Pool".to_string()][..]));
    }

    #[test]
    fn invalid_enum_and_number_values_are_rejected() {
        let mut form = PropertyForm::default();
        assert!(form.set_text_field("type", "Castle".to_string()).is_err());
        assert!(form.set_text_field("price", "cheap".to_string()).is_err());
        assert!(form.set_text_field("isNew", "yes".to_string()).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut form = PropertyForm::default();
        assert!(form.set_text_field("somethingElse", "x".to_string()).is_ok());
        assert!(form.title.is_none());
    }

    #[test]
    fn blank_owner_email_counts_as_absent() {
        let mut form = PropertyForm::default();
        form.set_text_field("ownerEmail", "   ".to_string()).unwrap();
        assert!(form.owner.email.is_none());
    }

    #[test]
    fn create_requires_the_core_fields() {
        let mut form = PropertyForm::default();
        assert!(form.require_create_fields().is_err());

        form.set_text_field("title", "Lakeside Suite".to_string()).unwrap();
        form.set_text_field("description", "Two-bed suite by the lake".to_string())
            .unwrap();
        form.set_text_field("price", "2500".to_string()).unwrap();
        form.set_text_field("type", "Suite".to_string()).unwrap();
        form.set_text_field("propertyFor", "Rent".to_string()).unwrap();
        assert!(form.require_create_fields().is_ok());
    }

    #[test]
    fn floor_plan_titles_pair_by_position_with_plan_fallback() {
        let mut form = PropertyForm::default();
        form.floor_plan_files = vec![
            "https://cdn.example.com/a.png".to_string(),
            "https://cdn.example.com/b.png".to_string(),
            "https://cdn.example.com/c.png".to_string(),
        ];
        form.set_text_field("floorPlanTitles", "Ground Floor".to_string()).unwrap();
        form.set_text_field("floorPlanTitles", "".to_string()).unwrap();

        let plans = form.floor_plans();
        assert_eq!(plans[0].title, "Ground Floor");
        assert_eq!(plans[1].title, "Plan");
        assert_eq!(plans[2].title, "Plan");
        assert_eq!(plans[2].file_url, "https://cdn.example.com/c.png");
    }

    #[test]
    fn list_query_accepts_renamed_filter_keys() {
        let query: PropertyListQueryDto = serde_json::from_str(
            r#"{"type": "Apartment", "minPrice": 1000, "maxPrice": 5000, "propertyFor": "Buy", "page": 2}"#,
        )
        .unwrap();

        assert_eq!(query.property_type, Some(PropertyType::Apartment));
        assert_eq!(query.min_price, Some(1000));
        assert_eq!(query.max_price, Some(5000));
        assert_eq!(query.property_for, Some(PropertyFor::Buy));
        assert_eq!(query.page, Some(2));
    }

    #[test]
    fn filter_dto_uses_the_public_field_names() {
        use sqlx::types::Json;
        use uuid::Uuid;

        let property = Property {
            id: Uuid::nil(),
            title: "Lakeside Suite".to_string(),
            description: "Two-bed suite by the lake".to_string(),
            price: 2500,
            price_unit: PriceUnit::Night,
            property_type: PropertyType::Suite,
            property_for: PropertyFor::Rent,
            is_new: true,
            is_featured: false,
            is_trending: false,
            address: Json(PropertyAddress::default()),
            features: Json(PropertyFeatures::default()),
            amenities: Json(vec!["Wifi".to_string()]),
            highlights: Json(vec![]),
            why_book_with_us: Json(vec![]),
            nearby_landmarks: Json(vec![]),
            images: Json(vec![]),
            floor_plans: Json(vec![]),
            rating: 5.0,
            review_count: 0,
            total_visits: 7,
            owner_id: Uuid::nil(),
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_value(FilterPropertyDto::from_property(&property, None)).unwrap();
        assert_eq!(json["type"], "Suite");
        assert_eq!(json["priceUnit"], "Night");
        assert_eq!(json["propertyFor"], "Rent");
        assert_eq!(json["isNew"], true);
        assert_eq!(json["totalVisits"], 7);
        assert!(json["owner"].is_null());
    }
}
