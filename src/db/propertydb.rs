use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::dtos::propertydtos::{PropertyForm, PropertySearchFilters};
use crate::models::propertymodel::{FloorPlan, PriceUnit, Property};

#[async_trait]
pub trait PropertyExt {
    async fn save_property(
        &self,
        data: &PropertyForm,
        owner_id: Uuid,
    ) -> Result<Property, sqlx::Error>;

    async fn get_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error>;

    /// Fetches a property and bumps its visit counter in the same statement.
    async fn visit_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error>;

    async fn get_properties(
        &self,
        filters: &PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_properties_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Property>, sqlx::Error>;

    async fn count_properties(&self, filters: &PropertySearchFilters) -> Result<i64, sqlx::Error>;

    async fn update_property(
        &self,
        property_id: Uuid,
        data: &PropertyForm,
        owner_id: Uuid,
        images: Vec<String>,
        floor_plans: Vec<FloorPlan>,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn delete_property(&self, property_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn save_property(
        &self,
        data: &PropertyForm,
        owner_id: Uuid,
    ) -> Result<Property, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, owner_id
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9,
                $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20
            )
            RETURNING
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            "#,
        )
        .bind(data.title.clone().unwrap_or_default())
        .bind(data.description.clone().unwrap_or_default())
        .bind(data.price.unwrap_or_default())
        .bind(data.price_unit.unwrap_or(PriceUnit::Month))
        .bind(data.property_type)
        .bind(data.property_for)
        .bind(data.is_new.unwrap_or(false))
        .bind(data.is_featured.unwrap_or(false))
        .bind(data.is_trending.unwrap_or(false))
        .bind(Json(data.address.clone().unwrap_or_default()))
        .bind(Json(data.features.clone().unwrap_or_default()))
        .bind(Json(data.amenities.clone().unwrap_or_default()))
        .bind(Json(data.highlights.clone().unwrap_or_default()))
        .bind(Json(data.why_book_with_us.clone().unwrap_or_default()))
        .bind(Json(data.nearby_landmarks.clone().unwrap_or_default()))
        .bind(Json(data.images.clone()))
        .bind(Json(data.floor_plans()))
        .bind(data.rating.unwrap_or(5.0))
        .bind(data.review_count.unwrap_or(0))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            SELECT
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn visit_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET total_visits = total_visits + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_properties(
        &self,
        filters: &PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        sqlx::query_as::<_, Property>(
            r#"
            SELECT
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            FROM properties
            WHERE ($1::text IS NULL OR property_type = $1::property_type)
            AND ($2::text IS NULL OR address->>'city' ILIKE $2)
            AND ($3::bigint IS NULL OR price >= $3)
            AND ($4::bigint IS NULL OR price <= $4)
            AND ($5::text IS NULL OR property_for = $5::property_for)
            AND ($6::text IS NULL
                OR title ILIKE $6
                OR description ILIKE $6
                OR address->>'city' ILIKE $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(filters.property_type.map(|t| t.to_str().to_string()))
        .bind(filters.city.as_ref().map(|c| format!("%{}%", c)))
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(filters.property_for.map(|p| p.to_str().to_string()))
        .bind(filters.search.as_ref().map(|s| format!("%{}%", s)))
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_properties_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            SELECT
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            FROM properties
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
    }

    async fn count_properties(&self, filters: &PropertySearchFilters) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM properties
            WHERE ($1::text IS NULL OR property_type = $1::property_type)
            AND ($2::text IS NULL OR address->>'city' ILIKE $2)
            AND ($3::bigint IS NULL OR price >= $3)
            AND ($4::bigint IS NULL OR price <= $4)
            AND ($5::text IS NULL OR property_for = $5::property_for)
            AND ($6::text IS NULL
                OR title ILIKE $6
                OR description ILIKE $6
                OR address->>'city' ILIKE $6)
            "#,
        )
        .bind(filters.property_type.map(|t| t.to_str().to_string()))
        .bind(filters.city.as_ref().map(|c| format!("%{}%", c)))
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(filters.property_for.map(|p| p.to_str().to_string()))
        .bind(filters.search.as_ref().map(|s| format!("%{}%", s)))
        .fetch_one(&self.pool)
        .await
    }

    // Scalars and sub-documents merge field-by-field; images and floor plans
    // are written whole since the caller appends new uploads to the existing lists.
    async fn update_property(
        &self,
        property_id: Uuid,
        data: &PropertyForm,
        owner_id: Uuid,
        images: Vec<String>,
        floor_plans: Vec<FloorPlan>,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                price_unit = COALESCE($5, price_unit),
                property_type = COALESCE($6, property_type),
                property_for = COALESCE($7, property_for),
                is_new = COALESCE($8, is_new),
                is_featured = COALESCE($9, is_featured),
                is_trending = COALESCE($10, is_trending),
                rating = COALESCE($11, rating),
                review_count = COALESCE($12, review_count),
                address = COALESCE($13, address),
                features = COALESCE($14, features),
                amenities = COALESCE($15, amenities),
                highlights = COALESCE($16, highlights),
                why_book_with_us = COALESCE($17, why_book_with_us),
                nearby_landmarks = COALESCE($18, nearby_landmarks),
                images = $19,
                floor_plans = $20,
                owner_id = $21,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, title, description, price, price_unit, property_type, property_for,
                is_new, is_featured, is_trending,
                address, features, amenities, highlights, why_book_with_us, nearby_landmarks,
                images, floor_plans, rating, review_count, total_visits, owner_id,
                created_at, updated_at
            "#,
        )
        .bind(property_id)
        .bind(data.title.clone())
        .bind(data.description.clone())
        .bind(data.price)
        .bind(data.price_unit)
        .bind(data.property_type)
        .bind(data.property_for)
        .bind(data.is_new)
        .bind(data.is_featured)
        .bind(data.is_trending)
        .bind(data.rating)
        .bind(data.review_count)
        .bind(data.address.clone().map(Json))
        .bind(data.features.clone().map(Json))
        .bind(data.amenities.clone().map(Json))
        .bind(data.highlights.clone().map(Json))
        .bind(data.why_book_with_us.clone().map(Json))
        .bind(data.nearby_landmarks.clone().map(Json))
        .bind(Json(images))
        .bind(Json(floor_plans))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_property(&self, property_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM properties WHERE id = $1"#)
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::userdb::UserExt;
    use crate::models::propertymodel::{PropertyFor, PropertyType};
    use sqlx::postgres::PgPool;

    async fn test_client() -> DBClient {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for database tests");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to the test database");
        DBClient::new(pool)
    }

    async fn seed_owner(client: &DBClient) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        client
            .save_owner_user(
                "Listing Owner".to_string(),
                format!("owner_{}", suffix),
                format!("owner_{}@test.local", suffix),
                "hashed".to_string(),
                None,
                None,
                Some("Property Agent".to_string()),
                None,
            )
            .await
            .unwrap()
            .id
    }

    fn sample_form(title: &str, city: &str, price: i64) -> PropertyForm {
        let mut form = PropertyForm::default();
        form.set_text_field("title", title.to_string()).unwrap();
        form.set_text_field("description", "A place worth seeing".to_string())
            .unwrap();
        form.set_text_field("price", price.to_string()).unwrap();
        form.set_text_field("type", "Apartment".to_string()).unwrap();
        form.set_text_field("propertyFor", "Rent".to_string()).unwrap();
        form.set_text_field("address", format!(r#"{{"city": "{}"}}"#, city))
            .unwrap();
        form
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn visit_counter_moves_with_every_detail_fetch() {
        let client = test_client().await;
        let owner_id = seed_owner(&client).await;

        let property = client
            .save_property(&sample_form("Visited Flat", "Enugu", 1200), owner_id)
            .await
            .unwrap();
        assert_eq!(property.total_visits, 0);

        client.visit_property(property.id).await.unwrap().unwrap();
        let after_two = client.visit_property(property.id).await.unwrap().unwrap();
        assert_eq!(after_two.total_visits, 2);

        assert!(client.visit_property(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn filters_and_pagination_narrow_the_listing() {
        let client = test_client().await;
        let owner_id = seed_owner(&client).await;
        let city = format!("City{}", Uuid::new_v4().simple());

        for (title, price) in [("One", 1000), ("Two", 2000), ("Three", 3000)] {
            client
                .save_property(&sample_form(title, &city, price), owner_id)
                .await
                .unwrap();
        }

        let filters = PropertySearchFilters {
            city: Some(city.clone()),
            ..Default::default()
        };
        assert_eq!(client.count_properties(&filters).await.unwrap(), 3);

        let priced = PropertySearchFilters {
            city: Some(city.clone()),
            min_price: Some(1500),
            max_price: Some(2500),
            ..Default::default()
        };
        let matching = client.get_properties(&priced, 1, 10).await.unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].price, 2000);

        let second_page = client.get_properties(&filters, 2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);

        let past_the_end = client.get_properties(&filters, 4, 2).await.unwrap();
        assert!(past_the_end.is_empty());

        let searched = PropertySearchFilters {
            search: Some(city.to_lowercase()),
            ..Default::default()
        };
        assert_eq!(client.count_properties(&searched).await.unwrap(), 3);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn update_merges_present_fields_and_replaces_media_whole() {
        let client = test_client().await;
        let owner_id = seed_owner(&client).await;

        let mut form = sample_form("Merge Flat", "Aba", 1800);
        form.images.push("https://cdn.test/one.png".to_string());
        let property = client.save_property(&form, owner_id).await.unwrap();

        let mut patch = PropertyForm::default();
        patch.set_text_field("price", "2200".to_string()).unwrap();
        patch.set_text_field("isFeatured", "true".to_string()).unwrap();

        let merged_images = vec![
            "https://cdn.test/one.png".to_string(),
            "https://cdn.test/two.png".to_string(),
        ];

        let updated = client
            .update_property(property.id, &patch, owner_id, merged_images, vec![])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Merge Flat");
        assert_eq!(updated.price, 2200);
        assert!(updated.is_featured);
        assert_eq!(updated.property_type, PropertyType::Apartment);
        assert_eq!(updated.property_for, PropertyFor::Rent);
        assert_eq!(updated.images.0.len(), 2);

        assert!(client
            .update_property(Uuid::new_v4(), &patch, owner_id, vec![], vec![])
            .await
            .unwrap()
            .is_none());
    }
}
