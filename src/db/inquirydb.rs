use async_trait::async_trait;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::inquirymodel::Inquiry;

#[async_trait]
pub trait InquiryExt {
    async fn save_inquiry<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
        description: T,
        property_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Inquiry, sqlx::Error>;

    async fn get_inquiry(&self, inquiry_id: Uuid) -> Result<Option<Inquiry>, sqlx::Error>;

    async fn get_inquiries(&self, page: u32, limit: usize) -> Result<Vec<Inquiry>, sqlx::Error>;

    async fn get_inquiry_count(&self) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl InquiryExt for DBClient {
    async fn save_inquiry<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
        description: T,
        property_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Inquiry, sqlx::Error> {
        sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (name, email, phone, description, property_id, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, name, email, phone, description, property_id, owner_id,
                created_at, updated_at
            "#,
        )
        .bind(name.into())
        .bind(email.into())
        .bind(phone.into())
        .bind(description.into())
        .bind(property_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_inquiry(&self, inquiry_id: Uuid) -> Result<Option<Inquiry>, sqlx::Error> {
        sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT
                id, name, email, phone, description, property_id, owner_id,
                created_at, updated_at
            FROM inquiries
            WHERE id = $1
            "#,
        )
        .bind(inquiry_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_inquiries(&self, page: u32, limit: usize) -> Result<Vec<Inquiry>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT
                id, name, email, phone, description, property_id, owner_id,
                created_at, updated_at
            FROM inquiries
            ORDER BY created_at DESC LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_inquiry_count(&self) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM inquiries"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::propertydb::PropertyExt;
    use crate::db::userdb::UserExt;
    use crate::dtos::propertydtos::PropertyForm;
    use sqlx::postgres::PgPool;

    async fn test_client() -> DBClient {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for database tests");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to the test database");
        DBClient::new(pool)
    }

    async fn seed_property(client: &DBClient) -> (Uuid, Uuid) {
        let suffix = Uuid::new_v4().simple().to_string();
        let owner = client
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
            .unwrap();

        let mut form = PropertyForm::default();
        form.set_text_field("title", "Inquired Flat".to_string()).unwrap();
        form.set_text_field("description", "A place worth asking about".to_string())
            .unwrap();
        form.set_text_field("price", "1500".to_string()).unwrap();
        form.set_text_field("type", "Apartment".to_string()).unwrap();
        form.set_text_field("propertyFor", "Rent".to_string()).unwrap();

        let property = client.save_property(&form, owner.id).await.unwrap();
        (property.id, owner.id)
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn missing_property_leaves_no_inquiry_behind() {
        let client = test_client().await;
        let before = client.get_inquiry_count().await.unwrap();

        // Submission resolves the listing first; a miss stops the flow
        // before anything is written
        let property = client.get_property(Uuid::new_v4()).await.unwrap();
        assert!(property.is_none());

        assert_eq!(client.get_inquiry_count().await.unwrap(), before);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn inquiry_copies_the_owner_from_the_property() {
        let client = test_client().await;
        let (property_id, owner_id) = seed_property(&client).await;
        let before = client.get_inquiry_count().await.unwrap();

        let property = client
            .get_property(property_id)
            .await
            .unwrap()
            .expect("seeded property should resolve");

        let inquiry = client
            .save_inquiry(
                "Ada".to_string(),
                "ada@test.local".to_string(),
                "+2348010000000".to_string(),
                "Is this still available?".to_string(),
                property.id,
                property.owner_id,
            )
            .await
            .unwrap();

        assert_eq!(inquiry.property_id, property_id);
        assert_eq!(inquiry.owner_id, owner_id);
        assert_eq!(client.get_inquiry_count().await.unwrap(), before + 1);

        let fetched = client.get_inquiry(inquiry.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ada");
    }
}
