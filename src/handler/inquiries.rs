use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::{Path, Query}, http::StatusCode, middleware, response::IntoResponse, routing::{get, post}, Extension, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::{db::{inquirydb::InquiryExt, propertydb::PropertyExt, userdb::UserExt}, dtos::{inquirydtos::{FilterInquiryDto, InquiryData, InquiryListData, SubmitInquiryDto}, userdtos::{ApiResponse, Pagination, RequestQueryDto}}, error::HttpError, middleware::auth, models::{propertymodel::Property, usermodel::User}, AppState};

pub fn inquiry_handler() -> Router {
    let public_routes = Router::new().route("/submit", post(submit_inquiry));

    let protected_routes = Router::new()
        .route("/", get(get_all_inquiries))
        .route("/:inquiry_id", get(get_inquiry_by_id))
        .layer(middleware::from_fn(auth));

    public_routes.merge(protected_routes)
}

pub async fn submit_inquiry(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SubmitInquiryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property_id = Uuid::parse_str(&body.property_id)
        .map_err(|_| HttpError::bad_request("Invalid property id"))?;

    // The inquiry is refused outright when the listing is gone
    let property = app_state.db_client
        .get_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Property not found"))?;

    let inquiry = app_state.db_client
        .save_inquiry(
            body.name,
            body.email,
            body.phone,
            body.description,
            property.id,
            property.owner_id,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let property_owner = app_state.db_client
        .get_user(Some(property.owner_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_inquiry =
        FilterInquiryDto::from_inquiry(&inquiry, Some(&property), property_owner.as_ref());

    let response = ApiResponse::success(
        InquiryData { inquiry: filtered_inquiry },
        "Inquiry submitted successfully",
    );

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_all_inquiries(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let inquiries = app_state.db_client
        .get_inquiries(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = app_state.db_client
        .get_inquiry_count()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut property_ids: Vec<Uuid> = inquiries.iter().map(|i| i.property_id).collect();
    property_ids.sort_unstable();
    property_ids.dedup();

    let mut owner_ids: Vec<Uuid> = inquiries.iter().map(|i| i.owner_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let properties_by_id: HashMap<Uuid, Property> = app_state.db_client
        .get_properties_by_ids(&property_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(|property| (property.id, property))
        .collect();

    let owners_by_id: HashMap<Uuid, User> = app_state.db_client
        .get_users_by_ids(&owner_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let filtered_inquiries: Vec<FilterInquiryDto> = inquiries
        .iter()
        .map(|inquiry| {
            FilterInquiryDto::from_inquiry(
                inquiry,
                properties_by_id.get(&inquiry.property_id),
                owners_by_id.get(&inquiry.owner_id),
            )
        })
        .collect();

    Ok(Json(ApiResponse::success(
        InquiryListData {
            inquiries: filtered_inquiries,
            pagination: Pagination::new(total, limit, page),
        },
        "Success",
    )))
}

pub async fn get_inquiry_by_id(
    Path(inquiry_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let inquiry = app_state.db_client
        .get_inquiry(inquiry_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Inquiry not found"))?;

    let property = app_state.db_client
        .get_property(inquiry.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let property_owner = app_state.db_client
        .get_user(Some(inquiry.owner_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_inquiry =
        FilterInquiryDto::from_inquiry(&inquiry, property.as_ref(), property_owner.as_ref());

    Ok(Json(ApiResponse::success(
        InquiryData { inquiry: filtered_inquiry },
        "Success",
    )))
}
