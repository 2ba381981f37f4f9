use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::{Multipart, Path, Query}, http::StatusCode, middleware, response::IntoResponse, routing::{get, patch, post}, Extension, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::{db::{propertydb::PropertyExt, userdb::UserExt}, dtos::{propertydtos::{FilterPropertyDto, PropertyData, PropertyForm, PropertyListData, PropertyListQueryDto, PropertySearchFilters}, userdtos::{ApiResponse, Pagination}}, error::HttpError, middleware::{auth, JWTAuthMiddeware}, models::{propertymodel::Property, usermodel::User}, service::owner, AppState};

const MAX_IMAGE_FILES: usize = 10;
const MAX_FLOOR_PLAN_FILES: usize = 5;

pub fn property_handler() -> Router {
    let public_routes = Router::new()
        .route("/", get(get_all_properties))
        .route("/:property_id", get(get_property_by_id));

    let protected_routes = Router::new()
        .route("/", post(create_property))
        .route("/admin/all", get(admin_list_properties))
        .route("/:property_id", patch(update_property).delete(delete_property))
        .layer(middleware::from_fn(auth));

    public_routes.merge(protected_routes)
}

// Text fields land in the form as they stream in; file fields are pushed to
// the media host immediately and only their URLs are kept. A file that fails
// to upload is dropped without failing the whole request.
async fn read_property_form(
    app_state: &AppState,
    multipart: &mut Multipart,
) -> Result<PropertyForm, HttpError> {
    let mut form = PropertyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match name.as_str() {
            "images" => {
                if form.images.len() >= MAX_IMAGE_FILES {
                    return Err(HttpError::bad_request("A property can carry at most 10 images"));
                }
                let file_name = field.file_name().unwrap_or("image").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;

                match app_state.uploader.upload(&file_name, data.to_vec()).await {
                    Ok(Some(url)) => form.images.push(url),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Image upload failed for {}: {}", file_name, e),
                }
            }
            "floorPlans" => {
                if form.floor_plan_files.len() >= MAX_FLOOR_PLAN_FILES {
                    return Err(HttpError::bad_request(
                        "A property can carry at most 5 floor plans",
                    ));
                }
                let file_name = field.file_name().unwrap_or("floor-plan").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;

                match app_state.uploader.upload(&file_name, data.to_vec()).await {
                    Ok(Some(url)) => form.floor_plan_files.push(url),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Floor plan upload failed for {}: {}", file_name, e),
                }
            }
            "ownerAvatar" => {
                if form.owner_avatar.is_some() {
                    return Err(HttpError::bad_request("Only one owner avatar can be uploaded"));
                }
                let file_name = field.file_name().unwrap_or("owner-avatar").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;

                match app_state.uploader.upload(&file_name, data.to_vec()).await {
                    Ok(url) => form.owner_avatar = url,
                    Err(e) => tracing::warn!("Owner avatar upload failed: {}", e),
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;
                form.set_text_field(&name, value)
                    .map_err(HttpError::bad_request)?;
            }
        }
    }

    Ok(form)
}

// Batched stand-in for per-row owner lookups on list responses
async fn attach_owners(
    app_state: &AppState,
    properties: &[Property],
) -> Result<Vec<FilterPropertyDto>, HttpError> {
    let mut owner_ids: Vec<Uuid> = properties.iter().map(|p| p.owner_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners = app_state.db_client
        .get_users_by_ids(&owner_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let owners_by_id: HashMap<Uuid, User> =
        owners.into_iter().map(|user| (user.id, user)).collect();

    Ok(properties
        .iter()
        .map(|property| {
            FilterPropertyDto::from_property(property, owners_by_id.get(&property.owner_id))
        })
        .collect())
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let form = read_property_form(&app_state, &mut multipart).await?;

    form.require_create_fields().map_err(HttpError::bad_request)?;

    let property_owner = owner::resolve_property_owner(
        &app_state.db_client,
        &user.user,
        &form.owner,
        form.owner_avatar.as_deref(),
    )
    .await?;

    let property = app_state.db_client
        .save_property(&form, property_owner.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_property = FilterPropertyDto::from_property(&property, Some(&property_owner));

    let response = ApiResponse::success(
        PropertyData { property: filtered_property },
        "Property Created",
    );

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_all_properties(
    Query(query_params): Query<PropertyListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let filters = PropertySearchFilters {
        property_type: query_params.property_type,
        city: query_params.city.clone(),
        min_price: query_params.min_price,
        max_price: query_params.max_price,
        property_for: query_params.property_for,
        search: None,
    };

    let properties = app_state.db_client
        .get_properties(&filters, page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = app_state.db_client
        .count_properties(&filters)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_properties = attach_owners(&app_state, &properties).await?;

    Ok(Json(ApiResponse::success(
        PropertyListData {
            properties: filtered_properties,
            pagination: Pagination::new(total, limit, page),
        },
        "Success",
    )))
}

pub async fn admin_list_properties(
    Query(query_params): Query<PropertyListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let filters = PropertySearchFilters {
        property_type: query_params.property_type,
        city: query_params.city.clone(),
        min_price: query_params.min_price,
        max_price: query_params.max_price,
        property_for: query_params.property_for,
        search: query_params.search.clone(),
    };

    let properties = app_state.db_client
        .get_properties(&filters, page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = app_state.db_client
        .count_properties(&filters)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_properties = attach_owners(&app_state, &properties).await?;

    Ok(Json(ApiResponse::success(
        PropertyListData {
            properties: filtered_properties,
            pagination: Pagination::new(total, limit, page),
        },
        "Success",
    )))
}

pub async fn get_property_by_id(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state.db_client
        .visit_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Not found"))?;

    let property_owner = app_state.db_client
        .get_user(Some(property.owner_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered_property =
        FilterPropertyDto::from_property(&property, property_owner.as_ref());

    Ok(Json(ApiResponse::success(
        PropertyData { property: filtered_property },
        "Success",
    )))
}

pub async fn update_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let existing = app_state.db_client
        .get_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Property not found"))?;

    let form = read_property_form(&app_state, &mut multipart).await?;

    let property_owner = owner::resolve_property_owner_for_update(
        &app_state.db_client,
        &user.user,
        existing.owner_id,
        &form.owner,
        form.owner_avatar.as_deref(),
    )
    .await?;

    // New uploads append to the stored lists
    let mut images = existing.images.0.clone();
    images.extend(form.images.iter().cloned());

    let mut floor_plans = existing.floor_plans.0.clone();
    floor_plans.extend(form.floor_plans());

    let property = app_state.db_client
        .update_property(property_id, &form, property_owner.id, images, floor_plans)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Property not found"))?;

    let filtered_property = FilterPropertyDto::from_property(&property, Some(&property_owner));

    Ok(Json(ApiResponse::success(
        PropertyData { property: filtered_property },
        "Property Updated",
    )))
}

pub async fn delete_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(_user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.db_client
        .get_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(HttpError::not_found("Property not found"))?;

    app_state.db_client
        .delete_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::message("Property deleted successfully")))
}
