//! Public user listing at `/api/users`.

use axum::{
    extract::{OriginalUri, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use gateway_http::{pagination_headers, AppError, Pageable};
use gateway_kernel::settings::PaginationSettings;

use super::repository::SORTABLE;
use super::service::UserService;

#[derive(Clone)]
pub struct PublicUserResource {
    service: UserService,
    pagination: PaginationSettings,
}

impl PublicUserResource {
    pub fn new(service: UserService, pagination: PaginationSettings) -> Self {
        Self {
            service,
            pagination,
        }
    }
}

pub fn router(resource: PublicUserResource) -> Router {
    Router::new()
        .route("/", get(list_public_users))
        .with_state(resource)
}

async fn list_public_users(
    State(resource): State<PublicUserResource>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let pageable = Pageable::from_query(&query, &resource.pagination)?;
    pageable.ensure_sortable(SORTABLE)?;
    tracing::debug!(page = pageable.page, size = pageable.size, "REST request to get public users");

    let total = resource.service.count_public().await?;
    let users = resource.service.find_all_public(&pageable).await?;
    let headers = pagination_headers(uri.path(), &query, &pageable, total);

    Ok((headers, Json(users)))
}
