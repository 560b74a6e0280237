//! REST resource for books, mounted at `/api/books`.

use anyhow::anyhow;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use gateway_http::{pagination_headers, AlertHeaders, AppError, Pageable};
use gateway_kernel::settings::PaginationSettings;

use super::models::{BookDto, BookPatch};
use super::row_mapper;
use super::service::BookService;
use crate::utils;

const ENTITY_NAME: &str = "book";

/// Shared handler state.
#[derive(Clone)]
pub struct BookResource {
    service: BookService,
    alerts: AlertHeaders,
    pagination: PaginationSettings,
}

impl BookResource {
    pub fn new(service: BookService, alerts: AlertHeaders, pagination: PaginationSettings) -> Self {
        Self {
            service,
            alerts,
            pagination,
        }
    }

    fn rejected(&self, message: &str, error_key: &str) -> AppError {
        self.alerts.bad_request(message, ENTITY_NAME, error_key)
    }

    /// Checks shared by PUT and PATCH, in order: payload id present, equal to
    /// the path id, and naming a stored book.
    async fn ensure_updatable(&self, path_id: i64, payload_id: Option<i64>) -> Result<(), AppError> {
        let Some(payload_id) = payload_id else {
            return Err(self.rejected("Invalid id", "idnull"));
        };
        if payload_id != path_id {
            return Err(self.rejected("Invalid ID", "idinvalid"));
        }
        if !self.service.exists(path_id).await? {
            return Err(self.rejected("Entity not found", "idnotfound"));
        }
        Ok(())
    }
}

pub fn router(resource: BookResource) -> Router {
    let prefix = utils::log_prefix("books");
    tracing::info!(target: "gateway.routes", %prefix, "registering book routes");

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book)
                .put(update_book)
                .patch(partial_update_book)
                .delete(delete_book),
        )
        .with_state(resource)
}

async fn create_book(
    State(resource): State<BookResource>,
    Json(dto): Json<BookDto>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(?dto, "REST request to save book");
    if dto.id.is_some() {
        return Err(resource.rejected("A new book cannot already have an ID", "idexists"));
    }

    let saved = resource.service.save(dto).await?;
    let id = saved
        .id
        .ok_or_else(|| anyhow!("stored book came back without an id"))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/books/{id}"))],
        resource.alerts.entity_created(ENTITY_NAME, id),
        Json(saved),
    ))
}

async fn update_book(
    State(resource): State<BookResource>,
    Path(id): Path<i64>,
    Json(dto): Json<BookDto>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(id, ?dto, "REST request to update book");
    resource.ensure_updatable(id, dto.id).await?;

    let updated = resource.service.update(dto).await?;
    Ok((resource.alerts.entity_updated(ENTITY_NAME, id), Json(updated)))
}

/// Accepts `application/merge-patch+json` as well as `application/json`.
async fn partial_update_book(
    State(resource): State<BookResource>,
    Path(id): Path<i64>,
    Json(patch): Json<BookPatch>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(id, ?patch, "REST request to partially update book");
    resource.ensure_updatable(id, patch.id).await?;

    match resource.service.partial_update(patch).await? {
        Some(merged) => Ok((resource.alerts.entity_updated(ENTITY_NAME, id), Json(merged))),
        None => Err(resource.rejected("Entity not found", "idnotfound")),
    }
}

async fn list_books(
    State(resource): State<BookResource>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let pageable = Pageable::from_query(&query, &resource.pagination)?;
    pageable.ensure_sortable(&row_mapper::column_names())?;
    tracing::debug!(page = pageable.page, size = pageable.size, "REST request to get a page of books");

    let total = resource.service.count_all().await?;
    let books = resource.service.find_all(&pageable).await?;
    let headers = pagination_headers(uri.path(), &query, &pageable, total);

    Ok((headers, Json(books)))
}

async fn get_book(
    State(resource): State<BookResource>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, AppError> {
    tracing::debug!(id, "REST request to get book");
    resource
        .service
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

async fn delete_book(
    State(resource): State<BookResource>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(id, "REST request to delete book");
    let removed = resource.service.delete(id).await?;
    if !removed {
        tracing::debug!(id, "book was already absent");
    }

    Ok((
        StatusCode::NO_CONTENT,
        resource.alerts.entity_deleted(ENTITY_NAME, id),
    ))
}
