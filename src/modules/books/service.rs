//! Transactional operations over books.
//!
//! Each operation runs in its own [`Tx`]; reads use a read-only transaction
//! and never leave changes behind.

use gateway_db::{DbResult, Tx};
use gateway_http::Pageable;
use sqlx::SqlitePool;

use super::mapper;
use super::models::{BookDto, BookPatch};
use super::repository::BookRepository;

#[derive(Clone)]
pub struct BookService {
    pool: SqlitePool,
    repository: BookRepository,
}

impl BookService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            repository: BookRepository::new(),
        }
    }

    /// Insert or overwrite a book and return the stored state.
    pub async fn save(&self, dto: BookDto) -> DbResult<BookDto> {
        tracing::debug!(?dto, "request to save book");
        let mut tx = Tx::read_write(&self.pool).await?;
        let saved = self
            .repository
            .save(tx.conn(), mapper::to_entity(dto))
            .await?;
        tx.finish().await?;
        Ok(mapper::to_dto(saved))
    }

    /// Full replacement; identical to [`BookService::save`] with an id set.
    pub async fn update(&self, dto: BookDto) -> DbResult<BookDto> {
        tracing::debug!(?dto, "request to update book");
        self.save(dto).await
    }

    /// Merge `patch` into the stored book named by `patch.id`.
    ///
    /// Returns `None` when the patch has no id or no such book exists;
    /// nothing is written then.
    pub async fn partial_update(&self, patch: BookPatch) -> DbResult<Option<BookDto>> {
        tracing::debug!(?patch, "request to partially update book");
        let Some(id) = patch.id else {
            return Ok(None);
        };
        let mut tx = Tx::read_write(&self.pool).await?;

        let Some(mut existing) = self.repository.find_by_id(tx.conn(), id).await? else {
            return Ok(None);
        };
        mapper::partial_update(&mut existing, patch);
        let saved = self.repository.save(tx.conn(), existing).await?;

        tx.finish().await?;
        Ok(Some(mapper::to_dto(saved)))
    }

    pub async fn find_all(&self, pageable: &Pageable) -> DbResult<Vec<BookDto>> {
        tracing::debug!(page = pageable.page, size = pageable.size, "request to get all books");
        let mut tx = Tx::read_only(&self.pool).await?;
        let books = self.repository.find_all_by(tx.conn(), pageable).await?;
        tx.finish().await?;
        Ok(books.into_iter().map(mapper::to_dto).collect())
    }

    pub async fn count_all(&self) -> DbResult<u64> {
        let mut tx = Tx::read_only(&self.pool).await?;
        let count = self.repository.count(tx.conn()).await?;
        tx.finish().await?;
        Ok(count)
    }

    pub async fn find_one(&self, id: i64) -> DbResult<Option<BookDto>> {
        tracing::debug!(id, "request to get book");
        let mut tx = Tx::read_only(&self.pool).await?;
        let book = self.repository.find_by_id(tx.conn(), id).await?;
        tx.finish().await?;
        Ok(book.map(mapper::to_dto))
    }

    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let mut tx = Tx::read_only(&self.pool).await?;
        let exists = self.repository.exists_by_id(tx.conn(), id).await?;
        tx.finish().await?;
        Ok(exists)
    }

    /// Delete the book with `id`; returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        tracing::debug!(id, "request to delete book");
        let mut tx = Tx::read_write(&self.pool).await?;
        let removed = self.repository.delete_by_id(tx.conn(), id).await?;
        tx.finish().await?;
        Ok(removed)
    }
}
