use gateway_db::{DbResult, Tx};
use gateway_http::Pageable;
use sqlx::SqlitePool;

use super::models::PublicUser;
use super::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    repository: UserRepository,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            repository: UserRepository::new(),
        }
    }

    pub async fn find_all_public(&self, pageable: &Pageable) -> DbResult<Vec<PublicUser>> {
        tracing::debug!(page = pageable.page, size = pageable.size, "request to get public users");
        let mut tx = Tx::read_only(&self.pool).await?;
        let users = self.repository.find_all_activated(tx.conn(), pageable).await?;
        tx.finish().await?;
        Ok(users)
    }

    pub async fn count_public(&self) -> DbResult<u64> {
        let mut tx = Tx::read_only(&self.pool).await?;
        let count = self.repository.count_activated(tx.conn()).await?;
        tx.finish().await?;
        Ok(count)
    }
}
