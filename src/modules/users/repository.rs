//! Read-only access to activated rows of `jhi_user`.

use gateway_db::DbResult;
use gateway_http::Pageable;
use sqlx::SqliteConnection;

use super::models::PublicUser;

/// Properties a page of public users may be sorted by.
pub const SORTABLE: &[&str] = &["id", "login"];

#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_all_activated(
        &self,
        conn: &mut SqliteConnection,
        pageable: &Pageable,
    ) -> DbResult<Vec<PublicUser>> {
        let sql = format!(
            "SELECT id, login FROM jhi_user WHERE activated = 1 ORDER BY {} LIMIT ? OFFSET ?",
            order_by(pageable)
        );

        let users = sqlx::query_as::<_, PublicUser>(&sql)
            .bind(i64::try_from(pageable.size).unwrap_or(i64::MAX))
            .bind(i64::try_from(pageable.offset()).unwrap_or(i64::MAX))
            .fetch_all(&mut *conn)
            .await?;
        Ok(users)
    }

    pub async fn count_activated(&self, conn: &mut SqliteConnection) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jhi_user WHERE activated = 1")
            .fetch_one(&mut *conn)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn order_by(pageable: &Pageable) -> String {
    let mut clauses: Vec<String> = pageable
        .sort
        .iter()
        .filter(|order| SORTABLE.contains(&order.property.as_str()))
        .map(|order| format!("{} {}", order.property, order.direction.as_sql()))
        .collect();
    if !pageable.sort.iter().any(|order| order.property == "id") {
        clauses.push("id ASC".to_string());
    }
    clauses.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::UsersModule;
    use gateway_http::pagination::Order;
    use gateway_kernel::Module;

    async fn pool() -> sqlx::SqlitePool {
        let pool = gateway_db::connect_in_memory().await.unwrap();
        let plan: Vec<_> = UsersModule::new()
            .migrations()
            .into_iter()
            .map(|migration| ("users".to_string(), migration))
            .collect();
        gateway_db::run_migrations(&pool, &plan).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn only_activated_users_are_listed() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        sqlx::query("INSERT INTO jhi_user (login, activated) VALUES ('ghost', 0)")
            .execute(&mut *conn)
            .await
            .unwrap();

        let repo = UserRepository::new();
        let users = repo
            .find_all_activated(&mut conn, &Pageable::new(0, 20).sorted_by(Order::asc("login")))
            .await
            .unwrap();

        let logins: Vec<_> = users.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, vec!["admin", "user"]);
        assert_eq!(repo.count_activated(&mut conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn pages_follow_sort_direction() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = UserRepository::new();

        let users = repo
            .find_all_activated(&mut conn, &Pageable::new(0, 1).sorted_by(Order::desc("login")))
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login, "user");
    }
}
