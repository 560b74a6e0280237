//! SQL access for the `book` table.
//!
//! Every method runs on a caller-supplied connection so the service decides
//! the transaction boundary.

use futures_util::TryStreamExt;
use gateway_db::DbResult;
use gateway_http::Pageable;
use sqlx::SqliteConnection;

use super::models::Book;
use super::row_mapper::{self, ALIAS, TABLE};

#[derive(Debug, Clone, Copy, Default)]
pub struct BookRepository;

impl BookRepository {
    pub fn new() -> Self {
        Self
    }

    /// One page of books in the requested order.
    ///
    /// Orders on properties that are not `book` columns are dropped. Rows are
    /// ordered by id last so pages never overlap.
    pub async fn find_all_by(
        &self,
        conn: &mut SqliteConnection,
        pageable: &Pageable,
    ) -> DbResult<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM {TABLE} {ALIAS} ORDER BY {} LIMIT ? OFFSET ?",
            row_mapper::select_list(ALIAS),
            order_by(pageable),
        );

        let mut rows = sqlx::query(&sql)
            .bind(to_sql_int(pageable.size))
            .bind(to_sql_int(pageable.offset()))
            .fetch(&mut *conn);

        let mut books = Vec::new();
        while let Some(row) = rows.try_next().await? {
            books.push(row_mapper::map_row(&row, ALIAS)?);
        }
        Ok(books)
    }

    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Book>> {
        let sql = format!(
            "SELECT {} FROM {TABLE} {ALIAS} WHERE {ALIAS}.id = ?",
            row_mapper::select_list(ALIAS),
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        let book = row
            .map(|row| row_mapper::map_row(&row, ALIAS))
            .transpose()?;
        Ok(book)
    }

    pub async fn exists_by_id(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {TABLE} WHERE id = ?)"
        ))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists != 0)
    }

    /// Insert when `book.id` is unset, otherwise insert-or-update by id.
    pub async fn save(&self, conn: &mut SqliteConnection, book: Book) -> DbResult<Book> {
        let returning = row_mapper::returning_list(ALIAS);

        let row = match book.id {
            None => {
                let sql = format!(
                    "INSERT INTO {TABLE} (name, description, price) VALUES (?, ?, ?) \
                     RETURNING {returning}"
                );
                sqlx::query(&sql)
                    .bind(book.name)
                    .bind(book.description)
                    .bind(book.price)
                    .fetch_one(&mut *conn)
                    .await?
            }
            Some(id) => {
                let sql = format!(
                    "INSERT INTO {TABLE} (id, name, description, price) VALUES (?, ?, ?, ?) \
                     ON CONFLICT(id) DO UPDATE SET \
                     name = excluded.name, \
                     description = excluded.description, \
                     price = excluded.price \
                     RETURNING {returning}"
                );
                sqlx::query(&sql)
                    .bind(id)
                    .bind(book.name)
                    .bind(book.description)
                    .bind(book.price)
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        Ok(row_mapper::map_row(&row, ALIAS)?)
    }

    /// Delete by id; returns whether a row was removed.
    pub async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {TABLE} WHERE id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, conn: &mut SqliteConnection) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {TABLE}"))
            .fetch_one(&mut *conn)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn order_by(pageable: &Pageable) -> String {
    let columns = row_mapper::column_names();
    let mut clauses: Vec<String> = pageable
        .sort
        .iter()
        .filter(|order| columns.contains(&order.property.as_str()))
        .map(|order| format!("{ALIAS}.{} {}", order.property, order.direction.as_sql()))
        .collect();

    if !pageable.sort.iter().any(|order| order.property == "id") {
        clauses.push(format!("{ALIAS}.id ASC"));
    }

    clauses.join(", ")
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::BooksModule;
    use gateway_http::pagination::Order;
    use gateway_kernel::Module;
    use sqlx::SqlitePool;

    async fn pool() -> SqlitePool {
        let pool = gateway_db::connect_in_memory().await.unwrap();
        let plan: Vec<_> = BooksModule::new()
            .migrations()
            .into_iter()
            .map(|migration| ("books".to_string(), migration))
            .collect();
        gateway_db::run_migrations(&pool, &plan).await.unwrap();
        pool
    }

    #[test]
    fn order_by_appends_id_tiebreaker() {
        let pageable = Pageable::new(0, 20).sorted_by(Order::desc("price"));
        assert_eq!(order_by(&pageable), "e.price DESC, e.id ASC");

        let pageable = Pageable::new(0, 20).sorted_by(Order::desc("id"));
        assert_eq!(order_by(&pageable), "e.id DESC");
    }

    #[test]
    fn order_by_drops_unknown_properties() {
        let pageable = Pageable::new(0, 20).sorted_by(Order::asc("1; DROP TABLE book"));
        assert_eq!(order_by(&pageable), "e.id ASC");
    }

    #[tokio::test]
    async fn insert_assigns_id() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = BookRepository::new();

        let saved = repo
            .save(&mut conn, Book::new("A", "d", 10))
            .await
            .unwrap();

        assert!(saved.id.is_some());
        assert_eq!(saved.name.as_deref(), Some("A"));
        assert_eq!(repo.count(&mut conn).await.unwrap(), 1);
        assert_eq!(
            repo.find_by_id(&mut conn, saved.id.unwrap()).await.unwrap(),
            Some(saved)
        );
    }

    #[tokio::test]
    async fn save_with_id_upserts() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = BookRepository::new();

        let saved = repo
            .save(&mut conn, Book::new("A", "d", 10))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        let updated = repo
            .save(&mut conn, Book::new("B", "e", 20).with_id(id))
            .await
            .unwrap();
        assert_eq!(updated, Book::new("B", "e", 20).with_id(id));
        assert_eq!(repo.count(&mut conn).await.unwrap(), 1);

        let inserted = repo
            .save(&mut conn, Book::new("C", "f", 30).with_id(id + 100))
            .await
            .unwrap();
        assert_eq!(inserted.id, Some(id + 100));
        assert_eq!(repo.count(&mut conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = BookRepository::new();

        let id = repo
            .save(&mut conn, Book::new("A", "d", 10))
            .await
            .unwrap()
            .id
            .unwrap();

        assert!(repo.exists_by_id(&mut conn, id).await.unwrap());
        assert!(repo.delete_by_id(&mut conn, id).await.unwrap());
        assert!(!repo.delete_by_id(&mut conn, id).await.unwrap());
        assert!(!repo.exists_by_id(&mut conn, id).await.unwrap());
        assert_eq!(repo.find_by_id(&mut conn, id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pages_are_bounded_and_ordered() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = BookRepository::new();

        for (name, price) in [("c", 3), ("a", 1), ("e", 5), ("b", 2), ("d", 4)] {
            repo.save(&mut conn, Book::new(name, "x", price))
                .await
                .unwrap();
        }

        let pageable = Pageable::new(0, 2).sorted_by(Order::asc("name"));
        let first = repo.find_all_by(&mut conn, &pageable).await.unwrap();
        let names: Vec<_> = first.iter().filter_map(|b| b.name.as_deref()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let pageable = Pageable::new(2, 2).sorted_by(Order::asc("name"));
        let last = repo.find_all_by(&mut conn, &pageable).await.unwrap();
        let names: Vec<_> = last.iter().filter_map(|b| b.name.as_deref()).collect();
        assert_eq!(names, vec!["e"]);

        let pageable = Pageable::new(0, 3).sorted_by(Order::desc("price"));
        let prices: Vec<_> = repo
            .find_all_by(&mut conn, &pageable)
            .await
            .unwrap()
            .iter()
            .filter_map(|b| b.price)
            .collect();
        assert_eq!(prices, vec![5, 4, 3]);

        let pageable = Pageable::new(9, 3);
        assert!(repo.find_all_by(&mut conn, &pageable).await.unwrap().is_empty());

        assert_eq!(repo.count(&mut conn).await.unwrap(), 5);
    }
}
