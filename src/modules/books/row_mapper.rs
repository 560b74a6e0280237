//! Converts `book` rows into [`Book`] values.
//!
//! The column table below is the single source of truth for the projection,
//! the RETURNING clause, and the properties a page may be sorted by.

use sqlx::{sqlite::SqliteRow, Row};

use super::models::Book;

pub const TABLE: &str = "book";
pub const ALIAS: &str = "e";

type Reader = fn(&mut Book, &SqliteRow, &str) -> Result<(), sqlx::Error>;

/// A `book` column and how its value lands on the entity.
pub struct Column {
    pub name: &'static str,
    read: Reader,
}

pub const COLUMNS: &[Column] = &[
    Column {
        name: "id",
        read: read_id,
    },
    Column {
        name: "name",
        read: read_name,
    },
    Column {
        name: "description",
        read: read_description,
    },
    Column {
        name: "price",
        read: read_price,
    },
];

fn read_id(book: &mut Book, row: &SqliteRow, column: &str) -> Result<(), sqlx::Error> {
    book.id = row.try_get::<Option<i64>, _>(column)?;
    Ok(())
}

fn read_name(book: &mut Book, row: &SqliteRow, column: &str) -> Result<(), sqlx::Error> {
    book.name = row.try_get::<Option<String>, _>(column)?;
    Ok(())
}

fn read_description(book: &mut Book, row: &SqliteRow, column: &str) -> Result<(), sqlx::Error> {
    book.description = row.try_get::<Option<String>, _>(column)?;
    Ok(())
}

fn read_price(book: &mut Book, row: &SqliteRow, column: &str) -> Result<(), sqlx::Error> {
    book.price = row.try_get::<Option<i64>, _>(column)?;
    Ok(())
}

/// Read `{prefix}_{column}` for every column into a fresh [`Book`].
pub fn map_row(row: &SqliteRow, prefix: &str) -> Result<Book, sqlx::Error> {
    let mut book = Book::default();
    for column in COLUMNS {
        (column.read)(&mut book, row, &format!("{prefix}_{}", column.name))?;
    }
    Ok(book)
}

/// `alias.col AS alias_col, ...` for a SELECT over `book alias`.
pub fn select_list(alias: &str) -> String {
    COLUMNS
        .iter()
        .map(|column| format!("{alias}.{name} AS {alias}_{name}", name = column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `col AS prefix_col, ...` for a RETURNING clause.
pub fn returning_list(prefix: &str) -> String {
    COLUMNS
        .iter()
        .map(|column| format!("{name} AS {prefix}_{name}", name = column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn column_names() -> Vec<&'static str> {
    COLUMNS.iter().map(|column| column.name).collect()
}
