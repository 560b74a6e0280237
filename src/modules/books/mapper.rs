//! Conversions between [`Book`] and its API representations.

use super::models::{Book, BookDto, BookPatch};

pub fn to_dto(book: Book) -> BookDto {
    BookDto {
        id: book.id,
        name: book.name,
        description: book.description,
        price: book.price,
    }
}

pub fn to_entity(dto: BookDto) -> Book {
    Book {
        id: dto.id,
        name: dto.name,
        description: dto.description,
        price: dto.price,
    }
}

/// Merge the non-null fields of `patch` into `target`.
///
/// The id is never touched; it identifies the row being patched.
pub fn partial_update(target: &mut Book, patch: BookPatch) {
    patch.name.apply_to(&mut target.name);
    patch.description.apply_to(&mut target.description);
    patch.price.apply_to(&mut target.price);
}
