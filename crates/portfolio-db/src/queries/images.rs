//! Image database queries.
//!
//! This module provides insert and read operations for the stored gallery
//! images. Rows are never updated; ids come from SQLite's AUTOINCREMENT and
//! are not reused.

use portfolio_common::{Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::StoredImage;

/// Parse an image from a database row.
///
/// Expects columns in order: id, name, image.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<StoredImage> {
    Ok(StoredImage {
        id: ImageId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        image: row.get(2)?,
    })
}

/// Insert a new image record.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `name` - Client-supplied file name
/// * `image` - JPEG bytes
///
/// # Returns
///
/// * `Ok(ImageId)` - The id assigned to the new row
/// * `Err(Error)` - If a database error occurs
pub fn insert_image(conn: &Connection, name: &str, image: &[u8]) -> Result<ImageId> {
    conn.execute(
        "INSERT INTO image_store (name, image) VALUES (:name, :image)",
        rusqlite::named_params! {
            ":name": name,
            ":image": image,
        },
    )
    .map_err(|e| Error::storage(e.to_string()))?;

    Ok(ImageId::from(conn.last_insert_rowid()))
}

/// Get an image by ID.
///
/// # Returns
///
/// * `Ok(Some(StoredImage))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<StoredImage>> {
    let result = conn.query_row(
        "SELECT id, name, image FROM image_store WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::storage(e.to_string())),
    }
}

/// Get every stored image in ascending id order, blobs included.
pub fn list_images(conn: &Connection) -> Result<Vec<StoredImage>> {
    let mut stmt = conn
        .prepare("SELECT id, name, image FROM image_store ORDER BY id ASC")
        .map_err(|e| Error::storage(e.to_string()))?;

    let images = stmt
        .query_map([], parse_image_row)
        .map_err(|e| Error::storage(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::storage(e.to_string()))?;

    Ok(images)
}

/// Count stored images.
pub fn count_images(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM image_store", [], |row| row.get(0))
        .map_err(|e| Error::storage(e.to_string()))?;

    Ok(count.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn test_insert_and_get_image() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let id = insert_image(&conn, "headshot.jpg", &[0xFF, 0xD8, 0x01, 0xFF, 0xD9]).unwrap();

        let stored = get_image(&conn, id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.name, "headshot.jpg");
        assert_eq!(stored.image, vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9]);
    }

    #[test]
    fn test_get_missing_image() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get_image(&conn, ImageId::from(42)).unwrap().is_none());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let names = ["c.jpg", "a.jpg", "b.jpg"];
        let ids: Vec<ImageId> = names
            .iter()
            .map(|name| insert_image(&conn, name, b"jpeg").unwrap())
            .collect();

        let listed = list_images(&conn).unwrap();
        let listed_names: Vec<&str> = listed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(listed_names, names);
        assert_eq!(listed.iter().map(|i| i.id).collect::<Vec<_>>(), ids);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_duplicate_names_are_separate_rows() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let first = insert_image(&conn, "same.jpg", b"one").unwrap();
        let second = insert_image(&conn, "same.jpg", b"two").unwrap();

        assert_ne!(first, second);
        assert_eq!(count_images(&conn).unwrap(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let first = insert_image(&conn, "a.jpg", b"a").unwrap();
        let second = insert_image(&conn, "b.jpg", b"b").unwrap();
        conn.execute("DELETE FROM image_store WHERE id = ?", [second.get()])
            .unwrap();

        let third = insert_image(&conn, "c.jpg", b"c").unwrap();
        assert!(third > second);
        assert!(third > first);
    }

    #[test]
    fn test_empty_store() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(list_images(&conn).unwrap().is_empty());
        assert_eq!(count_images(&conn).unwrap(), 0);
    }
}
