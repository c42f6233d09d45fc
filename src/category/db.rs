//! Database operations for categories.
//!
//! Every query is scoped by the owning user. Rows belonging to other users
//! are reported as missing so that their existence is not leaked.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::{Category, CategoryId, CategoryName, Color},
    transaction::Kind,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    kind: Kind,
    color: Color,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, kind, color) VALUES (?1, ?2, ?3, ?4);",
        (user_id.as_i64(), name.as_ref(), kind, color.as_ref()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        kind,
        color,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `category_id` does not refer to a category
/// owned by `user_id`, or an [Error::SqlError] if there is some other SQL
/// error.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, color FROM category
            WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the categories owned by `user_id` ordered alphabetically by name,
/// optionally restricted to one kind.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_categories(
    user_id: UserID,
    kind: Option<Kind>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    match kind {
        Some(kind) => connection
            .prepare(
                "SELECT id, user_id, name, kind, color FROM category
                WHERE user_id = :user_id AND kind = :kind ORDER BY name ASC;",
            )?
            .query_map(
                rusqlite::named_params! {":user_id": user_id.as_i64(), ":kind": kind},
                map_row,
            )?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
        None => connection
            .prepare(
                "SELECT id, user_id, name, kind, color FROM category
                WHERE user_id = :user_id ORDER BY name ASC;",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
    }
}

/// Update a category's name and color. The kind is fixed at creation and
/// cannot be changed.
///
/// # Errors
/// Returns an [Error::UpdateMissingCategory] if `category_id` does not refer
/// to a category owned by `user_id`.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    new_name: CategoryName,
    new_color: Color,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3 AND user_id = ?4",
        (
            new_name.as_ref(),
            new_color.as_ref(),
            category_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category owned by `user_id`.
///
/// The delete is refused while any transaction still references the category,
/// so the caller must reassign or delete those transactions first. The
/// referencing check runs before the delete; the foreign key on
/// `transaction.category_id` makes a racing insert fail the delete rather
/// than orphan rows.
///
/// # Errors
/// Returns a:
/// - [Error::CategoryInUse] if at least one transaction references the
///   category,
/// - [Error::DeleteMissingCategory] if `category_id` does not refer to a
///   category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let reference_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if reference_count > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            color TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id, kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let kind = row.get(3)?;
    let raw_color: String = row.get(4)?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        color: Color::new_unchecked(&raw_color),
    })
}
