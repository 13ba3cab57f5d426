use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Category, CategoryId};
use super::{Store, StoreResult};

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "General",
    "Technology",
    "Sports",
    "Movies",
    "Music",
    "Books",
    "Travel",
    FALLBACK_CATEGORY,
];

/// Category attached to posts created without any.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Insert any missing default categories. Returns how many were added.
pub fn seed_categories(conn: &Connection) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO categories (name) VALUES (?1)")?;
    let mut added = 0;
    for name in DEFAULT_CATEGORIES {
        added += stmt.execute(params![name])?;
    }
    Ok(added)
}

impl Store {
    pub fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Look up categories by name, keeping the input order. Unknown names are skipped.
    pub fn categories_by_name(&self, names: &[String]) -> StoreResult<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM categories WHERE name = ?1")?;
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            let category = stmt
                .query_row(params![name], |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })
                .optional()?;
            found.extend(category);
        }
        Ok(found)
    }

    /// Get-or-create a category by name.
    pub fn ensure_category(&self, name: &str) -> StoreResult<CategoryId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
            params![name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }
}
