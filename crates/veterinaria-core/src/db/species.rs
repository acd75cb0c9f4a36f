//! Animal type database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::AnimalType;

impl Database {
    /// Insert a new animal type.
    pub fn insert_animal_type(&self, animal_type: &AnimalType) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO animal_types (id, name, description, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                animal_type.id,
                animal_type.name,
                animal_type.description,
                animal_type.active,
                animal_type.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an animal type by ID.
    pub fn get_animal_type(&self, id: &str) -> DbResult<Option<AnimalType>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, description, active, created_at
                FROM animal_types
                WHERE id = ?
                "#,
                [id],
                animal_type_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List animal types ordered by name.
    pub fn list_animal_types(&self, active_only: bool) -> DbResult<Vec<AnimalType>> {
        let sql = if active_only {
            r#"
            SELECT id, name, description, active, created_at
            FROM animal_types
            WHERE active = 1
            ORDER BY name
            "#
        } else {
            r#"
            SELECT id, name, description, active, created_at
            FROM animal_types
            ORDER BY name
            "#
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], animal_type_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Mark an animal type as inactive (soft delete).
    pub fn deactivate_animal_type(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE animal_types SET active = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn animal_type_from_row(row: &Row<'_>) -> rusqlite::Result<AnimalType> {
    Ok(AnimalType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        created_at: row.get(4)?,
    })
}
