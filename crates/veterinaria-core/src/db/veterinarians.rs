//! Veterinarian database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Veterinarian;

const DATE_FORMAT: &str = "%Y-%m-%d";

const VETERINARIAN_COLUMNS: &str = r#"
    id, name, specialty, phone, email, registration_number, hired_on, active, created_at
"#;

impl Database {
    /// Insert a new veterinarian.
    pub fn insert_veterinarian(&self, vet: &Veterinarian) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO veterinarians (
                id, name, specialty, phone, email, registration_number, hired_on,
                active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                vet.id,
                vet.name,
                vet.specialty,
                vet.phone,
                vet.email,
                vet.registration_number,
                vet.hired_on.map(|d| d.format(DATE_FORMAT).to_string()),
                vet.active,
                vet.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a veterinarian by ID.
    pub fn get_veterinarian(&self, id: &str) -> DbResult<Option<Veterinarian>> {
        let sql = format!(
            "SELECT {} FROM veterinarians WHERE id = ?",
            VETERINARIAN_COLUMNS
        );
        self.conn
            .query_row(&sql, [id], veterinarian_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List veterinarians ordered by name.
    pub fn list_veterinarians(&self, active_only: bool) -> DbResult<Vec<Veterinarian>> {
        let filter = if active_only { "WHERE active = 1" } else { "" };
        let sql = format!(
            "SELECT {} FROM veterinarians {} ORDER BY name",
            VETERINARIAN_COLUMNS, filter
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], veterinarian_row)?;

        let mut vets = Vec::new();
        for row in rows {
            vets.push(row?.try_into()?);
        }
        Ok(vets)
    }

    /// Mark a veterinarian as inactive. Pets keep the reference.
    pub fn deactivate_veterinarian(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE veterinarians SET active = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Whether the veterinarian exists and is active.
    pub fn veterinarian_is_active(&self, id: &str) -> DbResult<bool> {
        let active: Option<bool> = self
            .conn
            .query_row("SELECT active FROM veterinarians WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(active.unwrap_or(false))
    }
}

/// Intermediate row struct for database mapping.
struct VeterinarianRow {
    id: String,
    name: String,
    specialty: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    registration_number: Option<String>,
    hired_on: Option<String>,
    active: bool,
    created_at: String,
}

fn veterinarian_row(row: &Row<'_>) -> rusqlite::Result<VeterinarianRow> {
    Ok(VeterinarianRow {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        registration_number: row.get(5)?,
        hired_on: row.get(6)?,
        active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl TryFrom<VeterinarianRow> for Veterinarian {
    type Error = DbError;

    fn try_from(row: VeterinarianRow) -> Result<Self, Self::Error> {
        let hired_on = row
            .hired_on
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()?;

        Ok(Veterinarian {
            id: row.id,
            name: row.name,
            specialty: row.specialty,
            phone: row.phone,
            email: row.email,
            registration_number: row.registration_number,
            hired_on,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();

        let mut vet = Veterinarian::new("Ana Soto".into());
        vet.specialty = Some("Cirugía".into());
        vet.hired_on = NaiveDate::from_ymd_opt(2021, 3, 1);
        db.insert_veterinarian(&vet).unwrap();

        let retrieved = db.get_veterinarian(&vet.id).unwrap().unwrap();
        assert_eq!(retrieved, vet);
        assert!(db.get_veterinarian("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_and_deactivate() {
        let db = Database::open_in_memory().unwrap();

        let soto = Veterinarian::new("Ana Soto".into());
        let diaz = Veterinarian::new("Bruno Díaz".into());
        db.insert_veterinarian(&soto).unwrap();
        db.insert_veterinarian(&diaz).unwrap();

        let listed = db.list_veterinarians(true).unwrap();
        assert_eq!(listed[0].name, "Ana Soto");
        assert_eq!(listed.len(), 2);

        assert!(db.deactivate_veterinarian(&soto.id).unwrap());
        assert_eq!(db.list_veterinarians(true).unwrap().len(), 1);
        assert_eq!(db.list_veterinarians(false).unwrap().len(), 2);
        assert!(!db.veterinarian_is_active(&soto.id).unwrap());
        assert!(db.veterinarian_is_active(&diaz.id).unwrap());
        assert!(!db.veterinarian_is_active("missing").unwrap());
    }
}
