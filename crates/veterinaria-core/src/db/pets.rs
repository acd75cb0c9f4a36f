//! Pet database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_decimal, Database, DbError, DbResult};
use crate::models::{Pet, PetSize, Sex};

const PET_COLUMNS: &str = r#"
    id, animal_type_id, name, breed, age, sex, size, weight_kg, color,
    owner_name, owner_phone, owner_email, owner_address, microchip,
    observations, attending_veterinarian_id, active, created_at, updated_at
"#;

impl Database {
    /// Insert a new pet.
    pub fn insert_pet(&self, pet: &Pet) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO pets (
                id, animal_type_id, name, breed, age, sex, size, weight_kg, color,
                owner_name, owner_phone, owner_email, owner_address, microchip,
                observations, attending_veterinarian_id, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                pet.id,
                pet.animal_type_id,
                pet.name,
                pet.breed,
                pet.age,
                pet.sex.as_str(),
                pet.size.map(|s| s.as_str()),
                pet.weight_kg.map(|w| w.to_string()),
                pet.color,
                pet.owner_name,
                pet.owner_phone,
                pet.owner_email,
                pet.owner_address,
                pet.microchip,
                pet.observations,
                pet.attending_veterinarian_id,
                pet.active,
                pet.created_at,
                pet.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing pet.
    pub fn update_pet(&self, pet: &Pet) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pets SET
                animal_type_id = ?2,
                name = ?3,
                breed = ?4,
                age = ?5,
                sex = ?6,
                size = ?7,
                weight_kg = ?8,
                color = ?9,
                owner_name = ?10,
                owner_phone = ?11,
                owner_email = ?12,
                owner_address = ?13,
                microchip = ?14,
                observations = ?15,
                attending_veterinarian_id = ?16,
                updated_at = ?17
            WHERE id = ?1
            "#,
            params![
                pet.id,
                pet.animal_type_id,
                pet.name,
                pet.breed,
                pet.age,
                pet.sex.as_str(),
                pet.size.map(|s| s.as_str()),
                pet.weight_kg.map(|w| w.to_string()),
                pet.color,
                pet.owner_name,
                pet.owner_phone,
                pet.owner_email,
                pet.owner_address,
                pet.microchip,
                pet.observations,
                pet.attending_veterinarian_id,
                pet.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a pet by ID.
    pub fn get_pet(&self, id: &str) -> DbResult<Option<Pet>> {
        let sql = format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS);
        self.conn
            .query_row(&sql, [id], pet_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List pets, most recently registered first.
    pub fn list_pets(&self, active_only: bool) -> DbResult<Vec<Pet>> {
        let filter = if active_only { "WHERE active = 1" } else { "" };
        let sql = format!(
            "SELECT {} FROM pets {} ORDER BY created_at DESC, name",
            PET_COLUMNS, filter
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], pet_row)?;

        let mut pets = Vec::new();
        for row in rows {
            pets.push(row?.try_into()?);
        }
        Ok(pets)
    }

    /// Search active pets by name (prefix match).
    pub fn search_pets(&self, query: &str, limit: usize) -> DbResult<Vec<Pet>> {
        let pattern = format!("{}%", query);
        let sql = format!(
            "SELECT {} FROM pets WHERE active = 1 AND name LIKE ? ORDER BY name LIMIT ?",
            PET_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, limit as i64], pet_row)?;

        let mut pets = Vec::new();
        for row in rows {
            pets.push(row?.try_into()?);
        }
        Ok(pets)
    }

    /// Mark pet as inactive (soft delete).
    pub fn deactivate_pet(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE pets SET active = 0, updated_at = ?2 WHERE id = ?1",
            params![id, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Whether another pet (active or not) already carries this microchip.
    pub fn microchip_taken(&self, microchip: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pets WHERE microchip = ?1 AND (?2 IS NULL OR id <> ?2)",
            params![microchip, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether the pet exists and is active.
    pub fn pet_is_active(&self, id: &str) -> DbResult<bool> {
        let active: Option<bool> = self
            .conn
            .query_row("SELECT active FROM pets WHERE id = ?", [id], |row| row.get(0))
            .optional()?;
        Ok(active.unwrap_or(false))
    }
}

/// Intermediate row struct for database mapping.
struct PetRow {
    id: String,
    animal_type_id: String,
    name: String,
    breed: Option<String>,
    age: Option<u32>,
    sex: String,
    size: Option<String>,
    weight_kg: Option<String>,
    color: Option<String>,
    owner_name: String,
    owner_phone: Option<String>,
    owner_email: Option<String>,
    owner_address: Option<String>,
    microchip: Option<String>,
    observations: Option<String>,
    attending_veterinarian_id: Option<String>,
    active: bool,
    created_at: String,
    updated_at: String,
}

fn pet_row(row: &Row<'_>) -> rusqlite::Result<PetRow> {
    Ok(PetRow {
        id: row.get(0)?,
        animal_type_id: row.get(1)?,
        name: row.get(2)?,
        breed: row.get(3)?,
        age: row.get(4)?,
        sex: row.get(5)?,
        size: row.get(6)?,
        weight_kg: row.get(7)?,
        color: row.get(8)?,
        owner_name: row.get(9)?,
        owner_phone: row.get(10)?,
        owner_email: row.get(11)?,
        owner_address: row.get(12)?,
        microchip: row.get(13)?,
        observations: row.get(14)?,
        attending_veterinarian_id: row.get(15)?,
        active: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

impl TryFrom<PetRow> for Pet {
    type Error = DbError;

    fn try_from(row: PetRow) -> Result<Self, Self::Error> {
        let sex = Sex::from_code(&row.sex)
            .ok_or_else(|| DbError::Constraint(format!("Unknown sex: {}", row.sex)))?;
        let size = row
            .size
            .map(|s| {
                PetSize::from_code(&s)
                    .ok_or_else(|| DbError::Constraint(format!("Unknown pet size: {}", s)))
            })
            .transpose()?;

        Ok(Pet {
            id: row.id,
            animal_type_id: row.animal_type_id,
            name: row.name,
            breed: row.breed,
            age: row.age,
            sex,
            size,
            weight_kg: row.weight_kg.as_deref().map(parse_decimal).transpose()?,
            color: row.color,
            owner_name: row.owner_name,
            owner_phone: row.owner_phone,
            owner_email: row.owner_email,
            owner_address: row.owner_address,
            microchip: row.microchip,
            observations: row.observations,
            attending_veterinarian_id: row.attending_veterinarian_id,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
