//! Appointment database operations, including the time-window queries used
//! for conflict detection.
//!
//! The window query is a free function over [`Connection`] so it can run both
//! on the plain connection and inside the write transaction of the checked
//! insert/update paths.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{format_instant, parse_decimal, parse_instant, Database, DbError, DbResult};
use crate::models::{Appointment, AppointmentKind, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str = r#"
    a.id, a.pet_id, a.scheduled_at, a.kind, a.status, a.reason, a.observations,
    a.veterinarian, a.estimated_price, a.created_at, a.updated_at
"#;

/// Criteria for listing appointments. Unset fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentFilter {
    /// Case-insensitive substring of pet name, owner name, reason or veterinarian
    pub text: Option<String>,
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on the scheduled instant
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the scheduled instant
    pub until: Option<DateTime<Utc>>,
}

/// Result of a conflict-checked appointment write.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotWrite {
    /// The row was written.
    Written,
    /// Nothing was written; these appointments occupy the window.
    Conflict(Vec<Appointment>),
}

impl Database {
    /// Insert a new appointment without any conflict check.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        insert_row(&self.conn, appointment)
    }

    /// Update an existing appointment without any conflict check.
    pub fn update_appointment(&self, appointment: &Appointment) -> DbResult<bool> {
        update_row(&self.conn, appointment)
    }

    /// Insert an appointment, re-running the conflict query in the same
    /// transaction as the write.
    ///
    /// Non-blocking statuses are written without a check.
    pub fn insert_appointment_checked(
        &self,
        appointment: &Appointment,
        window: Duration,
    ) -> DbResult<SlotWrite> {
        let tx = self.conn.unchecked_transaction()?;

        if appointment.status.is_blocking() {
            let conflicts = conflicts_for(&tx, appointment, window)?;
            if !conflicts.is_empty() {
                return Ok(SlotWrite::Conflict(conflicts));
            }
        }

        insert_row(&tx, appointment)?;
        tx.commit()?;
        Ok(SlotWrite::Written)
    }

    /// Update an appointment, re-running the conflict query (excluding the
    /// appointment itself) in the same transaction as the write.
    pub fn update_appointment_checked(
        &self,
        appointment: &Appointment,
        window: Duration,
    ) -> DbResult<SlotWrite> {
        let tx = self.conn.unchecked_transaction()?;

        if appointment.status.is_blocking() {
            let conflicts = conflicts_for(&tx, appointment, window)?;
            if !conflicts.is_empty() {
                return Ok(SlotWrite::Conflict(conflicts));
            }
        }

        if !update_row(&tx, appointment)? {
            return Err(DbError::NotFound(format!("appointment {}", appointment.id)));
        }
        tx.commit()?;
        Ok(SlotWrite::Written)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        let sql = format!(
            "SELECT {} FROM appointments a WHERE a.id = ?",
            APPOINTMENT_COLUMNS
        );
        self.conn
            .query_row(&sql, [id], appointment_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List appointments matching `filter`, latest first.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> DbResult<Vec<Appointment>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM appointments a
            JOIN pets p ON p.id = a.pet_id
            WHERE (?1 IS NULL
                   OR p.name LIKE ?1
                   OR p.owner_name LIKE ?1
                   OR a.reason LIKE ?1
                   OR a.veterinarian LIKE ?1)
            AND (?2 IS NULL OR a.status = ?2)
            AND (?3 IS NULL OR a.scheduled_at >= ?3)
            AND (?4 IS NULL OR a.scheduled_at < ?4)
            ORDER BY a.scheduled_at DESC
            "#,
            APPOINTMENT_COLUMNS
        );

        let pattern = filter
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t));
        let from = filter.from.as_ref().map(format_instant);
        let until = filter.until.as_ref().map(format_instant);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![pattern, filter.status.map(|s| s.as_str()), from, until],
            appointment_row,
        )?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?.try_into()?);
        }
        Ok(appointments)
    }

    /// All appointments of one pet, latest first.
    pub fn list_appointments_for_pet(&self, pet_id: &str) -> DbResult<Vec<Appointment>> {
        let sql = format!(
            "SELECT {} FROM appointments a WHERE a.pet_id = ? ORDER BY a.scheduled_at DESC",
            APPOINTMENT_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([pet_id], appointment_row)?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?.try_into()?);
        }
        Ok(appointments)
    }

    /// Cancel an appointment. Appointments are never hard-deleted.
    pub fn cancel_appointment(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE appointments SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                id,
                AppointmentStatus::Cancelled.as_str(),
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Appointments in the inclusive range `[start, end]` with one of `statuses`.
    pub fn appointments_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[AppointmentStatus],
        exclude_id: Option<&str>,
    ) -> DbResult<Vec<Appointment>> {
        appointments_in_window(&self.conn, start, end, statuses, exclude_id)
    }
}

/// Appointments in the inclusive range `[start, end]` with one of `statuses`,
/// ordered by scheduled time.
pub(crate) fn appointments_in_window(
    conn: &Connection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    statuses: &[AppointmentStatus],
    exclude_id: Option<&str>,
) -> DbResult<Vec<Appointment>> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }

    // Status codes are static identifiers, safe to inline.
    let status_list = statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        r#"
        SELECT {}
        FROM appointments a
        WHERE a.scheduled_at BETWEEN ?1 AND ?2
        AND a.status IN ({})
        AND (?3 IS NULL OR a.id <> ?3)
        ORDER BY a.scheduled_at
        "#,
        APPOINTMENT_COLUMNS, status_list
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![format_instant(&start), format_instant(&end), exclude_id],
        appointment_row,
    )?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.try_into()?);
    }
    Ok(appointments)
}

fn conflicts_for(
    conn: &Connection,
    appointment: &Appointment,
    window: Duration,
) -> DbResult<Vec<Appointment>> {
    appointments_in_window(
        conn,
        appointment.scheduled_at - window,
        appointment.scheduled_at + window,
        &AppointmentStatus::BLOCKING,
        Some(&appointment.id),
    )
}

fn insert_row(conn: &Connection, appointment: &Appointment) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO appointments (
            id, pet_id, scheduled_at, kind, status, reason, observations,
            veterinarian, estimated_price, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            appointment.id,
            appointment.pet_id,
            format_instant(&appointment.scheduled_at),
            appointment.kind.as_str(),
            appointment.status.as_str(),
            appointment.reason,
            appointment.observations,
            appointment.veterinarian,
            appointment.estimated_price.map(|p| p.to_string()),
            appointment.created_at,
            appointment.updated_at,
        ],
    )?;
    Ok(())
}

fn update_row(conn: &Connection, appointment: &Appointment) -> DbResult<bool> {
    let rows_affected = conn.execute(
        r#"
        UPDATE appointments SET
            pet_id = ?2,
            scheduled_at = ?3,
            kind = ?4,
            status = ?5,
            reason = ?6,
            observations = ?7,
            veterinarian = ?8,
            estimated_price = ?9,
            updated_at = ?10
        WHERE id = ?1
        "#,
        params![
            appointment.id,
            appointment.pet_id,
            format_instant(&appointment.scheduled_at),
            appointment.kind.as_str(),
            appointment.status.as_str(),
            appointment.reason,
            appointment.observations,
            appointment.veterinarian,
            appointment.estimated_price.map(|p| p.to_string()),
            appointment.updated_at,
        ],
    )?;
    Ok(rows_affected > 0)
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    pet_id: String,
    scheduled_at: String,
    kind: String,
    status: String,
    reason: String,
    observations: Option<String>,
    veterinarian: Option<String>,
    estimated_price: Option<String>,
    created_at: String,
    updated_at: String,
}

fn appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        scheduled_at: row.get(2)?,
        kind: row.get(3)?,
        status: row.get(4)?,
        reason: row.get(5)?,
        observations: row.get(6)?,
        veterinarian: row.get(7)?,
        estimated_price: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let kind = AppointmentKind::from_code(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("Unknown appointment kind: {}", row.kind)))?;
        let status = AppointmentStatus::from_code(&row.status).ok_or_else(|| {
            DbError::Constraint(format!("Unknown appointment status: {}", row.status))
        })?;

        Ok(Appointment {
            id: row.id,
            pet_id: row.pet_id,
            scheduled_at: parse_instant(&row.scheduled_at)?,
            kind,
            status,
            reason: row.reason,
            observations: row.observations,
            veterinarian: row.veterinarian,
            estimated_price: row.estimated_price.as_deref().map(parse_decimal).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
