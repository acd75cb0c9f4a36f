//! Appointment (cita) models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type of appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentKind {
    GeneralConsultation,
    Vaccination,
    Surgery,
    Checkup,
    Emergency,
    Grooming,
    Other,
}

impl AppointmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentKind::GeneralConsultation => "general_consultation",
            AppointmentKind::Vaccination => "vaccination",
            AppointmentKind::Surgery => "surgery",
            AppointmentKind::Checkup => "checkup",
            AppointmentKind::Emergency => "emergency",
            AppointmentKind::Grooming => "grooming",
            AppointmentKind::Other => "other",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "general_consultation" => Some(AppointmentKind::GeneralConsultation),
            "vaccination" => Some(AppointmentKind::Vaccination),
            "surgery" => Some(AppointmentKind::Surgery),
            "checkup" => Some(AppointmentKind::Checkup),
            "emergency" => Some(AppointmentKind::Emergency),
            "grooming" => Some(AppointmentKind::Grooming),
            "other" => Some(AppointmentKind::Other),
            _ => None,
        }
    }
}

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses that occupy the schedule and therefore take part in conflict detection.
    pub const BLOCKING: [AppointmentStatus; 2] =
        [AppointmentStatus::Confirmed, AppointmentStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "in_progress" => Some(AppointmentStatus::InProgress),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "no_show" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Whether this status occupies its time slot.
    pub fn is_blocking(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    /// Completed and cancelled appointments are final.
    pub fn is_final(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

/// Raw appointment submission as parsed from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentInput {
    pub id: Option<String>,
    pub pet_id: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub kind: Option<AppointmentKind>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub observations: String,
    pub veterinarian: String,
    pub estimated_price: Option<Decimal>,
}

/// A validated appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Local UUID
    pub id: String,
    /// Pet reference
    pub pet_id: String,
    /// Scheduled instant, whole seconds
    pub scheduled_at: DateTime<Utc>,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    /// Reason for the visit
    pub reason: String,
    pub observations: Option<String>,
    /// Assigned veterinarian name
    pub veterinarian: Option<String>,
    /// Estimated price (CLP)
    pub estimated_price: Option<Decimal>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Appointment {
    /// Create a new scheduled appointment with required fields.
    pub fn new(
        pet_id: String,
        scheduled_at: DateTime<Utc>,
        kind: AppointmentKind,
        reason: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            scheduled_at,
            kind,
            status: AppointmentStatus::Scheduled,
            reason,
            observations: None,
            veterinarian: None,
            estimated_price: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The scheduled time is already behind `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at < now
    }

    /// Updates are only accepted for appointments that are neither final nor past.
    pub fn is_modifiable(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_final() && !self.is_past(now)
    }

    /// [`Appointment::is_modifiable`] against the current clock.
    pub fn is_modifiable_now(&self) -> bool {
        self.is_modifiable(Utc::now())
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
