//! Appointment validation and the scheduling rule.
//!
//! The scheduled instant goes through the temporal checks in a fixed order
//! and stops at the first failure:
//!
//! 1. future only, for new appointments
//! 2. within the booking horizon
//! 3. inside clinic hours (local time)
//! 4. not on the closed weekday
//!
//! Only when all four pass, and the candidate status occupies its slot, is the
//! store asked for conflicting appointments inside the conflict window.

use chrono::{DateTime, Datelike, SubsecRound, Timelike, Utc};
use tracing::{debug, warn};

use super::{
    non_blank, validate_estimated_price, validate_reason, validate_vet_name, FieldError,
    FieldErrorCode, FieldResult, RecordResult, ValidationContext, ValidationError,
    ValidationReport,
};
use crate::config::ClinicConfig;
use crate::db::DbResult;
use crate::models::{Appointment, AppointmentInput, AppointmentKind, AppointmentStatus};

/// Temporal checks on a scheduled instant, first failure wins.
///
/// `is_new` is true when the appointment has no identity yet; updates may keep
/// a time that is already in the past.
pub fn check_schedule(
    scheduled_at: DateTime<Utc>,
    is_new: bool,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> FieldResult<()> {
    if is_new && scheduled_at <= now {
        return Err(FieldError::new(
            FieldErrorCode::NotInFuture,
            "The appointment must be scheduled in the future",
        ));
    }

    if let Some(horizon) = config.booking_horizon(now) {
        if scheduled_at > horizon {
            return Err(FieldError::new(
                FieldErrorCode::BeyondHorizon,
                format!(
                    "Appointments cannot be booked more than {} months ahead",
                    config.booking_horizon_months
                ),
            ));
        }
    }

    let local = config.local_time(scheduled_at);
    if local.hour() < config.opening_hour || local.hour() >= config.closing_hour {
        return Err(FieldError::new(
            FieldErrorCode::OutsideBusinessHours,
            format!(
                "Appointments are only available between {:02}:00 and {:02}:00",
                config.opening_hour, config.closing_hour
            ),
        ));
    }

    if local.weekday() == config.closed_weekday {
        return Err(FieldError::new(
            FieldErrorCode::ClosedDay,
            format!("The clinic is closed on {}", config.closed_weekday),
        ));
    }

    Ok(())
}

/// Blocking appointments inside the conflict window around `scheduled_at`,
/// other than `exclude_id`.
pub fn find_conflicts(
    scheduled_at: DateTime<Utc>,
    exclude_id: Option<&str>,
    ctx: &ValidationContext<'_>,
) -> DbResult<Option<ValidationError>> {
    let window = ctx.config.conflict_window();
    let window_start = scheduled_at - window;
    let window_end = scheduled_at + window;

    let conflicts = ctx.lookup.appointments_in_window(
        window_start,
        window_end,
        &AppointmentStatus::BLOCKING,
        exclude_id,
    )?;
    if conflicts.is_empty() {
        return Ok(None);
    }

    let conflicting_ids: Vec<String> = conflicts.into_iter().map(|a| a.id).collect();
    warn!(
        scheduled_at = %scheduled_at,
        conflicts = conflicting_ids.len(),
        "Scheduling conflict"
    );
    Ok(Some(ValidationError::SchedulingConflict {
        window_start,
        window_end,
        conflicting_ids,
    }))
}

/// Validate an appointment submission. A submission with an `id` is an update
/// of that appointment.
pub fn validate_appointment(
    input: &AppointmentInput,
    ctx: &ValidationContext<'_>,
) -> RecordResult<Appointment> {
    let mut report = ValidationReport::default();
    let is_new = input.id.is_none();

    let pet_id = match non_blank(&input.pet_id) {
        None => {
            report.field_error("pet", FieldErrorCode::Required, "The pet is required");
            None
        }
        Some(id) if ctx.lookup.pet_is_active(id)? => Some(id.to_string()),
        Some(_) => {
            report.field_error("pet", FieldErrorCode::UnknownReference, "Select an active pet");
            None
        }
    };

    let scheduled_at = match input.scheduled_at {
        None => {
            report.field_error(
                "scheduled_at",
                FieldErrorCode::Required,
                "The date and time are required",
            );
            None
        }
        Some(raw) => {
            let scheduled_at = raw.trunc_subsecs(0);
            match check_schedule(scheduled_at, is_new, ctx.now, ctx.config) {
                Err(error) => {
                    report.push(ValidationError::Field {
                        field: "scheduled_at",
                        error,
                    });
                    None
                }
                Ok(()) => {
                    if input.status.is_blocking() {
                        if let Some(conflict) =
                            find_conflicts(scheduled_at, input.id.as_deref(), ctx)?
                        {
                            report.push(conflict);
                        }
                    }
                    Some(scheduled_at)
                }
            }
        }
    };

    let kind = input.kind;
    if kind.is_none() {
        report.field_error(
            "kind",
            FieldErrorCode::Required,
            "The appointment type is required",
        );
    }

    let reason = report.check("reason", validate_reason(&input.reason));
    let veterinarian = non_blank(&input.veterinarian)
        .and_then(|name| report.check("veterinarian", validate_vet_name(name)));
    let estimated_price = input
        .estimated_price
        .and_then(|price| report.check("estimated_price", validate_estimated_price(price)));

    // Form-wide coherence
    if let Some(scheduled_at) = scheduled_at {
        if input.status == AppointmentStatus::Completed && scheduled_at > ctx.now {
            report.push(ValidationError::CrossField {
                field: None,
                code: FieldErrorCode::CompletedInFuture,
                message: "An appointment cannot be completed before its scheduled time".into(),
            });
        }
    }
    if kind == Some(AppointmentKind::Emergency) && input.estimated_price.is_none() {
        report.advise(
            "estimated_price",
            "Emergency appointments should carry an estimated price",
        );
    }
    if kind == Some(AppointmentKind::Surgery) && non_blank(&input.veterinarian).is_none() {
        report.push(ValidationError::CrossField {
            field: Some("veterinarian"),
            code: FieldErrorCode::Required,
            message: "Surgeries require an assigned veterinarian".into(),
        });
    }

    let (Some(pet_id), Some(scheduled_at), Some(kind), Some(reason)) =
        (pet_id, scheduled_at, kind, reason)
    else {
        debug!(errors = report.errors.len(), "Rejected appointment submission");
        return report.reject();
    };
    if !report.is_valid() {
        debug!(errors = report.errors.len(), "Rejected appointment submission");
        return report.reject();
    }

    let mut appointment = Appointment::new(pet_id, scheduled_at, kind, reason);
    if let Some(id) = &input.id {
        appointment.id = id.clone();
    }
    appointment.status = input.status;
    appointment.observations = non_blank(&input.observations).map(str::to_string);
    appointment.veterinarian = veterinarian;
    appointment.estimated_price = estimated_price;

    report.finish(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
        // 2026-10-19 is a Monday
        Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn code_of(result: FieldResult<()>) -> FieldErrorCode {
        result.unwrap_err().code
    }

    #[test]
    fn test_schedule_accepts_business_hours() {
        let config = ClinicConfig::default();
        assert!(check_schedule(monday(8, 0), true, now(), &config).is_ok());
        assert!(check_schedule(monday(19, 59), true, now(), &config).is_ok());
    }

    #[test]
    fn test_schedule_rejections_in_order() {
        let config = ClinicConfig::default();

        // Past and also outside hours: the future check wins
        assert_eq!(
            code_of(check_schedule(now() - Duration::days(1) - Duration::hours(10), true, now(), &config)),
            FieldErrorCode::NotInFuture
        );
        assert_eq!(code_of(check_schedule(now(), true, now(), &config)), FieldErrorCode::NotInFuture);
        assert_eq!(
            code_of(check_schedule(monday(7, 59), true, now(), &config)),
            FieldErrorCode::OutsideBusinessHours
        );
        assert_eq!(
            code_of(check_schedule(monday(20, 0), true, now(), &config)),
            FieldErrorCode::OutsideBusinessHours
        );
        assert_eq!(
            code_of(check_schedule(monday(10, 0) - Duration::days(1), true, now(), &config)),
            FieldErrorCode::ClosedDay
        );
        assert_eq!(
            code_of(check_schedule(monday(10, 0) + Duration::days(400), true, now(), &config)),
            FieldErrorCode::BeyondHorizon
        );
    }

    #[test]
    fn test_updates_may_keep_past_time() {
        let config = ClinicConfig::default();
        let past_monday = monday(10, 0) - Duration::weeks(1);
        assert!(check_schedule(past_monday, false, now(), &config).is_ok());
    }

    #[test]
    fn test_hours_use_clinic_offset() {
        let config = ClinicConfig {
            utc_offset_minutes: -180,
            ..ClinicConfig::default()
        };
        // 10:00 UTC is 07:00 local
        assert_eq!(
            code_of(check_schedule(monday(10, 0), true, now(), &config)),
            FieldErrorCode::OutsideBusinessHours
        );
        // 22:00 UTC is 19:00 local
        assert!(check_schedule(monday(22, 0), true, now(), &config).is_ok());
    }
}
