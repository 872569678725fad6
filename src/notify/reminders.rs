//! The reminder protocol: which triggers exist for a medication or
//! appointment, and how cancellation stays in lockstep with edits.

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use super::gateway::{NotificationContent, NotificationGateway, TriggerRequest, TriggerSpec};
use super::{identifiers, NotifyError};
use crate::config;
use crate::models::{Appointment, Medication, ScheduleTime};

/// Category for routine dose reminders; the host registers the
/// Taken / Skip / Remind-later actions against it.
pub const MEDICATION_CATEGORY: &str = "MEDICATION_REMINDER";

/// Category for critical-dose reminders.
pub const CRITICAL_MEDICATION_CATEGORY: &str = "CRITICAL_MEDICATION_REMINDER";

/// Category for appointment reminders.
pub const APPOINTMENT_CATEGORY: &str = "APPOINTMENT_REMINDER";

fn daily(time: ScheduleTime) -> TriggerSpec {
    TriggerSpec::Daily {
        hour: time.hour(),
        minute: time.minute(),
    }
}

fn attempt(
    gateway: &dyn NotificationGateway,
    request: TriggerRequest,
    first_error: &mut Option<NotifyError>,
) {
    let identifier = request.identifier.clone();
    if let Err(e) = gateway.schedule(request) {
        tracing::warn!("Could not register reminder {identifier}: {e}");
        if first_error.is_none() {
            *first_error = Some(e);
        }
    }
}

// ─── Medication reminders ───────────────────────────────────

/// Register the full trigger set for a medication: a primary daily
/// trigger per schedule slot plus a follow-up 45 minutes later
/// (wrapping past midnight) for doses not yet marked.
///
/// A gateway refusal is not fatal: every remaining trigger is still
/// attempted, and the first error is returned so the host can surface
/// it. Medication data stays valid either way.
pub fn schedule_medication_reminders(
    gateway: &dyn NotificationGateway,
    medication: &Medication,
) -> Result<(), NotifyError> {
    let mut first_error = None;

    for (index, time) in medication.schedule_times.iter().enumerate() {
        let primary = TriggerRequest {
            identifier: identifiers::medication_reminder(&medication.id, index),
            content: dose_content(medication),
            trigger: daily(*time),
        };
        attempt(gateway, primary, &mut first_error);

        let follow_up = TriggerRequest {
            identifier: identifiers::medication_follow_up(&medication.id, index),
            content: follow_up_content(medication),
            trigger: daily(time.offset_by(config::FOLLOW_UP_DELAY_MINUTES)),
        };
        attempt(gateway, follow_up, &mut first_error);
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            tracing::info!(
                "Registered {} reminder triggers for medication {}",
                medication.schedule_times.len() * 2,
                medication.id
            );
            Ok(())
        }
    }
}

/// Cancel every trigger registered for a schedule.
///
/// `schedule` must be the snapshot taken when the triggers were
/// registered, before any edit. Deriving it from an already-edited
/// medication strands triggers for removed slots.
pub fn cancel_medication_reminders(
    gateway: &dyn NotificationGateway,
    medication_id: &Uuid,
    schedule: &[ScheduleTime],
) {
    let ids = identifiers::medication_identifiers(medication_id, schedule.len());
    if ids.is_empty() {
        return;
    }
    gateway.cancel(&ids);
}

/// Re-register after a schedule edit: cancel from the pre-edit
/// snapshot, then register the current schedule. Shrinking from three
/// slots to one leaves exactly one live pair.
pub fn reschedule_medication_reminders(
    gateway: &dyn NotificationGateway,
    previous_schedule: &[ScheduleTime],
    medication: &Medication,
) -> Result<(), NotifyError> {
    cancel_medication_reminders(gateway, &medication.id, previous_schedule);
    schedule_medication_reminders(gateway, medication)
}

// ─── Appointment reminders ──────────────────────────────────

/// Register the appointment reminder pair: the main trigger one hour
/// before the visit and, when enabled, a preparation trigger
/// `prep_lead` before. One-shot triggers already in the past are
/// skipped; completed appointments register nothing.
pub fn schedule_appointment_reminders(
    gateway: &dyn NotificationGateway,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<(), NotifyError> {
    if appointment.is_completed {
        return Ok(());
    }
    let mut first_error = None;

    let main_at =
        appointment.date_time - Duration::minutes(i64::from(config::APPOINTMENT_LEAD_MINUTES));
    if main_at > now {
        let request = TriggerRequest {
            identifier: identifiers::appointment_reminder(&appointment.id),
            content: appointment_content(appointment),
            trigger: TriggerSpec::Once { at: main_at },
        };
        attempt(gateway, request, &mut first_error);
    }

    if appointment.prep_reminder {
        let prep_at =
            appointment.date_time - Duration::minutes(i64::from(appointment.prep_lead.minutes()));
        if prep_at > now {
            let request = TriggerRequest {
                identifier: identifiers::appointment_prep(&appointment.id),
                content: prep_content(appointment),
                trigger: TriggerSpec::Once { at: prep_at },
            };
            attempt(gateway, request, &mut first_error);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Cancel the appointment reminder pair. Runs on deletion and on
/// completion; identifiers that never existed are a no-op.
pub fn cancel_appointment_reminders(gateway: &dyn NotificationGateway, appointment_id: &Uuid) {
    gateway.cancel(&identifiers::appointment_identifiers(appointment_id));
}

// ─── Content ────────────────────────────────────────────────

fn category_for(medication: &Medication) -> String {
    if medication.is_critical {
        CRITICAL_MEDICATION_CATEGORY.into()
    } else {
        MEDICATION_CATEGORY.into()
    }
}

fn dose_content(medication: &Medication) -> NotificationContent {
    let mut body = format!("It's time to take your {}.", medication.name);
    if !medication.dosage.is_empty() {
        body.push_str(&format!(" ({})", medication.dosage));
    }
    NotificationContent {
        title: "Time for your medication".into(),
        body,
        category: category_for(medication),
        time_sensitive: true,
    }
}

fn follow_up_content(medication: &Medication) -> NotificationContent {
    NotificationContent {
        title: "Friendly reminder".into(),
        body: format!("You haven't marked {} as taken yet.", medication.name),
        category: category_for(medication),
        // Critical medications break through on the follow-up too.
        time_sensitive: medication.is_critical,
    }
}

fn display_title(appointment: &Appointment) -> &str {
    if appointment.title.trim().is_empty() {
        &appointment.doctor_name
    } else {
        &appointment.title
    }
}

fn appointment_content(appointment: &Appointment) -> NotificationContent {
    let title = display_title(appointment);
    let mut body = format!("{title} today.");
    if let Some(location) = appointment
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    {
        body.push_str(&format!(" at {location}"));
    }
    NotificationContent {
        title: "Upcoming Appointment".into(),
        body,
        category: APPOINTMENT_CATEGORY.into(),
        time_sensitive: true,
    }
}

fn prep_content(appointment: &Appointment) -> NotificationContent {
    let title = display_title(appointment);
    let mut body = format!("Don't forget: {title} is coming up.");
    if let Some(notes) = appointment.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!(" Note: {notes}"));
    }
    NotificationContent {
        title: "Appointment Reminder".into(),
        body,
        category: APPOINTMENT_CATEGORY.into(),
        time_sensitive: false,
    }
}
