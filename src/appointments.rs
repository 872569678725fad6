//! Appointment lifecycle flows: add, complete, delete. Reminders are a
//! one-shot pair (main + optional preparation) registered on creation
//! and canceled together on completion or deletion.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::medications::FlowError;
use crate::models::Appointment;
use crate::notify::{
    cancel_appointment_reminders, schedule_appointment_reminders, NotificationGateway,
};
use crate::store::{CareStore, StoreError};

/// Insert a new appointment and register its reminder pair. Triggers
/// whose fire time is already past are skipped.
pub fn add_appointment(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<(), FlowError> {
    store.insert_appointment(appointment)?;
    tracing::info!(
        "Added appointment {} at {}",
        appointment.id,
        appointment.date_time
    );
    schedule_appointment_reminders(gateway, appointment, now)?;
    Ok(())
}

/// Mark an appointment completed and cancel its reminder pair, so a
/// visit logged early does not still ring an hour before.
pub fn complete_appointment(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    id: &Uuid,
) -> Result<Appointment, FlowError> {
    let mut appointment = store.appointment(id)?.ok_or_else(|| StoreError::NotFound {
        entity_type: "appointment".into(),
        id: id.to_string(),
    })?;

    appointment.is_completed = true;
    store.save_appointment(&appointment)?;
    cancel_appointment_reminders(gateway, id);
    Ok(appointment)
}

/// Remove an appointment and cancel its reminder pair. Appointments
/// are hard-deleted; unlike medications they carry no dose history.
pub fn delete_appointment(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    id: &Uuid,
) -> Result<(), FlowError> {
    store.delete_appointment(id)?;
    cancel_appointment_reminders(gateway, id);
    Ok(())
}
