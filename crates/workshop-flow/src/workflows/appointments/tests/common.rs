use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::workflows::appointments::{Appointment, AppointmentId, AppointmentStatus};
use crate::workflows::domain::{ClientId, VehicleId, WorkshopId};
use crate::workflows::schedule::SlotHour;

pub(super) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn later() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 16, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn appointment(status: AppointmentStatus) -> Appointment {
    Appointment {
        id: AppointmentId("cita-000042".to_string()),
        workshop_id: WorkshopId::new("taller-centro"),
        vehicle_id: VehicleId::new("veh-7"),
        client_id: ClientId::new("cli-3"),
        vehicle: None,
        date: NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
        time_slot: SlotHour::new(9).expect("catalog hour"),
        description: "Brake noise when stopping".to_string(),
        notes: None,
        status,
        created_at: created_at(),
        updated_at: created_at(),
    }
}
