use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::domain::{
    AvailableSlot, ClosedReason, DaySchedule, DayUpdate, HourSlot, ReleaseOutcome,
    ScheduleTemplate, SlotConfig, SlotHour, SlotUpdate, HOURS_CATALOG,
};
use crate::workflows::domain::WorkshopId;
use crate::workflows::rejection::ErrorKind;

/// Rule violations raised while editing or booking a day schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("hour {hour} appears more than once in the request")]
    DuplicateHour { hour: SlotHour },
    #[error("capacity for {hour} must be at least 1")]
    InvalidCapacity { hour: SlotHour },
    #[error("range start {start} is after range end {end}")]
    InvalidRange { start: SlotHour, end: SlotHour },
    #[error("{hour} on {date} still holds {booked} booking(s) and cannot be closed or cleared")]
    SlotInUse {
        date: NaiveDate,
        hour: SlotHour,
        booked: u32,
    },
    #[error("capacity {capacity} for {hour} on {date} is below the {booked} booking(s) already taken")]
    CapacityBelowBooked {
        date: NaiveDate,
        hour: SlotHour,
        capacity: u32,
        booked: u32,
    },
    #[error("cannot book {hour} on {date}: {}", .reason.label())]
    SlotClosed {
        date: NaiveDate,
        hour: SlotHour,
        reason: ClosedReason,
    },
    #[error("{hour} on {date} is full ({capacity} of {capacity} booked)")]
    SlotFull {
        date: NaiveDate,
        hour: SlotHour,
        capacity: u32,
    },
}

impl CalendarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalendarError::DuplicateHour { .. }
            | CalendarError::InvalidCapacity { .. }
            | CalendarError::InvalidRange { .. } => ErrorKind::InvalidRequest,
            CalendarError::SlotInUse { .. } => ErrorKind::SlotInUse,
            CalendarError::CapacityBelowBooked { .. } => ErrorKind::CapacityBelowBooked,
            CalendarError::SlotClosed { .. } => ErrorKind::SlotClosed,
            CalendarError::SlotFull { .. } => ErrorKind::SlotFull,
        }
    }
}

impl DaySchedule {
    /// A day with every catalog hour present but closed.
    pub fn unconfigured(workshop_id: WorkshopId, date: NaiveDate) -> Self {
        Self {
            workshop_id,
            date,
            blocked: false,
            block_reason: None,
            slots: HOURS_CATALOG.iter().copied().map(HourSlot::closed).collect(),
        }
    }

    /// Build a fresh day from explicit slot configuration. Hours left out stay closed.
    pub fn configure(
        workshop_id: WorkshopId,
        date: NaiveDate,
        slots: &[SlotConfig],
        blocked: bool,
        block_reason: Option<String>,
    ) -> Result<Self, CalendarError> {
        let mut seen = BTreeSet::new();
        for config in slots {
            if !seen.insert(config.hour) {
                return Err(CalendarError::DuplicateHour { hour: config.hour });
            }
        }

        let updates: Vec<SlotUpdate> = slots
            .iter()
            .map(|config| SlotUpdate {
                hour: config.hour,
                active: Some(config.active),
                capacity: Some(config.capacity),
            })
            .collect();

        Self::unconfigured(workshop_id, date).apply_update(&DayUpdate {
            slots: updates,
            blocked: Some(blocked),
            block_reason,
        })
    }

    pub fn slot(&self, hour: SlotHour) -> Option<&HourSlot> {
        self.slots.iter().find(|slot| slot.hour == hour)
    }

    fn slot_mut(&mut self, hour: SlotHour) -> &mut HourSlot {
        let index = match self.slots.binary_search_by_key(&hour, |slot| slot.hour) {
            Ok(index) => index,
            Err(index) => {
                self.slots.insert(index, HourSlot::closed(hour));
                index
            }
        };
        &mut self.slots[index]
    }

    /// Merge slot updates by hour and return the resulting day.
    ///
    /// The receiver is left untouched, so a rejected update never leaves a partial edit behind.
    pub fn apply_update(&self, update: &DayUpdate) -> Result<Self, CalendarError> {
        let mut next = self.clone();

        for change in &update.slots {
            let date = next.date;
            let slot = next.slot_mut(change.hour);
            let capacity = change.capacity.unwrap_or(slot.capacity);
            let active = change.active.unwrap_or(slot.active);

            if capacity == 0 {
                return Err(CalendarError::InvalidCapacity { hour: slot.hour });
            }
            if !active && slot.booked > 0 {
                return Err(CalendarError::SlotInUse {
                    date,
                    hour: slot.hour,
                    booked: slot.booked,
                });
            }
            if capacity < slot.booked {
                return Err(CalendarError::CapacityBelowBooked {
                    date,
                    hour: slot.hour,
                    capacity,
                    booked: slot.booked,
                });
            }

            slot.capacity = capacity;
            slot.active = active;
        }

        if let Some(blocked) = update.blocked {
            next.blocked = blocked;
            next.block_reason = if blocked {
                update.block_reason.clone()
            } else {
                None
            };
        } else if update.block_reason.is_some() && next.blocked {
            next.block_reason = update.block_reason.clone();
        }

        Ok(next)
    }

    /// Open every template hour with the template's capacity.
    pub fn apply_template(&self, template: &ScheduleTemplate) -> Result<Self, CalendarError> {
        let slots = template
            .hours
            .iter()
            .map(|hour| SlotUpdate::open(*hour, template.capacity))
            .collect();
        self.apply_update(&DayUpdate {
            slots,
            ..DayUpdate::default()
        })
    }

    /// Open every hour from `start` to `end` inclusive with the same capacity.
    pub fn apply_range(
        &self,
        start: SlotHour,
        end: SlotHour,
        capacity: u32,
    ) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        let slots = HOURS_CATALOG
            .iter()
            .copied()
            .filter(|hour| (start..=end).contains(hour))
            .map(|hour| SlotUpdate::open(hour, capacity))
            .collect();
        self.apply_update(&DayUpdate {
            slots,
            ..DayUpdate::default()
        })
    }

    /// Take active flags and capacities from `source`, keeping this day's bookings.
    pub fn with_configuration_of(&self, source: &DaySchedule) -> Result<Self, CalendarError> {
        let slots = HOURS_CATALOG
            .iter()
            .map(|hour| {
                let template = source.slot(*hour).copied().unwrap_or(HourSlot::closed(*hour));
                SlotUpdate {
                    hour: *hour,
                    active: Some(template.active),
                    capacity: Some(template.capacity),
                }
            })
            .collect();
        self.apply_update(&DayUpdate {
            slots,
            ..DayUpdate::default()
        })
    }

    /// Take one seat in `hour`.
    pub fn reserve(&mut self, hour: SlotHour) -> Result<&HourSlot, CalendarError> {
        let date = self.date;
        if self.blocked {
            return Err(CalendarError::SlotClosed {
                date,
                hour,
                reason: ClosedReason::DayBlocked,
            });
        }

        let slot = self.slot_mut(hour);
        if !slot.active {
            return Err(CalendarError::SlotClosed {
                date,
                hour,
                reason: ClosedReason::SlotInactive,
            });
        }
        if slot.booked >= slot.capacity {
            return Err(CalendarError::SlotFull {
                date,
                hour,
                capacity: slot.capacity,
            });
        }

        slot.booked += 1;
        Ok(&*slot)
    }

    /// Give back one seat in `hour`. Never drops below zero.
    pub fn release(&mut self, hour: SlotHour) -> ReleaseOutcome {
        let slot = self.slot_mut(hour);
        if slot.booked == 0 {
            return ReleaseOutcome::AlreadyEmpty;
        }
        slot.booked -= 1;
        ReleaseOutcome::Released {
            remaining_booked: slot.booked,
        }
    }

    /// First slot still holding bookings, if any.
    pub fn first_booked_slot(&self) -> Option<&HourSlot> {
        self.slots.iter().find(|slot| slot.booked > 0)
    }

    pub fn booked_total(&self) -> u32 {
        self.slots.iter().map(|slot| slot.booked).sum()
    }

    pub fn active_slots(&self) -> impl Iterator<Item = &HourSlot> {
        self.slots.iter().filter(|slot| slot.active)
    }

    /// A day counts as configured once at least one hour is open.
    pub fn is_configured(&self) -> bool {
        self.active_slots().next().is_some()
    }

    /// Hours that can accept a booking right now.
    pub fn available_slots(&self) -> Vec<AvailableSlot> {
        if self.blocked {
            return Vec::new();
        }
        self.active_slots()
            .filter(|slot| slot.remaining() > 0)
            .map(|slot| AvailableSlot {
                hour: slot.hour,
                capacity: slot.capacity,
                remaining: slot.remaining(),
            })
            .collect()
    }
}
