use std::sync::Arc;

use chrono::NaiveDate;
use rentora_common::error::Error;
use rentora_common::models::appointment::{Appointment, AppointmentStatus};
use rentora_common::models::user::{Principal, Role};
use rentora_common::models::{Page, PageRequest, Pagination};
use rentora_common::traits::repository_traits::{AppointmentRepo, PropertyRepo};
use tracing::info;
use uuid::Uuid;

/// Visit bookings: pending -> accepted | rejected, both terminal, with at
/// most one pending booking per (property, customer). Only the owner
/// captured at booking time may transition the state.
pub struct AppointmentService {
    properties: Arc<dyn PropertyRepo>,
    appointments: Arc<dyn AppointmentRepo>,
}

impl AppointmentService {
    pub fn new(
        properties: Arc<dyn PropertyRepo>,
        appointments: Arc<dyn AppointmentRepo>,
    ) -> Self {
        Self {
            properties,
            appointments,
        }
    }

    pub async fn book(
        &self,
        principal: &Principal,
        property_id: Uuid,
        visit_date: NaiveDate,
        visit_time: &str,
    ) -> Result<Appointment, Error> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers can book appointments.".to_string(),
            ));
        }

        let property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", property_id)))?;

        // Fast pre-check; the storage layer's pending-uniqueness constraint
        // closes the remaining race window.
        if self
            .appointments
            .find_pending(property_id, principal.user_id)
            .await?
            .is_some()
        {
            return Err(Error::DuplicatePending);
        }

        let appointment = Appointment::new(
            property_id,
            principal.user_id,
            property.owner_id,
            visit_date,
            visit_time,
        );
        self.appointments.insert(&appointment).await?;

        info!(
            "customer {} booked appointment {} for property {}",
            principal.user_id, appointment.appointment_id, property_id
        );
        Ok(appointment)
    }

    pub async fn accept(
        &self,
        principal: &Principal,
        appointment_id: Uuid,
    ) -> Result<Appointment, Error> {
        self.transition(principal, appointment_id, AppointmentStatus::Accepted)
            .await
    }

    pub async fn reject(
        &self,
        principal: &Principal,
        appointment_id: Uuid,
    ) -> Result<Appointment, Error> {
        self.transition(principal, appointment_id, AppointmentStatus::Rejected)
            .await
    }

    async fn transition(
        &self,
        principal: &Principal,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error> {
        if principal.role != Role::Owner {
            return Err(Error::Forbidden(
                "Only owners can update appointments.".to_string(),
            ));
        }

        let appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Appointment {} not found", appointment_id)))?;

        if appointment.owner_id != principal.user_id {
            return Err(Error::Forbidden(
                "You are not authorised to modify this appointment.".to_string(),
            ));
        }

        if appointment.status.is_terminal() {
            return Err(Error::AlreadyProcessed(appointment.status.to_string()));
        }

        // Conditional update: of two concurrent transitions only one can
        // match the pending predicate.
        match self
            .appointments
            .set_status_if_pending(appointment_id, status)
            .await?
        {
            Some(updated) => {
                info!("appointment {} -> {}", appointment_id, status);
                Ok(updated)
            }
            None => {
                let current = self
                    .appointments
                    .get(appointment_id)
                    .await?
                    .ok_or_else(|| {
                        Error::NotFound(format!("Appointment {} not found", appointment_id))
                    })?;
                Err(Error::AlreadyProcessed(current.status.to_string()))
            }
        }
    }

    pub async fn my_appointments(
        &self,
        principal: &Principal,
        page: i64,
        limit: i64,
        status: Option<AppointmentStatus>,
    ) -> Result<Page<Appointment>, Error> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers can view their bookings.".to_string(),
            ));
        }

        let req = PageRequest::new(page, if limit > 0 { limit } else { 10 });
        let items = self
            .appointments
            .list_for_customer(principal.user_id, status, req.limit, req.offset())
            .await?;
        let total = self
            .appointments
            .count_for_customer(principal.user_id, status)
            .await?;

        Ok(Page {
            items,
            pagination: Pagination::new(total, req.page, req.limit),
        })
    }

    pub async fn received_appointments(
        &self,
        principal: &Principal,
        page: i64,
        limit: i64,
        status: Option<AppointmentStatus>,
    ) -> Result<Page<Appointment>, Error> {
        if principal.role != Role::Owner {
            return Err(Error::Forbidden(
                "Only owners can view received appointments.".to_string(),
            ));
        }

        let req = PageRequest::new(page, if limit > 0 { limit } else { 10 });
        let items = self
            .appointments
            .list_for_owner(principal.user_id, status, req.limit, req.offset())
            .await?;
        let total = self
            .appointments
            .count_for_owner(principal.user_id, status)
            .await?;

        Ok(Page {
            items,
            pagination: Pagination::new(total, req.page, req.limit),
        })
    }
}
