// File: rentora-core/tests/unit/appointment_tests.rs

use crate::helpers::*;
use chrono::NaiveDate;
use rentora_common::Error;
use rentora_common::models::appointment::AppointmentStatus;
use rentora_common::models::user::Role;

fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
}

#[tokio::test]
async fn booking_captures_the_owner_from_the_property() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    let appointment = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;

    assert_eq!(appointment.owner_id, owner.user_id);
    assert_eq!(appointment.customer_id, customer.user_id);
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn duplicate_pending_booking_is_rejected() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    ctx.appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;

    assert!(matches!(
        ctx.appointments
            .book(&customer, property.property_id, visit_date(), "11:00")
            .await,
        Err(Error::DuplicatePending)
    ));
    Ok(())
}

#[tokio::test]
async fn a_resolved_booking_frees_the_pending_slot() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    let first = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;
    ctx.appointments
        .reject(&owner, first.appointment_id)
        .await?;

    // No pending row remains, so a new booking is allowed.
    let second = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "14:00")
        .await?;
    assert_eq!(second.status, AppointmentStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn accept_and_reject_are_terminal() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    let appointment = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;

    let accepted = ctx
        .appointments
        .accept(&owner, appointment.appointment_id)
        .await?;
    assert_eq!(accepted.status, AppointmentStatus::Accepted);

    for attempt in [
        ctx.appointments.accept(&owner, appointment.appointment_id).await,
        ctx.appointments.reject(&owner, appointment.appointment_id).await,
    ] {
        match attempt {
            Err(Error::AlreadyProcessed(status)) => assert_eq!(status, "accepted"),
            other => panic!("expected AlreadyProcessed, got {:?}", other.is_ok()),
        }
    }
    Ok(())
}

#[tokio::test]
async fn only_the_captured_owner_may_transition() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let other_owner = seed_user(&ctx.store, "olga", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    let appointment = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;

    assert!(matches!(
        ctx.appointments
            .accept(&other_owner, appointment.appointment_id)
            .await,
        Err(Error::Forbidden(_))
    ));
    // The booking customer cannot resolve their own request either.
    assert!(matches!(
        ctx.appointments
            .accept(&customer, appointment.appointment_id)
            .await,
        Err(Error::Forbidden(_))
    ));

    // Still pending after the failed attempts.
    let accepted = ctx
        .appointments
        .accept(&owner, appointment.appointment_id)
        .await?;
    assert_eq!(accepted.status, AppointmentStatus::Accepted);
    Ok(())
}

#[tokio::test]
async fn concurrent_accept_and_reject_resolve_exactly_once() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    let appointment = ctx
        .appointments
        .book(&customer, property.property_id, visit_date(), "10:30")
        .await?;

    let h1 = {
        let svc = ctx.appointments.clone();
        let id = appointment.appointment_id;
        tokio::spawn(async move { svc.accept(&owner, id).await })
    };
    let h2 = {
        let svc = ctx.appointments.clone();
        let id = appointment.appointment_id;
        tokio::spawn(async move { svc.reject(&owner, id).await })
    };

    let r1 = h1.await.unwrap();
    let r2 = h2.await.unwrap();

    let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "pending can be resolved exactly once");
    for r in [r1, r2] {
        if let Err(e) = r {
            assert!(matches!(e, Error::AlreadyProcessed(_)));
        }
    }
    Ok(())
}

#[tokio::test]
async fn booking_requires_customer_role_and_existing_property() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);
    let property = seed_property(&ctx.store, owner.user_id);

    assert!(matches!(
        ctx.appointments
            .book(&owner, property.property_id, visit_date(), "10:30")
            .await,
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        ctx.appointments
            .book(&customer, uuid::Uuid::new_v4(), visit_date(), "10:30")
            .await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn appointment_queries_filter_by_status_and_paginate() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);

    for i in 0..5 {
        let property = seed_property(&ctx.store, owner.user_id);
        let appt = ctx
            .appointments
            .book(&customer, property.property_id, visit_date(), "09:00")
            .await?;
        if i < 2 {
            ctx.appointments.accept(&owner, appt.appointment_id).await?;
        }
    }

    let mine = ctx
        .appointments
        .my_appointments(&customer, 1, 10, Some(AppointmentStatus::Pending))
        .await?;
    assert_eq!(mine.pagination.total, 3);
    assert!(mine.items.iter().all(|a| a.status == AppointmentStatus::Pending));

    let received = ctx
        .appointments
        .received_appointments(&owner, 1, 2, None)
        .await?;
    assert_eq!(received.items.len(), 2);
    assert_eq!(received.pagination.total, 5);
    assert_eq!(received.pagination.total_pages, 3);

    // Query roles are enforced.
    assert!(matches!(
        ctx.appointments.my_appointments(&owner, 1, 10, None).await,
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        ctx.appointments
            .received_appointments(&customer, 1, 10, None)
            .await,
        Err(Error::Forbidden(_))
    ));
    Ok(())
}
