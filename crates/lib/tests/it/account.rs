//! Sign-in/sign-up flows: validation, verbatim credential errors, and the
//! role-aware bootstrap on registration.

use sewaportal::dispatch::{View, select_view};
use sewaportal::portal::SignUpRequest;
use sewaportal::session::AuthProvider;
use sewaportal::user::Role;
use sewaportal::{Resolution, UserState};

use super::helpers::{citizen_sign_up, memory_portal};

#[tokio::test]
async fn citizen_sign_up_bootstraps_with_the_chosen_username() {
    let (portal, _auth, store) = memory_portal();

    portal
        .sign_up(citizen_sign_up("jane.doe@example.com", "janedoe"))
        .await
        .unwrap();

    // The chosen username wins over the email-derived default.
    let resolution = portal.resolve().await;
    let user = resolution.resolved().expect("signed-up user resolves");
    assert_eq!(user.user.username.as_deref(), Some("janedoe"));
    assert!(!user.user.is_employee);
    assert!(user.citizen.is_some());

    assert_eq!(store.user_row_count(), 1);
    assert_eq!(store.citizen_row_count(), 1);
    assert_eq!(store.employee_row_count(), 0);
    assert_eq!(
        select_view(&UserState::Ready(user.clone())),
        View::CitizenDashboard
    );
}

#[tokio::test]
async fn employee_sign_up_creates_an_employee_row() {
    let (portal, _auth, store) = memory_portal();

    portal
        .sign_up(SignUpRequest {
            email: "worker@example.com".to_string(),
            password: "secret123".to_string(),
            username: "worker1".to_string(),
            role: Role::Employee,
        })
        .await
        .unwrap();

    let resolution = portal.resolve().await;
    let user = resolution.resolved().unwrap();
    assert!(user.user.is_employee);
    assert!(user.employee.is_some());
    assert_eq!(user.citizen, None);

    assert_eq!(store.employee_row_count(), 1);
    assert_eq!(store.citizen_row_count(), 0);
    assert_eq!(
        select_view(&UserState::Ready(user.clone())),
        View::EmployeeDashboard
    );
}

#[tokio::test]
async fn wrong_password_surfaces_the_provider_message_verbatim() {
    let (portal, auth, _store) = memory_portal();
    auth.register("jane@example.com", "secret123");

    let err = portal
        .sign_in("jane@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(err.is_credential_error());
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[tokio::test]
async fn duplicate_registration_surfaces_the_provider_message_verbatim() {
    let (portal, _auth, _store) = memory_portal();
    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();

    let err = portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap_err();
    assert!(err.is_credential_error());
    assert_eq!(err.to_string(), "User already registered");
}

#[tokio::test]
async fn validation_rejects_bad_input_before_the_provider_is_involved() {
    let (portal, auth, _store) = memory_portal();

    let err = portal.sign_in("not-an-email", "whatever").await.unwrap_err();
    assert!(err.is_validation_error());

    let err = portal
        .sign_up(SignUpRequest {
            email: "jane@example.com".to_string(),
            password: "short".to_string(),
            username: "janedoe".to_string(),
            role: Role::Citizen,
        })
        .await
        .unwrap_err();
    assert!(err.is_validation_error());

    // Nothing reached the provider: no account, no session.
    assert_eq!(auth.session().await.unwrap(), None);
    let err = portal
        .sign_in("jane@example.com", "short")
        .await
        .unwrap_err();
    assert!(err.is_credential_error(), "account must not exist");
}

#[tokio::test]
async fn sign_up_survives_a_store_outage_and_self_heals_on_resolve() {
    let (portal, _auth, store) = memory_portal();

    // Registration succeeds even though the bootstrap inserts all fail.
    store.set_offline(true);
    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();
    assert_eq!(store.user_row_count(), 0);

    // Resolving while the store is down degrades, with a reason.
    assert!(matches!(
        portal.resolve().await,
        Resolution::Unavailable { .. }
    ));

    // Once the store recovers, the lazy bootstrap repairs the rows. The
    // username falls back to the email-derived default because the sign-up
    // time insert was lost.
    store.set_offline(false);
    let resolution = portal.resolve().await;
    let user = resolution.resolved().expect("self-healed");
    assert_eq!(user.user.username.as_deref(), Some("jane"));
    assert_eq!(store.user_row_count(), 1);
    assert_eq!(store.citizen_row_count(), 1);
}
