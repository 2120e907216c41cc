mod common;

use crate::common::*;
use garden_tracker_lib::libs::config::StoreConfig;
use garden_tracker_lib::libs::uniffi::models::{PlantDetails, RequestCounts, UserType};
use garden_tracker_lib::{GardenApp, GardenError};
use std::sync::Arc;
use tempfile::TempDir;

fn open_app() -> (Arc<GardenApp>, TempDir) {
    let dir = TempDir::new().expect("Failed to create test directory");
    let app = GardenApp::open(test_config(&dir)).expect("Failed to open app");
    (app, dir)
}

fn usernames(users: Vec<garden_tracker_lib::libs::uniffi::models::User>) -> Vec<String> {
    users.into_iter().map(|u| u.username).collect()
}

#[test]
fn test_happy_path() {
    let (app, _dir) = open_app();

    let bob = app
        .register("bob".into(), "pw2".into(), "pw2".into())
        .unwrap();
    assert_eq!(bob.user_type, UserType::Current);
    app.logout();

    app.register("alice".into(), "pw1".into(), "pw1".into())
        .unwrap();
    app.send_friend_request("bob".into()).unwrap();
    assert_eq!(usernames(app.outgoing_requests().unwrap()), vec!["bob"]);
    app.logout();

    app.login("bob".into(), "pw2".into()).unwrap();
    assert_eq!(
        app.request_counts().unwrap(),
        RequestCounts {
            incoming: 1,
            outgoing: 0
        }
    );
    let incoming = app.incoming_requests().unwrap();
    assert_eq!(incoming[0].user_type, UserType::IncomingRequest);
    app.accept_friend_request("alice".into()).unwrap();

    let friends = app.friends().unwrap();
    assert_eq!(usernames(friends.clone()), vec!["alice"]);
    assert_eq!(friends[0].user_type, UserType::Friend);
    app.logout();

    app.login("alice".into(), "pw1".into()).unwrap();
    assert_eq!(usernames(app.friends().unwrap()), vec!["bob"]);
    assert!(app.outgoing_requests().unwrap().is_empty());

    app.remove_friend("bob".into()).unwrap();
    assert!(app.friends().unwrap().is_empty());
}

#[test]
fn register_signs_in_and_rejects_mismatched_confirmation() {
    let (app, _dir) = open_app();

    assert!(matches!(
        app.register("carol".into(), "pw".into(), "pw?".into()),
        Err(GardenError::SecretMismatch)
    ));
    assert!(app.current_user().is_none());

    app.register("carol".into(), "pw".into(), "pw".into())
        .unwrap();
    assert_eq!(app.current_user().unwrap().username, "carol");

    let duplicate = app
        .register("carol".into(), "x".into(), "x".into())
        .unwrap_err();
    assert!(matches!(duplicate, GardenError::DuplicateName));
    assert_eq!(duplicate.to_string(), "Username already exists");
}

#[test]
fn failed_login_keeps_session_empty() {
    let (app, _dir) = open_app();
    app.register("dave".into(), "pw".into(), "pw".into())
        .unwrap();
    app.logout();

    let err = app.login("dave".into(), "nope".into()).unwrap_err();
    assert!(matches!(err, GardenError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(app.current_user().is_none());
}

#[test]
fn signed_out_calls_are_refused() {
    let (app, _dir) = open_app();

    assert!(matches!(app.friends(), Err(GardenError::NotSignedIn)));
    assert!(matches!(
        app.send_friend_request("anyone".into()),
        Err(GardenError::NotSignedIn)
    ));
    assert!(matches!(app.plants(false), Err(GardenError::NotSignedIn)));
}

#[test]
fn friend_request_status_messages() {
    let (app, _dir) = open_app();
    app.register("erin".into(), "pw".into(), "pw".into())
        .unwrap();

    let err = app.send_friend_request("ghost".into()).unwrap_err();
    assert_eq!(err.to_string(), "User does not exist");

    let err = app.send_friend_request("  ".into()).unwrap_err();
    assert_eq!(err.to_string(), "Enter a username");

    let err = app.send_friend_request("erin".into()).unwrap_err();
    assert!(matches!(err, GardenError::SelfRequest));

    let err = app.cancel_friend_request("erin".into()).unwrap_err();
    assert!(matches!(err, GardenError::NotFound(_)));
    assert!(!err.is_retryable());
}

#[test]
fn change_secret_requires_confirmation_and_old_secret() {
    let (app, _dir) = open_app();
    app.register("fay".into(), "old".into(), "old".into())
        .unwrap();

    assert!(matches!(
        app.change_secret("old".into(), "new".into(), "typo".into()),
        Err(GardenError::SecretMismatch)
    ));
    assert!(matches!(
        app.change_secret("wrong".into(), "new".into(), "new".into()),
        Err(GardenError::InvalidCredentials)
    ));
    app.change_secret("old".into(), "new".into(), "new".into())
        .unwrap();

    app.logout();
    assert!(app.login("fay".into(), "old".into()).is_err());
    app.login("fay".into(), "new".into()).unwrap();
}

#[test]
fn plant_journal_through_the_session() {
    let (app, _dir) = open_app();
    app.register("gus".into(), "pw".into(), "pw".into())
        .unwrap();

    let plant = app
        .add_plant(PlantDetails {
            name: "Lavender".into(),
            age: "1 year".into(),
            shade: false,
            notes: "by the gate".into(),
            photo: None,
        })
        .unwrap();
    assert!(!plant.archived);

    let updated = app
        .update_plant(
            plant.plant_id.clone(),
            PlantDetails {
                name: "Lavender".into(),
                age: "2 years".into(),
                shade: true,
                notes: "by the gate".into(),
                photo: Some("lavender.jpg".into()),
            },
        )
        .unwrap();
    assert_eq!(app.plant(plant.plant_id.clone()).unwrap(), updated);

    app.archive_plant(plant.plant_id.clone()).unwrap();
    assert!(app.plants(false).unwrap().is_empty());
    assert_eq!(app.plants(true).unwrap().len(), 1);
    app.unarchive_plant(plant.plant_id.clone()).unwrap();

    app.delete_plant(plant.plant_id.clone()).unwrap();
    assert!(app.plants(false).unwrap().is_empty());

    assert!(matches!(
        app.delete_plant("not-an-id".into()),
        Err(GardenError::NotFound(_))
    ));
}

#[test]
fn relationship_with_reports_each_side() {
    let (app, _dir) = open_app();
    app.register("hana".into(), "pw".into(), "pw".into())
        .unwrap();
    app.logout();
    app.register("ivan".into(), "pw".into(), "pw".into())
        .unwrap();

    assert_eq!(app.relationship_with("hana".into()).unwrap(), None);
    assert_eq!(app.relationship_with("ivan".into()).unwrap(), None);

    app.send_friend_request("hana".into()).unwrap();
    assert_eq!(
        app.relationship_with("hana".into()).unwrap(),
        Some(UserType::OutgoingRequest)
    );
    app.logout();

    app.login("hana".into(), "pw".into()).unwrap();
    assert_eq!(
        app.relationship_with("ivan".into()).unwrap(),
        Some(UserType::IncomingRequest)
    );
    app.accept_friend_request("ivan".into()).unwrap();
    assert_eq!(
        app.relationship_with("ivan".into()).unwrap(),
        Some(UserType::Friend)
    );

    assert!(matches!(
        app.relationship_with("nobody".into()),
        Err(GardenError::UnknownUser)
    ));
}

#[test]
fn unopenable_database_is_a_storage_error() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("no-such-dir").join("garden.db");
    let config = StoreConfig::new(db_path.to_string_lossy().into_owned()).with_busy_timeout_ms(500);

    let err = GardenApp::open(config).err().expect("open should fail");
    assert!(matches!(err, GardenError::Storage(_)));
    assert!(!err.is_retryable());
}
