mod common;

use crate::common::*;
use garden_tracker_lib::libs::core::models::{PlantId, UserId};
use garden_tracker_lib::libs::storage::database::storage_traits::StoreError;
use garden_tracker_lib::libs::storage::records::PlantDraft;

fn draft(name: &str, notes: &str) -> PlantDraft {
    PlantDraft {
        name: name.to_string(),
        age: "3 months".to_string(),
        shade: false,
        notes: notes.to_string(),
        photo: None,
    }
}

#[test]
fn add_and_list_plants_newest_first() {
    let store = open_test_store();
    let owner = register(&store, "gardener");

    let basil = store.add_plant(&owner, draft("Basil", "kitchen")).unwrap();
    let fern = store.add_plant(&owner, draft("Fern", "porch")).unwrap();

    let names: Vec<String> = store
        .list_plants(&owner, false)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Fern".to_string(), "Basil".to_string()]);

    assert_eq!(store.load_plant(&owner, &basil.plant_id).unwrap(), basil);
    assert_eq!(store.load_plant(&owner, &fern.plant_id).unwrap().notes, "porch");
    assert!(store.list_plants(&owner, true).unwrap().is_empty());
}

#[test]
fn duplicate_name_and_notes_are_rejected() {
    let store = open_test_store();
    let owner = register(&store, "gardener");

    store.add_plant(&owner, draft("Basil", "kitchen")).unwrap();
    assert!(matches!(
        store.add_plant(&owner, draft("Basil", "kitchen")),
        Err(StoreError::DuplicatePlant)
    ));

    // same name with different notes is a different plant
    store.add_plant(&owner, draft("Basil", "balcony")).unwrap();
    assert_eq!(store.list_plants(&owner, false).unwrap().len(), 2);
}

#[test]
fn update_changes_fields_and_keeps_identity() {
    let store = open_test_store();
    let owner = register(&store, "gardener");
    let plant = store.add_plant(&owner, draft("Basil", "kitchen")).unwrap();

    let updated = store
        .update_plant(
            &owner,
            &plant.plant_id,
            PlantDraft {
                name: "Thai basil".to_string(),
                age: "4 months".to_string(),
                shade: true,
                notes: "moved outside".to_string(),
                photo: Some("/photos/basil.png".to_string()),
            },
        )
        .unwrap();

    assert_eq!(updated.plant_id, plant.plant_id);
    assert_eq!(updated.created_at, plant.created_at);
    let loaded = store.load_plant(&owner, &plant.plant_id).unwrap();
    assert_eq!(loaded, updated);
    assert!(loaded.shade);
    assert_eq!(loaded.photo.as_deref(), Some("/photos/basil.png"));
}

#[test]
fn update_into_an_existing_plant_is_a_duplicate() {
    let store = open_test_store();
    let owner = register(&store, "gardener");
    store.add_plant(&owner, draft("Basil", "kitchen")).unwrap();
    let mint = store.add_plant(&owner, draft("Mint", "kitchen")).unwrap();

    assert!(matches!(
        store.update_plant(&owner, &mint.plant_id, draft("Basil", "kitchen")),
        Err(StoreError::DuplicatePlant)
    ));
    assert_eq!(store.load_plant(&owner, &mint.plant_id).unwrap().name, "Mint");
}

#[test]
fn archive_moves_between_lists() {
    let store = open_test_store();
    let owner = register(&store, "gardener");
    let plant = store.add_plant(&owner, draft("Tomato", "")).unwrap();

    store.set_archived(&owner, &plant.plant_id, true).unwrap();
    assert!(store.list_plants(&owner, false).unwrap().is_empty());
    let archived = store.list_plants(&owner, true).unwrap();
    assert_eq!(archived.len(), 1);
    assert!(archived[0].archived);

    store.set_archived(&owner, &plant.plant_id, false).unwrap();
    assert_eq!(store.list_plants(&owner, false).unwrap().len(), 1);
    assert!(store.list_plants(&owner, true).unwrap().is_empty());
}

#[test]
fn delete_removes_the_plant() {
    let store = open_test_store();
    let owner = register(&store, "gardener");
    let plant = store.add_plant(&owner, draft("Tomato", "")).unwrap();

    store.delete_plant(&owner, &plant.plant_id).unwrap();
    assert!(matches!(
        store.load_plant(&owner, &plant.plant_id),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_plant(&owner, &plant.plant_id),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn plants_are_private_to_their_owner() {
    let store = open_test_store();
    let owner = register(&store, "gardener");
    let neighbour = register(&store, "neighbour");
    let plant = store.add_plant(&owner, draft("Rose", "fence")).unwrap();

    assert!(store.list_plants(&neighbour, false).unwrap().is_empty());
    assert!(matches!(
        store.load_plant(&neighbour, &plant.plant_id),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.update_plant(&neighbour, &plant.plant_id, draft("Weed", "")),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.set_archived(&neighbour, &plant.plant_id, true),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_plant(&neighbour, &plant.plant_id),
        Err(StoreError::NotFound(_))
    ));

    // neighbour may keep a plant with the same name and notes
    store.add_plant(&neighbour, draft("Rose", "fence")).unwrap();
    assert_eq!(store.list_plants(&owner, false).unwrap().len(), 1);
}

#[test]
fn unknown_plant_and_owner_are_reported() {
    let store = open_test_store();
    let owner = register(&store, "gardener");

    assert!(matches!(
        store.set_archived(&owner, &PlantId::generate(), true),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.add_plant(&UserId::generate(), draft("Ivy", "")),
        Err(StoreError::UnknownUser(_))
    ));
    assert!(matches!(
        store.add_plant(&owner, draft("   ", "")),
        Err(StoreError::InvalidInput(_))
    ));
}
