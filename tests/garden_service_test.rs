//! GardenService behavior, run against every store adapter

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use saurieng::application::ApplicationError;
use saurieng::config::StorageBackend;
use saurieng::domain::seed::{SAMPLE_GARDEN_NAME, SAMPLE_GARDEN_SIZE};
use saurieng::domain::{Cell, DomainError, TreeFields, UNKNOWN_STATUS};
use saurieng::infrastructure::di::ServiceContainer;
use saurieng::util::testing::{init_test_setup, settings_in};

/// Container over a fresh store rooted in its own temp dir.
fn container(backend: StorageBackend) -> (TempDir, ServiceContainer) {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(settings_in(temp.path(), backend)).unwrap();
    (temp, container)
}

fn fields(variety: &str, status: &str) -> TreeFields {
    TreeFields {
        variety: Some(variety.to_string()),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_existing_name_when_creating_garden_then_conflict_and_original_untouched(
    #[case] backend: StorageBackend,
) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 3, 4).unwrap();

    // Act
    let result = c.gardens.create_garden("A", 9, 9);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Conflict(name)) if name == "A"));
    let gardens = c.gardens.list_gardens().unwrap();
    assert_eq!(gardens.len(), 1);
    assert_eq!((gardens[0].rows, gardens[0].cols), (3, 4));
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_padded_name_when_creating_garden_then_name_is_its_own_key(
    #[case] backend: StorageBackend,
) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("B", 2, 2).unwrap();

    // Act
    let padded = c.gardens.create_garden(" B ", 2, 2).unwrap();

    // Assert
    assert_eq!(padded.name, " B ");
    c.gardens.delete_garden(" B ").unwrap();
    let names: Vec<_> = c
        .gardens
        .list_gardens()
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["B".to_string()]);
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_invalid_input_when_creating_garden_then_validation_error(
    #[case] backend: StorageBackend,
) {
    let (_temp, c) = container(backend);

    let empty = c.gardens.create_garden("   ", 3, 3);
    let zero = c.gardens.create_garden("B", 0, 3);

    assert!(matches!(
        empty,
        Err(ApplicationError::Domain(DomainError::EmptyGardenName))
    ));
    assert!(matches!(
        zero,
        Err(ApplicationError::Domain(DomainError::InvalidDimensions { .. }))
    ));
    assert!(c.gardens.list_gardens().unwrap().is_empty());
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_two_upserts_when_listing_then_only_second_state_is_stored(
    #[case] backend: StorageBackend,
) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 5, 5).unwrap();
    let cell = Cell::new(1, 1);
    let first = TreeFields {
        notes: Some("bón phân".into()),
        harvest_info: vec![json!({"kg": 12})],
        ..fields("Ri6", "Khỏe mạnh")
    };

    // Act
    let created = c.gardens.upsert_tree("A", cell, first).unwrap();
    let replaced = c
        .gardens
        .upsert_tree("A", cell, fields("Musang King", ""))
        .unwrap();

    // Assert - every scalar replaced, missing ones emptied
    let gardens = c.gardens.list_gardens().unwrap();
    assert_eq!(gardens[0].trees.len(), 1);
    let stored = gardens[0].tree_at(cell).unwrap();
    assert_eq!(stored.variety, "Musang King");
    assert_eq!(stored.status, "");
    assert_eq!(stored.notes, "");
    assert!(stored.harvest_info.is_empty());
    assert_eq!(stored, &replaced);
    // Assert - creation time survives the replacement
    assert_eq!(replaced.created_at, created.created_at);
    assert!(replaced.updated_at >= created.updated_at);
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_kept_image_and_new_upload_when_upserting_then_kept_first_then_new(
    #[case] backend: StorageBackend,
) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 5, 5).unwrap();
    let uploaded = c.uploads.store("b.png", b"png bytes").unwrap();

    // Act
    let tree = c
        .gardens
        .upsert_tree(
            "A",
            Cell::new(2, 2),
            TreeFields {
                existing_images: vec!["/uploads/a.png".into()],
                new_images: vec![uploaded.clone()],
                ..Default::default()
            },
        )
        .unwrap();

    // Assert
    assert_eq!(tree.images, vec!["/uploads/a.png".to_string(), uploaded.clone()]);
    assert!(uploaded.starts_with("/uploads/"));
    assert!(uploaded.ends_with("-b.png"));
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_no_kept_images_when_upserting_then_only_new_uploads_remain(
    #[case] backend: StorageBackend,
) {
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 5, 5).unwrap();
    let cell = Cell::new(1, 2);
    c.gardens
        .upsert_tree(
            "A",
            cell,
            TreeFields {
                existing_images: vec!["/uploads/old.png".into()],
                ..Default::default()
            },
        )
        .unwrap();
    let new_images = vec![
        c.uploads.store("x.jpg", b"x").unwrap(),
        c.uploads.store("y.jpg", b"y").unwrap(),
    ];

    let tree = c
        .gardens
        .upsert_tree(
            "A",
            cell,
            TreeFields {
                existing_images: vec![],
                new_images: new_images.clone(),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(tree.images, new_images);
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_mixed_statuses_when_grouping_then_unknown_group_last(#[case] backend: StorageBackend) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 5, 5).unwrap();
    c.gardens
        .upsert_tree("A", Cell::new(1, 1), fields("Ri6", "Healthy"))
        .unwrap();
    c.gardens
        .upsert_tree("A", Cell::new(1, 2), fields("Ri6", "Diseased"))
        .unwrap();
    c.gardens
        .upsert_tree("A", Cell::new(1, 3), fields("Ri6", "  "))
        .unwrap();

    // Act
    let groups = c.gardens.group_by_status("A").unwrap();

    // Assert
    let labels: Vec<_> = groups.labels().collect();
    assert_eq!(labels, vec!["Healthy", "Diseased", UNKNOWN_STATUS]);
    assert_eq!(groups.get(UNKNOWN_STATUS).unwrap().len(), 1);
    assert_eq!(groups.get("Healthy").unwrap()[0].cell(), Cell::new(1, 1));
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_unknown_garden_when_operating_then_not_found(#[case] backend: StorageBackend) {
    let (_temp, c) = container(backend);

    let deleted = c.gardens.delete_garden("nope");
    let upserted = c
        .gardens
        .upsert_tree("nope", Cell::new(1, 1), TreeFields::default());
    let grouped = c.gardens.group_by_status("nope");

    assert!(matches!(deleted, Err(ApplicationError::NotFound(_))));
    assert!(matches!(upserted, Err(ApplicationError::NotFound(_))));
    assert!(matches!(grouped, Err(ApplicationError::NotFound(_))));
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_garden_with_trees_when_deleting_then_garden_and_trees_are_gone(
    #[case] backend: StorageBackend,
) {
    // Arrange
    let (_temp, c) = container(backend);
    c.gardens.create_garden("A", 5, 5).unwrap();
    c.gardens.create_garden("B", 2, 2).unwrap();
    c.gardens
        .upsert_tree("A", Cell::new(1, 1), fields("Ri6", "Healthy"))
        .unwrap();

    // Act
    c.gardens.delete_garden("A").unwrap();

    // Assert
    let names: Vec<_> = c
        .gardens
        .list_gardens()
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["B".to_string()]);

    // Assert - a garden re-created under the same name starts empty
    c.gardens.create_garden("A", 5, 5).unwrap();
    assert!(c.gardens.group_by_status("A").unwrap().is_empty());
    assert_eq!(c.gardens.stats().unwrap().trees, 0);
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_several_gardens_when_listing_then_newest_first(#[case] backend: StorageBackend) {
    let (_temp, c) = container(backend);
    c.gardens.create_garden("first", 1, 1).unwrap();
    c.gardens.create_garden("second", 1, 1).unwrap();

    let names: Vec<_> = c
        .gardens
        .list_gardens()
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();

    assert_eq!(names, vec!["second".to_string(), "first".to_string()]);
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_empty_store_when_seeding_then_sample_garden_created(#[case] backend: StorageBackend) {
    // Arrange
    let (_temp, c) = container(backend);

    // Act
    let seeded = c.gardens.seed_if_empty().unwrap();

    // Assert
    assert!(seeded);
    let gardens = c.gardens.list_gardens().unwrap();
    assert_eq!(gardens.len(), 1);
    let sample = &gardens[0];
    assert_eq!(sample.name, SAMPLE_GARDEN_NAME);
    assert_eq!((sample.rows, sample.cols), (SAMPLE_GARDEN_SIZE, SAMPLE_GARDEN_SIZE));
    assert_eq!(sample.trees.len(), 3);
    let healthy = sample.tree_at(Cell::new(1, 1)).unwrap();
    assert_eq!((healthy.status.as_str(), healthy.variety.as_str()), ("Khỏe mạnh", "Ri6"));
    let sick = sample.tree_at(Cell::new(2, 2)).unwrap();
    assert_eq!((sick.status.as_str(), sick.variety.as_str()), ("Sâu bệnh", "Ri6"));
    let young = sample.tree_at(Cell::new(3, 3)).unwrap();
    assert_eq!(
        (young.status.as_str(), young.variety.as_str()),
        ("Mới trồng", "Chín Thơm")
    );
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_existing_garden_when_seeding_then_noop(#[case] backend: StorageBackend) {
    let (_temp, c) = container(backend);
    c.gardens.create_garden("mine", 2, 2).unwrap();

    let seeded = c.gardens.seed_if_empty().unwrap();

    assert!(!seeded);
    let gardens = c.gardens.list_gardens().unwrap();
    assert_eq!(gardens.len(), 1);
    assert_eq!(gardens[0].name, "mine");
}

#[rstest]
#[case::json(StorageBackend::Json)]
#[case::sqlite(StorageBackend::Sqlite)]
fn given_persistent_backend_when_reopening_then_state_survives(#[case] backend: StorageBackend) {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    {
        let c = ServiceContainer::new(settings_in(temp.path(), backend)).unwrap();
        c.gardens.create_garden("A", 5, 5).unwrap();
        c.gardens
            .upsert_tree(
                "A",
                Cell::new(4, 5),
                TreeFields {
                    harvest_info: vec![json!({"date": "2024-06-01", "kg": 30})],
                    ..fields("Ri6", "Healthy")
                },
            )
            .unwrap();
    }

    // Act
    let c = ServiceContainer::new(settings_in(temp.path(), backend)).unwrap();

    // Assert
    let gardens = c.gardens.list_gardens().unwrap();
    let tree = gardens[0].tree_at(Cell::new(4, 5)).unwrap();
    assert_eq!(tree.variety, "Ri6");
    assert_eq!(tree.harvest_info, vec![json!({"date": "2024-06-01", "kg": 30})]);
    assert_eq!(c.gardens.backend(), c.store.backend());
}
