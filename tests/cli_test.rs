//! Command dispatch against a JSON store in a temp dir

use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use saurieng::cli::{execute_command, Cli};
use saurieng::config::Settings;
use saurieng::domain::Cell;
use saurieng::exitcode;
use saurieng::infrastructure::di::ServiceContainer;
use saurieng::util::testing::init_test_setup;

/// Temp dir with a config pointing the JSON store and uploads into it.
fn workspace() -> (TempDir, PathBuf) {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("saurieng.toml");
    std::fs::write(
        &config,
        format!(
            "backend = \"json\"\ndata_dir = \"{}\"\nuploads_dir = \"{}\"\n",
            temp.path().join("data").display(),
            temp.path().join("uploads").display()
        ),
    )
    .unwrap();
    (temp, config)
}

fn run(config: &Path, args: &[&str]) -> Result<(), i32> {
    let mut argv = vec!["saurieng".to_string(), "-c".into(), config.display().to_string()];
    argv.extend(args.iter().map(|a| a.to_string()));
    let cli = Cli::try_parse_from(argv).unwrap();
    execute_command(&cli).map_err(|e| e.exit_code())
}

#[test]
fn given_commands_when_creating_and_upserting_then_store_reflects_them() {
    // Arrange
    let (temp, config) = workspace();
    let photo = temp.path().join("leaf.jpg");
    std::fs::write(&photo, b"jpeg").unwrap();

    // Act
    run(&config, &["garden", "create", "A", "3", "3"]).unwrap();
    run(
        &config,
        &[
            "tree",
            "upsert",
            "A",
            "1",
            "2",
            "--variety",
            "Ri6",
            "--image",
            "/uploads/kept.png",
            "--new-image",
            photo.to_str().unwrap(),
            "--harvest",
            r#"[{"kg": 7}]"#,
        ],
    )
    .unwrap();

    // Assert
    let container = ServiceContainer::new(Settings::load(Some(&config)).unwrap()).unwrap();
    let gardens = container.gardens.list_gardens().unwrap();
    let tree = gardens[0].tree_at(Cell::new(1, 2)).unwrap();
    assert_eq!(tree.variety, "Ri6");
    assert_eq!(tree.images.len(), 2);
    assert_eq!(tree.images[0], "/uploads/kept.png");
    assert!(tree.images[1].ends_with("-leaf.jpg"));
    assert_eq!(tree.harvest_info.len(), 1);
}

#[test]
fn given_duplicate_garden_when_creating_then_dataerr_exit_code() {
    let (_temp, config) = workspace();
    run(&config, &["garden", "create", "A", "3", "3"]).unwrap();

    let result = run(&config, &["garden", "create", "A", "3", "3"]);

    assert_eq!(result, Err(exitcode::DATAERR));
}

#[test]
fn given_bad_harvest_json_when_upserting_then_usage_exit_code() {
    let (_temp, config) = workspace();
    run(&config, &["garden", "create", "A", "3", "3"]).unwrap();

    let result = run(&config, &["tree", "upsert", "A", "1", "1", "--harvest", "{oops"]);

    assert_eq!(result, Err(exitcode::USAGE));
}

#[test]
fn given_seed_and_backup_when_running_then_archive_written() {
    let (temp, config) = workspace();
    let target = temp.path().join("backup.zip");

    run(&config, &["seed"]).unwrap();
    run(&config, &["backup", "-o", target.to_str().unwrap()]).unwrap();

    assert!(target.exists());
    run(&config, &["grouped", "Vườn Mẫu"]).unwrap();
    run(&config, &["garden", "delete", "Vườn Mẫu"]).unwrap();
    assert_eq!(
        run(&config, &["grouped", "Vườn Mẫu"]),
        Err(exitcode::DATAERR)
    );
}
