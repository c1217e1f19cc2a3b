use camino::Utf8PathBuf;
use spark_app_core::{AppSettings, FilePersistence, StudentProfile};

fn temp_store() -> (tempfile::TempDir, FilePersistence) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("config")).unwrap();
    (dir, FilePersistence::with_root(root))
}

#[test]
fn missing_files_load_defaults() {
    let (_dir, store) = temp_store();
    assert_eq!(store.load_profile().unwrap(), StudentProfile::default());
    assert_eq!(
        store.load_settings().unwrap().server_url,
        spark_config::DEFAULT_SERVER_URL
    );
}

#[test]
fn profile_and_settings_survive_a_reload() {
    let (_dir, store) = temp_store();
    let profile = StudentProfile {
        name: "Grace".into(),
        major: "Software Engineering".into(),
        courses_taken: vec!["CS 1337".into()],
        career_goal: "Backend engineer".into(),
        ..Default::default()
    };
    store.save_profile(&profile).unwrap();
    store
        .save_settings(&AppSettings {
            server_url: "http://planner.local:9000".into(),
        })
        .unwrap();

    // Overwrite goes through the same atomic path.
    store.save_profile(&profile).unwrap();

    assert_eq!(store.load_profile().unwrap(), profile);
    assert_eq!(
        store.load_settings().unwrap().server_url,
        "http://planner.local:9000"
    );
    assert!(!store.profile_path().unwrap().with_extension("json.tmp").exists());
}

#[test]
fn older_files_with_missing_fields_still_load() {
    let (_dir, store) = temp_store();
    std::fs::write(store.profile_path().unwrap(), r#"{"name": "Lin"}"#).unwrap();
    std::fs::write(store.settings_path().unwrap(), "{}").unwrap();

    assert_eq!(store.load_profile().unwrap().name, "Lin");
    assert_eq!(
        store.load_settings().unwrap(),
        AppSettings::default()
    );
}

#[test]
fn corrupt_profile_is_an_error() {
    let (_dir, store) = temp_store();
    std::fs::write(store.profile_path().unwrap(), "not json").unwrap();
    let err = store.load_profile().unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse profile"));
}
