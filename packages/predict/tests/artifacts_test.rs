//! Loads the fixture artifacts from disk in both layouts and runs the flow
//! end to end.

use penguin_predict::artifacts::{
    ISLAND_ENCODER_FILE, MODEL_FILE, SEX_ENCODER_FILE, SPECIES_ENCODER_FILE,
};
use penguin_predict::{
    ArtifactBundle, ArtifactLoadError, ArtifactLocation, CategoricalDecoder, CategoricalEncoder,
    FormSubmission, PredictionContext, load_context,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn directory_location() -> ArtifactLocation {
    ArtifactLocation::Directory(fixtures_root().join("artifacts"))
}

fn bundle_location() -> ArtifactLocation {
    ArtifactLocation::Bundle(fixtures_root().join("penguin_artifacts.json"))
}

fn torgersen_male() -> FormSubmission {
    FormSubmission {
        island: Some("Torgersen".into()),
        culmen_length_mm: Some("39.1".into()),
        culmen_depth_mm: Some("18.7".into()),
        flipper_length_mm: Some("181".into()),
        body_mass_g: Some("3750".into()),
        sex: Some("MALE".into()),
    }
}

/// Copies the directory-layout fixtures into a scratch dir, minus `skip`.
fn scratch_artifacts(skip: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in [
        MODEL_FILE,
        ISLAND_ENCODER_FILE,
        SEX_ENCODER_FILE,
        SPECIES_ENCODER_FILE,
    ] {
        if Some(file) == skip {
            continue;
        }
        std::fs::copy(
            fixtures_root().join("artifacts").join(file),
            dir.path().join(file),
        )
        .unwrap();
    }
    dir
}

#[test]
fn test_example_scenario_predicts_adelie() {
    let context = load_context(&directory_location()).unwrap();
    let submission = context.submit(&torgersen_male());
    let request = submission.request.as_ref().unwrap();
    assert_eq!(request.island, "Torgersen");

    let result = submission.outcome.unwrap();
    assert_eq!(result.species, "Adelie");
    assert_eq!(result.code, 0);
    assert!((result.confidence - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_every_combination_predicts_known_species() {
    let context = load_context(&directory_location()).unwrap();
    let species = context.species().vocabulary().to_vec();
    for island in context.island().vocabulary() {
        for sex in context.sex().vocabulary() {
            let mut form = torgersen_male();
            form.island = Some(island.clone());
            form.sex = Some(sex.clone());
            let result = context.submit(&form).outcome.unwrap();
            assert!(species.contains(&result.species), "{island}/{sex}");
        }
    }
}

#[test]
fn test_all_zero_measurements() {
    let context = load_context(&directory_location()).unwrap();
    for island in context.island().vocabulary() {
        let form = FormSubmission {
            island: Some(island.clone()),
            culmen_length_mm: Some("0.0".into()),
            culmen_depth_mm: Some("0.0".into()),
            flipper_length_mm: Some("0.0".into()),
            body_mass_g: Some("0.0".into()),
            sex: Some("FEMALE".into()),
        };
        let result = context.submit(&form).outcome.unwrap();
        assert!(context.species().vocabulary().contains(&result.species));
    }
}

#[test]
fn test_encoders_round_trip() {
    let context = load_context(&directory_location()).unwrap();
    for encoder in [context.island(), context.sex(), context.species()] {
        for class in encoder.vocabulary() {
            let code = encoder.encode(class).unwrap();
            assert_eq!(encoder.decode(code).unwrap(), class);
        }
    }
}

#[test]
fn test_corrupted_control_value_is_encoding_error() {
    let context = load_context(&directory_location()).unwrap();
    let mut form = torgersen_male();
    form.sex = Some("UNKNOWN".into());
    let submission = context.submit(&form);
    assert_eq!(submission.outcome_label(), "EncodingError");
    assert!(submission.outcome.is_err());
}

#[test]
fn test_bundle_matches_directory_layout() {
    let from_dir = load_context(&directory_location()).unwrap();
    let from_bundle = load_context(&bundle_location()).unwrap();
    assert_eq!(
        from_dir.island().vocabulary(),
        from_bundle.island().vocabulary()
    );
    assert_eq!(
        from_dir.submit(&torgersen_male()).outcome.unwrap(),
        from_bundle.submit(&torgersen_male()).outcome.unwrap()
    );
}

#[test]
fn test_messagepack_bundle_round_trip() {
    let bundle = ArtifactBundle::load(&bundle_location()).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("penguin_artifacts.msgpack");
    bundle.save(&path).unwrap();

    let context = load_context(&ArtifactLocation::Bundle(path)).unwrap();
    let result = context.submit(&torgersen_male()).outcome.unwrap();
    assert_eq!(result.species, "Adelie");
}

#[test]
fn test_missing_artifact_names_file() {
    let dir = scratch_artifacts(Some(SEX_ENCODER_FILE));
    let err = load_context(&ArtifactLocation::Directory(dir.path().to_path_buf())).unwrap_err();
    match &err {
        ArtifactLoadError::Missing { artifact, path } => {
            assert_eq!(*artifact, "sex_encoder");
            assert!(path.ends_with(SEX_ENCODER_FILE));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains(SEX_ENCODER_FILE));
}

#[test]
fn test_missing_directory() {
    let dir = TempDir::new().unwrap();
    let location = ArtifactLocation::Directory(dir.path().join("nope"));
    assert!(matches!(
        load_context(&location),
        Err(ArtifactLoadError::Missing { artifact: "model", .. })
    ));
}

#[test]
fn test_missing_bundle() {
    let location = ArtifactLocation::Bundle(PathBuf::from("/definitely/not/here.json"));
    assert!(matches!(
        load_context(&location),
        Err(ArtifactLoadError::Missing { artifact: "bundle", .. })
    ));
}

#[test]
fn test_corrupt_artifact() {
    let dir = scratch_artifacts(None);
    std::fs::write(dir.path().join(MODEL_FILE), b"{ not json").unwrap();
    let err = load_context(&ArtifactLocation::Directory(dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Corrupt { artifact: "model", .. }));
}

#[cfg(unix)]
#[test]
fn test_unreadable_artifact_is_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch_artifacts(None);
    let path = dir.path().join(ISLAND_ENCODER_FILE);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&path).is_ok() {
        // privileged users read through file modes
        return;
    }

    let err = load_context(&ArtifactLocation::Directory(dir.path().to_path_buf())).unwrap_err();
    match &err {
        ArtifactLoadError::Io { artifact, path, .. } => {
            assert_eq!(*artifact, "island_encoder");
            assert!(path.ends_with(ISLAND_ENCODER_FILE));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().starts_with("Failed to read artifact `island_encoder`"));
}

#[test]
fn test_save_into_missing_directory_is_io_error() {
    let bundle = ArtifactBundle::load(&bundle_location()).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("penguin_artifacts.json");
    let err = bundle.save(&path).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Io { artifact: "bundle", .. }));
    assert!(!path.exists());
}

#[test]
fn test_unknown_model_type_is_corrupt() {
    let dir = scratch_artifacts(None);
    std::fs::write(
        dir.path().join(MODEL_FILE),
        br#"{"type": "RandomForest", "trees": []}"#,
    )
    .unwrap();
    let err = load_context(&ArtifactLocation::Directory(dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Corrupt { .. }));
}

#[test]
fn test_inconsistent_species_encoder() {
    let dir = scratch_artifacts(None);
    std::fs::write(
        dir.path().join(SPECIES_ENCODER_FILE),
        br#"{"classes": ["Adelie"]}"#,
    )
    .unwrap();
    let err = load_context(&ArtifactLocation::Directory(dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Inconsistent(_)));
}

#[test]
fn test_context_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PredictionContext>();
}

#[test]
fn test_location_paths() {
    let paths = directory_location().paths();
    assert_eq!(paths.len(), 4);
    assert_eq!(paths[0].0, "model");
    assert_eq!(bundle_location().paths().len(), 1);
}
