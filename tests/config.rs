use crs::config::{self, EngineKind};
use crs::{CrsError, Result};
use std::fs;
use tempfile::TempDir;

#[test]
fn engine_names_parse() {
    assert_eq!("indexed".parse::<EngineKind>().ok(), Some(EngineKind::Indexed));
    assert_eq!("named\n".parse::<EngineKind>().ok(), Some(EngineKind::Named));
    assert!(matches!("sled".parse::<EngineKind>(), Err(CrsError::Parsing(_))));
    for name in EngineKind::VARIANTS {
        let engine: EngineKind = name.parse().expect("variant names parse");
        assert_eq!(&engine.to_string(), name);
    }
}

#[test]
fn first_use_records_the_engine() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let data_dir = temp_dir.path().join("data");

    assert_eq!(config::current_engine(&data_dir)?, None);
    assert_eq!(config::resolve_engine(&data_dir, None)?, EngineKind::Indexed);
    assert_eq!(
        fs::read_to_string(data_dir.join(config::ENGINE_FILE))?,
        "indexed"
    );
    Ok(())
}

#[test]
fn recorded_engine_must_match() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let data_dir = temp_dir.path();

    assert_eq!(config::resolve_engine(data_dir, Some(EngineKind::Named))?, EngineKind::Named);
    assert_eq!(config::resolve_engine(data_dir, None)?, EngineKind::Named);
    assert_eq!(config::resolve_engine(data_dir, Some(EngineKind::Named))?, EngineKind::Named);
    assert!(matches!(
        config::resolve_engine(data_dir, Some(EngineKind::Indexed)),
        Err(CrsError::Parsing(_))
    ));
    Ok(())
}

#[test]
fn invalid_engine_file_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    fs::write(temp_dir.path().join(config::ENGINE_FILE), "garbage")?;

    assert_eq!(config::current_engine(temp_dir.path())?, None);
    assert_eq!(
        config::resolve_engine(temp_dir.path(), Some(EngineKind::Named))?,
        EngineKind::Named
    );
    assert_eq!(config::data_file(temp_dir.path()), temp_dir.path().join("clients.json"));
    Ok(())
}
