use clap::Parser;
use pagecraft::cli::Cli;
use pagecraft::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_file(temp_dir.path().join("pagecraft.toml"))?;

    assert_eq!(
        settings.designer.container_types,
        vec!["VerticalLayout", "HorizontalLayout", "Group", "Categorization", "Category"]
    );
    assert_eq!(settings.designer.checkable_types, vec!["Checkbox", "Toggle", "Switch"]);
    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("pagecraft.toml");

    let pagecraft_toml = r#"
[designer]
container_types = ["Panel", "Tabs"]
checkable_types = ["Tick"]
"#;
    fs::write(&path, pagecraft_toml)?;

    let settings = Settings::from_file(&path)?;
    let catalog = settings.container_catalog();

    assert!(catalog.is_container("Panel"));
    assert!(catalog.is_container("Tabs"));
    assert!(!catalog.is_container("VerticalLayout"));
    assert_eq!(settings.designer.checkable_types, vec!["Tick"]);
    Ok(())
}

#[test]
fn test_yaml_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("pagecraft.yaml");
    fs::write(&path, "designer:\n  container_types:\n    - Section\n")?;

    let settings = Settings::from_file(&path)?;
    assert!(settings.container_catalog().is_container("Section"));
    Ok(())
}

#[test]
fn test_invalid_file_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("pagecraft.toml");

    let pagecraft_toml = r#"
[designer]
container_types = [" "]

[logging]
level = "chatty"
"#;
    fs::write(&path, pagecraft_toml)?;

    let err = Settings::from_file(&path).unwrap_err().to_string();
    assert!(err.contains("Configuration validation failed"));
    assert!(err.contains("designer.container_types"));
    assert!(err.contains("logging.level"));
    Ok(())
}

#[test]
fn test_cli_overrides_file_then_validates() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("pagecraft.toml");
    fs::write(&path, "[logging]\nlevel = \"warn\"\n")?;
    let config = path.to_string_lossy().to_string();

    let cli = Cli::parse_from(["pagecraft", "--config", &config, "catalog", "--schema", "s.json"]);
    assert_eq!(Settings::new_with_cli(&cli)?.logging.level, "warn");

    let cli = Cli::parse_from([
        "pagecraft", "--config", &config, "--log-level", "debug", "catalog", "--schema", "s.json",
    ]);
    assert_eq!(Settings::new_with_cli(&cli)?.logging.level, "debug");

    let cli = Cli::parse_from([
        "pagecraft", "--config", &config, "--log-level", "chatty", "catalog", "--schema", "s.json",
    ]);
    let err = Settings::new_with_cli(&cli).unwrap_err().to_string();
    assert!(err.contains("logging.level"));
    Ok(())
}
