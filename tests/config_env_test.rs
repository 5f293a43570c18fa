//! Environment overrides live in their own test binary so the process-wide
//! variables can't leak into other configuration tests.

use fixturekit::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_environment_overrides_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(
        temp_dir.path().join("fixtures.toml"),
        r#"
[retry]
attempts = 5

[api]
timeout_secs = 30
"#,
    )?;

    std::env::set_var("FIXTURES__RETRY__ATTEMPTS", "7");
    std::env::set_var("FIXTURES__RESOURCE__ID_FIELD", "uuid");
    let settings = Settings::from_root(temp_dir.path().to_str().unwrap());
    std::env::remove_var("FIXTURES__RETRY__ATTEMPTS");
    std::env::remove_var("FIXTURES__RESOURCE__ID_FIELD");

    let settings = settings?;
    assert_eq!(settings.retry.attempts, 7);
    assert_eq!(settings.api.timeout_secs, 30);
    assert_eq!(settings.resource.id_field, "uuid");
    Ok(())
}
