//! End-to-end tests for the f5xc-tfgen binary

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture_specs() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../f5xc-tfgen-core/tests/fixtures/specs")
}

/// Run the binary in `cwd` with logging kept quiet
fn run(cwd: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_f5xc-tfgen"))
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .context("Failed to run f5xc-tfgen")
}

#[test]
fn test_dry_run_prints_summary() -> Result<()> {
    let work = tempfile::tempdir()?;
    let specs = fixture_specs();

    let output = run(
        work.path(),
        &[
            "--spec-dir",
            specs.to_str().context("non UTF-8 fixture path")?,
            "--dry-run",
        ],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("2 generated, 3 skipped, 0 failed"));
    assert!(stdout.contains("[no-create-schema]"));
    assert!(stdout.contains("[parse-error]"));
    assert!(stdout.contains("[unsupported]"));
    assert!(stdout.contains("dry run, nothing written"));
    assert!(!work.path().join("internal").exists());
    Ok(())
}

#[test]
fn test_writes_into_requested_dirs() -> Result<()> {
    let work = tempfile::tempdir()?;
    let specs = fixture_specs();

    let output = run(
        work.path(),
        &[
            "--spec-dir",
            specs.to_str().context("non UTF-8 fixture path")?,
            "--output-dir",
            "gen/provider",
            "--client-dir",
            "gen/client",
        ],
    )?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(work.path().join("gen/provider/origin_pool_resource.go").is_file());
    assert!(work.path().join("gen/provider/origin_pool_data_source.go").is_file());
    assert!(work.path().join("gen/client/origin_pool_types.go").is_file());
    Ok(())
}

#[test]
fn test_strict_refs_reports_failure() -> Result<()> {
    let work = tempfile::tempdir()?;
    let specs = fixture_specs();

    let output = run(
        work.path(),
        &[
            "--spec-dir",
            specs.to_str().context("non UTF-8 fixture path")?,
            "--dry-run",
            "--strict-refs",
        ],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("failed http_loadbalancer"));
    assert!(stdout.contains("1 generated, 3 skipped, 1 failed"));
    Ok(())
}

#[test]
fn test_empty_spec_dir_exits_non_zero() -> Result<()> {
    let work = tempfile::tempdir()?;
    std::fs::create_dir(work.path().join("specs"))?;

    let output = run(work.path(), &["--spec-dir", "specs"])?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No spec files"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn test_missing_explicit_config_exits_non_zero() -> Result<()> {
    let work = tempfile::tempdir()?;

    let output = run(work.path(), &["--config", "absent.yaml"])?;

    assert!(!output.status.success());
    Ok(())
}

#[test]
fn test_write_config_then_reuse_it() -> Result<()> {
    let work = tempfile::tempdir()?;
    let specs = fixture_specs();

    let output = run(
        work.path(),
        &[
            "--spec-dir",
            specs.to_str().context("non UTF-8 fixture path")?,
            "--provider-name",
            "volterra",
            "--write-config",
            "f5xc-tfgen.yaml",
        ],
    )?;
    assert!(output.status.success());
    let saved = std::fs::read_to_string(work.path().join("f5xc-tfgen.yaml"))?;
    assert!(saved.contains("provider_name: volterra"));

    // picked up from the working directory without --config
    let output = run(work.path(), &["--dry-run"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("2 generated"));
    Ok(())
}
