//! CLI integration tests for titta-build.
//!
//! These tests run the configurator commands with explicit platforms and
//! compiler families, so they need neither a compiler nor Python.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the titta-build binary command, isolated from user configuration.
fn titta_build(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("titta-build").unwrap();
    cmd.current_dir(home.path())
        .env("TITTA_HOME", home.path().join("global"))
        .env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .env_remove("TITTA_PLATFORM");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

// ============================================================================
// titta-build flags
// ============================================================================

#[test]
fn test_flags_linux_compile() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args(["flags", "--platform", "linux", "--compile"]));

    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "-DBUILD_FROM_SCRIPT",
            "-DNDEBUG",
            "-std=c++2a",
            "-O3",
            "-fvisibility=hidden",
            "-ffunction-sections",
            "-fdata-sections",
            "-flto",
            "-DVERSION_INFO=\"1.0.0rc1\"",
        ]
    );
}

#[test]
fn test_flags_darwin_link() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args(["flags", "--platform", "darwin", "--link"]));

    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "-flto",
            "-ltobii_research",
            "-L./TittaMex/64/OSX/",
            "-Wl,-rpath,@loader_path",
            "-dead_strip",
        ]
    );
}

#[test]
fn test_flags_windows_defaults_to_msvc() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args(["flags", "--platform", "win32", "--compile"]));

    assert!(stdout.lines().next() == Some("/DBUILD_FROM_SCRIPT"));
    assert!(stdout.contains("/std:c++latest"));
    assert!(stdout.lines().last() == Some("/DVERSION_INFO=\"1.0.0rc1\""));
    assert!(!stdout.contains("-O3"));
}

#[test]
fn test_flags_family_override() {
    let tmp = temp_dir();

    // The Unix table on Windows is the non-mac table
    let stdout = stdout_of(titta_build(&tmp).args([
        "flags",
        "--platform",
        "windows",
        "--family",
        "unix",
        "--link",
    ]));

    assert!(stdout.contains("-L./TittaMex/64/Linux/"));
    assert!(stdout.contains("-Wl,--gc-sections"));
}

#[test]
fn test_flags_summary_shows_both_sections() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["flags", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Compile flags for `TittaPy`"))
        .stdout(predicate::str::contains("# Link flags for `TittaPy`"));
}

#[test]
fn test_flags_tobii_wrapper_visibility_after_version() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args([
        "flags",
        "--platform",
        "linux",
        "--profile",
        "tobii-wrapper",
        "--compile",
    ]));

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.last(), Some(&"-fvisibility=hidden"));
    assert_eq!(lines[lines.len() - 2], "-DVERSION_INFO=\"1.0.0-rc1\"");
}

#[test]
fn test_flags_titta_mex_linux_link() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args([
        "flags",
        "--platform",
        "linux",
        "--profile",
        "titta-mex",
        "--link",
    ]));

    assert_eq!(stdout, "-Wl,-rpath,$ORIGIN\n");
}

#[test]
fn test_flags_titta_mex_msvc_escapes_version() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args([
        "flags",
        "--platform",
        "win32",
        "--profile",
        "titta-mex",
        "--compile",
    ]));

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[0], "/DBUILD_FROM_SCRIPT");
    assert_eq!(lines[13], "/O2");
    assert_eq!(lines[14], "/DVERSION_INFO=\\\"1.0.0-rc1\\\"");
}

// ============================================================================
// titta-build data-files
// ============================================================================

#[test]
fn test_data_files_per_platform() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["data-files", "--platform", "win32"])
        .assert()
        .success()
        .stdout("lib\\site-packages\t./TittaMex/64/Windows/tobii_research.dll\n");

    titta_build(&tmp)
        .args(["data-files", "--platform", "darwin"])
        .assert()
        .success()
        .stdout("lib/site-packages/\t./TittaMex/64/OSX/libtobii_research.1.10.1.dylib\n");

    titta_build(&tmp)
        .args(["data-files", "--platform", "linux"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No data files"));
}

#[test]
fn test_data_files_titta_mex_every_platform() {
    let tmp = temp_dir();

    for platform in ["win32", "linux", "darwin"] {
        titta_build(&tmp)
            .args(["data-files", "--profile", "titta-mex", "--platform", platform])
            .assert()
            .success()
            .stdout("lib\\site-packages\\\t./TittaMex_matlab/64/Windows/tobii_research.dll\n");
    }
}

// ============================================================================
// titta-build configure
// ============================================================================

#[test]
fn test_configure_json() {
    let tmp = temp_dir();

    let stdout = stdout_of(titta_build(&tmp).args(["configure", "--platform", "linux", "--json"]));
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["settings"]["platform"], "linux");
    assert_eq!(json["settings"]["family"], "unix");
    assert_eq!(json["metadata"]["name"], "TittaPy");
    assert_eq!(json["extension"]["name"], "TittaPy");
    assert_eq!(json["extension"]["sources"][0], "src/Titta.cpp");
    assert_eq!(json["extension"]["library_dirs"][0], "deps/lib");
    assert!(json["fingerprint"].as_str().is_some());
}

#[test]
fn test_configure_is_deterministic() {
    let tmp = temp_dir();
    let args = ["configure", "--platform", "darwin", "--json"];

    let first = stdout_of(titta_build(&tmp).args(args));
    let second = stdout_of(titta_build(&tmp).args(args));

    assert_eq!(first, second);
}

#[test]
fn test_configure_fingerprint_depends_on_platform() {
    let tmp = temp_dir();

    let fingerprint = |platform: &str| {
        let stdout = stdout_of(titta_build(&tmp).args(["configure", "--platform", platform, "--json"]));
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        json["fingerprint"].as_str().unwrap().to_string()
    };

    assert_ne!(fingerprint("linux"), fingerprint("darwin"));
    assert_eq!(fingerprint("linux"), fingerprint("linux2"));
}

#[test]
fn test_configure_text_output() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["configure", "--platform", "win32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TittaPy 1.0.0rc1"))
        .stdout(predicate::str::contains("<pybind11 include>"))
        .stdout(predicate::str::contains("TittaPy/TittaPy.cpp"))
        .stdout(predicate::str::contains("/LTCG"));
}

#[test]
fn test_configure_reads_project_config() {
    let tmp = temp_dir();
    std::fs::create_dir_all(tmp.path().join(".titta")).unwrap();
    std::fs::write(
        tmp.path().join(".titta/config.toml"),
        "[build]\nprofile = \"tobii-wrapper\"\n",
    )
    .unwrap();

    titta_build(&tmp)
        .args(["configure", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TobiiWrapper_python 1.0.0-rc1"));
}

#[test]
fn test_configure_reads_global_config_from_titta_home() {
    let tmp = temp_dir();
    std::fs::create_dir_all(tmp.path().join("global")).unwrap();
    std::fs::write(
        tmp.path().join("global/config.toml"),
        "[build]\nprofile = \"titta-mex\"\n",
    )
    .unwrap();

    titta_build(&tmp)
        .args(["configure", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TittaPy 1.0.0-rc1"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_platform_fails() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["configure", "--platform", "sunos5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported platform `sunos5`"))
        .stderr(predicate::str::contains("help:"));
}

#[test]
fn test_unknown_family_fails() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["flags", "--platform", "linux", "--family", "mingw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown compiler family `mingw`"));
}

#[test]
fn test_unknown_profile_fails() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["metadata", "--profile", "psychopy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile `psychopy`"))
        .stderr(predicate::str::contains("titta-mex"));
}

// ============================================================================
// titta-build metadata
// ============================================================================

#[test]
fn test_metadata_pkg_info() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["metadata", "--pkg-info"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Metadata-Version: 2.1\n"))
        .stdout(predicate::str::contains("Name: TittaPy\n"))
        .stdout(predicate::str::contains("Version: 1.0.0rc1\n"))
        .stdout(predicate::str::contains("Requires-Python: >=3.8"));
}

#[test]
fn test_metadata_summary_tobii_wrapper() {
    let tmp = temp_dir();

    titta_build(&tmp)
        .args(["metadata", "--profile", "tobii-wrapper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TobiiWrapper (from TobiiWrapper_python)"))
        .stdout(predicate::str::contains("pybind11>=2.4"))
        .stdout(predicate::str::contains("Zip safe:     false"));
}
