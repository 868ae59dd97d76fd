//! CLI tests for `wepp-runner`.
//!
//! Spawns the binary and checks exit codes for each failure class.

use std::fs;
use std::process::Command;

use wepp_runner::exit_codes;
use wepp_runner::test_support::{touch, touch_hillslope_inputs};

fn wepp_runner(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wepp-runner"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn missing_input_exits_with_missing_input_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let runs = temp.path().join("runs");
    touch_hillslope_inputs(&runs, 7, None);
    fs::remove_file(runs.join("p7.sol")).expect("remove sol");

    let output = wepp_runner(temp.path())
        .args(["run", "hillslope", "--wepp-id", "7", "--runs-dir", "runs"])
        .output()
        .expect("wepp-runner run");

    assert_eq!(output.status.code(), Some(exit_codes::MISSING_INPUT));
    assert!(String::from_utf8_lossy(&output.stderr).contains("p7.sol"));
    assert!(!runs.join("p7.err").exists());
}

#[cfg(unix)]
#[test]
fn run_without_marker_exits_with_simulation_failed_code() {
    use wepp_runner::test_support::install_fake_wepp;

    let temp = tempfile::tempdir().expect("tempdir");
    let runs = temp.path().join("runs");
    touch_hillslope_inputs(&runs, 7, None);
    install_fake_wepp(&temp.path().join("bin"), "wepp", "*** run aborted ***");

    let output = wepp_runner(temp.path())
        .args(["run", "hillslope", "--wepp-id", "7", "--runs-dir", "runs"])
        .output()
        .expect("wepp-runner run");

    assert_eq!(output.status.code(), Some(exit_codes::SIMULATION_FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error running wepp for wepp_id 7"));
    assert!(
        fs::read_to_string(runs.join("p7.err"))
            .expect("log")
            .contains("*** run aborted ***")
    );
}

#[test]
fn binaries_lists_versioned_names_and_latest() {
    let temp = tempfile::tempdir().expect("tempdir");
    for name in ["wepp_2017", "wepp_2020", "wepp_2020.exe", "readme.txt"] {
        touch(&temp.path().join("bin").join(name));
    }

    let output = wepp_runner(temp.path())
        .arg("binaries")
        .output()
        .expect("wepp-runner binaries");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "latest\nwepp_2017\nwepp_2020\n"
    );
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("wepp.toml"), "bin_dir = \"\"\n").expect("write config");

    let status = wepp_runner(temp.path())
        .arg("binaries")
        .status()
        .expect("wepp-runner binaries");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn make_writes_run_file_path_to_stdout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let templates = temp.path().join("templates");
    fs::create_dir_all(&templates).expect("templates");
    fs::write(templates.join("ss_watershed.template"), "{sub_n} # count\n").expect("template");
    fs::create_dir_all(temp.path().join("runs")).expect("runs");

    let output = wepp_runner(temp.path())
        .args(["make", "ss-watershed", "--wepp-ids", "4,5", "--runs-dir", "runs"])
        .output()
        .expect("wepp-runner make");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        fs::read_to_string(temp.path().join("runs").join("pw0.run")).expect("run file"),
        "2"
    );
}
