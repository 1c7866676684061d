use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn jolt(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jolt").unwrap();
    cmd.env("JOLT_CONFIG", config_dir.path().join("jolt_config.json"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn var_set_then_get() {
    let dir = TempDir::new().unwrap();

    jolt(&dir).args(["var", "set", "token", "s3cret"]).assert().success();

    jolt(&dir)
        .args(["v", "get", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret"));
}

#[test]
fn var_get_missing_fails() {
    let dir = TempDir::new().unwrap();

    jolt(&dir)
        .args(["var", "get", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("variable 'nope' is not defined"));
}

#[test]
fn config_is_created_with_default_space() {
    let dir = TempDir::new().unwrap();

    jolt(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "default""#));

    assert!(dir.path().join("jolt_config.json").exists());
}

#[test]
fn saved_request_shows_up_in_config() {
    let dir = TempDir::new().unwrap();

    jolt(&dir)
        .args(["post", "http://127.0.0.1:9/users", "name=ada", "admin:=true", "--save", "mkuser"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved request 'mkuser'"));

    jolt(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("mkuser"))
        .stdout(predicate::str::contains("admin:=true"));
}

#[test]
fn malformed_param_is_reported() {
    let dir = TempDir::new().unwrap();

    jolt(&dir)
        .args(["post", "http://127.0.0.1:9/users", "justakey"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed parameter 'justakey'"));
}

#[test]
fn invalid_typed_param_is_not_saved() {
    let dir = TempDir::new().unwrap();

    jolt(&dir)
        .args(["post", "http://127.0.0.1:9/users", "age:=old", "-s", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid typed value 'old'"));

    assert!(!dir.path().join("jolt_config.json").exists());
}
