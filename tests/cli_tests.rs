//! CLI surface integration tests

mod common;

use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("modules"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn test_version_flag() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    let workspace = common::TestWorkspace::new();
    workspace.cmd().arg("install").assert().failure();
}

#[test]
fn test_missing_config_file_fails() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .args(["--config", "does-not-exist.yaml", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_config_value_fails() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file("bad.yaml", "package_manager: pip\n");
    workspace
        .cmd()
        .args(["--config", "bad.yaml", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package_manager 'pip' is not supported"));
}

#[test]
fn test_modules_lists_registry_by_category() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_module(
        "adapter/drizzle",
        "description: Drizzle ORM\nprovides: [database-orm]\n",
        "id: drizzle\nactions: []\n",
    );

    workspace
        .cmd()
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available modules (2)"))
        .stdout(predicate::str::contains("Frameworks"))
        .stdout(predicate::str::contains("framework/nextjs"))
        .stdout(predicate::str::contains("adapter/drizzle"))
        .stdout(predicate::str::contains("Drizzle ORM"))
        .stdout(predicate::str::contains("provides: database-orm"));

    workspace
        .cmd()
        .args(["modules", "--category", "adapter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adapter/drizzle"))
        .stdout(predicate::str::contains("framework/nextjs").not());
}

#[test]
fn test_modules_dir_flag_overrides_config() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file(
        "other/framework/vue/module.yaml",
        "id: framework/vue\ncategory: framework\nversion: 3.0.0\n",
    );
    workspace
        .cmd()
        .args(["modules", "--modules-dir", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("framework/vue"));
}

#[test]
fn test_modules_missing_registry_dir_fails() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("modules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_duplicate_module_ids_rejected() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_file(
        "modules/copies/nextjs/module.yaml",
        "id: framework/nextjs\ncategory: framework\nversion: 2.0.0\n",
    );
    workspace
        .cmd()
        .arg("modules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("defined more than once"));
}
