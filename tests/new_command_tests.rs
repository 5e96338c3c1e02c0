//! New command integration tests

mod common;

use predicates::prelude::*;

#[test]
fn test_new_generates_framework_only_project() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_genome(&["framework/nextjs"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("1 module,"))
        .stdout(predicate::str::contains("already exists").not());

    assert!(workspace.file_exists("app/public"));
    assert!(workspace.file_exists("app/src/app/layout.tsx"));
    let package = workspace.read_file("app/package.json");
    assert!(package.contains(r#""name": "app""#));
    assert!(package.contains(r#""version": "0.1.0""#));
}

#[test]
fn test_new_adds_framework_when_genome_omits_it() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_genome(&[], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .success();
    assert!(workspace.file_exists("app/package.json"));
}

#[test]
fn test_new_applies_modifiers_in_dependency_order() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_module(
        "integration/theme",
        "dependencies: [framework/nextjs]\nparameters:\n  default_theme: dark\n",
        r#"id: theme
actions:
  - type: create-file
    path: src/components/theme-provider.tsx
    content: |
      export function ThemeProvider({ children }) { return children; }
  - type: enhance-file
    path: src/app/layout.tsx
    modifier: add-import
    params:
      import: '{ ThemeProvider } from "@/components/theme-provider"'
  - type: enhance-file
    path: src/app/layout.tsx
    modifier: jsx-wrap
    params:
      component: ThemeProvider
      props:
        defaultTheme: "{{params.default_theme}}"
  - type: enhance-file
    path: package.json
    modifier: json-merge
    params:
      value:
        dependencies:
          next-themes: ^0.3.0
  - type: enhance-file
    path: .env.local
    modifier: env-vars
    params:
      vars:
        NEXT_PUBLIC_THEME: "{{params.default_theme}}"
"#,
    );
    workspace.write_genome(&["framework/nextjs", "integration/theme"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 modules"));

    let layout = workspace.read_file("app/src/app/layout.tsx");
    assert!(layout.starts_with("import { ThemeProvider } from \"@/components/theme-provider\";"));
    assert!(layout.contains(r#"<ThemeProvider defaultTheme="dark">"#));
    assert!(layout.contains("</ThemeProvider>"));

    let package: serde_json::Value = serde_json::from_str(&workspace.read_file("app/package.json")).unwrap();
    assert_eq!(package["name"], "app");
    assert_eq!(package["dependencies"]["next-themes"], "^0.3.0");

    assert_eq!(workspace.read_file("app/.env.local"), "NEXT_PUBLIC_THEME=dark\n");
}

#[test]
fn test_new_unresolvable_genome_writes_nothing() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_genome(&["framework/nextjs", "adapter/unknown"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Generation failed while preparing the plan"))
        .stderr(predicate::str::contains("adapter/unknown"));

    assert!(!workspace.file_exists("app"));
}

#[test]
fn test_new_failed_modifier_discards_module_changes() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_module(
        "adapter/broken",
        "dependencies: [framework/nextjs]\n",
        r#"id: broken
actions:
  - type: create-file
    path: src/lib/broken.ts
    content: export const broken = true;
  - type: enhance-file
    path: src/app/layout.tsx
    modifier: regex-replace
    params:
      pattern: "no such text"
      replacement: x
"#,
    );
    workspace.write_genome(&["framework/nextjs", "adapter/broken"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 module already committed"))
        .stdout(predicate::str::contains("remain on disk"))
        .stderr(predicate::str::contains("Modifier 'regex-replace' failed"));

    assert!(workspace.file_exists("app/package.json"));
    assert!(!workspace.file_exists("app/src/lib/broken.ts"));
}

#[cfg(unix)]
#[test]
fn test_new_failing_command_stops_later_batches() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_module(
        "adapter/failing",
        "dependencies: [framework/nextjs]\n",
        "id: failing\nactions:\n  - type: run-command\n    command: echo boom >&2; exit 3\n",
    );
    workspace.write_module(
        "integration/after",
        "dependencies: [adapter/failing]\n",
        "id: after\nactions:\n  - type: create-file\n    path: after.txt\n    content: never\n",
    );
    workspace.write_genome(&["framework/nextjs", "integration/after"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("executing (1 of 3 modules committed)"))
        .stderr(predicate::str::contains("exited with code 3"))
        .stderr(predicate::str::contains("boom"));

    assert!(workspace.file_exists("app/package.json"));
    assert!(!workspace.file_exists("app/after.txt"));
}

#[cfg(unix)]
#[test]
fn test_new_runs_commands_in_project_root() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_module(
        "adapter/marker",
        "dependencies: [framework/nextjs]\n",
        "id: marker\nactions:\n  - type: run-command\n    command: echo '{{module.id}}' > marker.txt\n",
    );
    workspace.write_genome(&["framework/nextjs", "adapter/marker"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install", "--sequential"])
        .assert()
        .success();
    assert_eq!(workspace.read_file("app/marker.txt"), "adapter/marker\n");
}

#[test]
fn test_new_existing_file_is_kept_with_warning() {
    let workspace = common::TestWorkspace::new();
    workspace.write_nextjs();
    workspace.write_file("app/package.json", "{\"name\": \"existing\"}\n");
    workspace.write_genome(&["framework/nextjs"], &[]);

    workspace
        .cmd()
        .args(["new", "genome.yaml", "--no-install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists and is not empty"))
        .stdout(predicate::str::contains("package.json already exists, skipped"));
    assert_eq!(workspace.read_file("app/package.json"), "{\"name\": \"existing\"}\n");
}
