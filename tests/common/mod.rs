//! Common test utilities for Architech integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory holding a module registry, genomes and generated projects
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace with an engine config pointing at `modules/`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let workspace = Self { temp, path };
        workspace.write_file(
            "config.yaml",
            &format!(
                "modules_dir: {}\ncache_dir: {}\ncommand_timeout_secs: 30\n",
                workspace.path.join("modules").display(),
                workspace.path.join(".cache").display()
            ),
        );
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Add a module to the registry
    ///
    /// `manifest` holds the manifest lines after `id`, `category` and `version`.
    pub fn write_module(&self, id: &str, manifest: &str, blueprint: &str) {
        let category = id.split('/').next().expect("module id has a category segment");
        self.write_file(
            &format!("modules/{id}/module.yaml"),
            &format!("id: {id}\ncategory: {category}\nversion: 1.0.0\n{manifest}"),
        );
        self.write_file(&format!("modules/{id}/blueprint.yaml"), blueprint);
    }

    /// The Next.js framework module most tests build on
    pub fn write_nextjs(&self) {
        self.write_module(
            "framework/nextjs",
            "provides: [framework]\ndirectories: [src/app, public]\n",
            r#"id: nextjs-setup
actions:
  - type: create-file
    path: package.json
    content: |
      { "name": "{{project.name}}", "version": "{{project.version}}" }
  - type: create-file
    path: src/app/layout.tsx
    content: |
      export default function RootLayout({ children }) {
        return (
          <html>
            <body>
              {children}
            </body>
          </html>
        );
      }
"#,
        );
    }

    /// Write a genome for project `app` at `./app`
    pub fn write_genome(&self, modules: &[&str], features: &[&str]) {
        let mut genome = String::from(
            "project:\n  name: app\n  path: app\n  framework: nextjs\n  version: 0.1.0\n",
        );
        genome.push_str("modules:\n");
        for id in modules {
            genome.push_str(&format!("  - id: {id}\n"));
        }
        if modules.is_empty() {
            genome.push_str("  []\n");
        }
        if !features.is_empty() {
            genome.push_str(&format!("features: [{}]\n", features.join(", ")));
        }
        self.write_file("genome.yaml", &genome);
    }

    /// Command running the architech binary inside the workspace
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("architech").expect("architech binary is built");
        cmd.current_dir(&self.path);
        // Always ignore any developer overrides during tests
        cmd.env_remove("ARCHITECH_MODULES_DIR");
        cmd.env_remove("ARCHITECH_CACHE_DIR");
        cmd.env_remove("RUST_LOG");
        cmd.env("ARCHITECH_CONFIG", self.path.join("config.yaml"));
        cmd.env("NO_COLOR", "1");
        cmd
    }
}
