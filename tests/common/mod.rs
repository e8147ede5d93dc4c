use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Helper struct to run rescue commands in an isolated temp directory
pub struct RescueTest {
    pub temp_dir: TempDir,
    binary_path: String,
    env: Vec<(String, String)>,
}

impl RescueTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        RescueTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_rescue").to_string(),
            env: Vec::new(),
        }
    }

    /// Set an environment variable for every following run
    #[allow(dead_code)]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("RESCUE_DATABASE")
            .env_remove("RESCUE_OFFLINE")
            .env_remove("RESCUE_LOG");
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command.output().expect("Failed to execute rescue command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    #[allow(dead_code)]
    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full_args = args.to_vec();
        full_args.push("--json");
        let stdout = self.run_success(&full_args);
        serde_json::from_str(&stdout).expect("Command did not print valid JSON")
    }

    #[allow(dead_code)]
    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    fn write_rescue_file(&self, name: &str, content: &str) {
        let dir = self.temp_dir.path().join(".rescue");
        fs::create_dir_all(&dir).expect("Failed to create .rescue directory");
        fs::write(dir.join(name), content).expect("Failed to write file");
    }

    /// Write the local document database
    #[allow(dead_code)]
    pub fn write_database(&self, document: &Value) {
        self.write_rescue_file("database.json", &document.to_string());
    }

    #[allow(dead_code)]
    pub fn read_database(&self) -> Value {
        let path = self.temp_dir.path().join(".rescue").join("database.json");
        let content = fs::read_to_string(path).expect("Failed to read database file");
        serde_json::from_str(&content).expect("Database is not valid JSON")
    }

    /// Write the offline fallback bundle
    #[allow(dead_code)]
    pub fn write_bundle(&self, bundle: &Value) {
        self.write_rescue_file("bundle.json", &bundle.to_string());
    }

    #[allow(dead_code)]
    pub fn write_config(&self, content: &str) {
        self.write_rescue_file("config.yaml", content);
    }

    #[allow(dead_code)]
    pub fn write_blob(&self, relative_path: &str, data: &[u8]) {
        let path = self
            .temp_dir
            .path()
            .join(".rescue")
            .join("blobs")
            .join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create blob directory");
        }
        fs::write(path, data).expect("Failed to write blob");
    }

    #[allow(dead_code)]
    pub fn read_file(&self, relative_path: &str) -> Option<String> {
        let path = self.temp_dir.path().join(relative_path);
        fs::read_to_string(path).ok()
    }
}
