//! Common test utilities and helpers
//!
//! Reusable helpers for the CLI integration tests. Every command runs with
//! HOME pointed at a temporary directory so a real global configuration
//! never leaks into a test.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test command builder for the fcm-push CLI
pub struct TestCommand {
    cmd: Command,
}

impl TestCommand {
    /// Create a command isolated inside the given environment
    pub fn new(env: &TestEnvironment) -> Self {
        let mut cmd = Command::cargo_bin("fcm-push").expect("Failed to find fcm-push binary");
        cmd.current_dir(env.project_dir())
            .env("HOME", env.home_dir())
            .env_remove("FCM_SERVER_KEY")
            .env_remove("FCM_DEVICE_TOKEN")
            .env_remove("RUST_LOG");
        Self { cmd }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.cmd.arg(arg.as_ref());
        }
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.cmd.env(key.as_ref(), val.as_ref());
        self
    }

    /// Execute and expect success
    pub fn expect_success(mut self) -> TestAssertion {
        let assert = self.cmd.assert().success();
        TestAssertion { assert }
    }

    /// Execute and expect failure
    pub fn expect_failure(mut self) -> TestAssertion {
        let assert = self.cmd.assert().failure();
        TestAssertion { assert }
    }
}

/// Test assertion wrapper with convenient methods
pub struct TestAssertion {
    assert: assert_cmd::assert::Assert,
}

impl TestAssertion {
    pub fn stdout_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stdout(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    pub fn stdout_excludes<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stdout(predicate::str::contains(text.as_ref()).not());
        Self { assert }
    }

    pub fn stderr_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stderr(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    pub fn done(self) -> assert_cmd::assert::Assert {
        self.assert
    }
}

/// Temporary home and project directories for one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::create_dir_all(temp_dir.path().join("home")).expect("Failed to create home");
        std::fs::create_dir_all(temp_dir.path().join("project")).expect("Failed to create project");
        Self { temp_dir }
    }

    pub fn home_dir(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn project_dir(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join(".fcm-push").join("config.toml")
    }

    /// Write a file under the temp directory and return its path
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn command(&self) -> TestCommand {
        TestCommand::new(self)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
