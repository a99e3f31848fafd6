//! CLI Integration Test
//!
//! Runs the actual CLI binary against a temporary data directory and
//! config file, then cross-checks results with the library.

use std::path::PathBuf;
use std::process::{Command, Output};

use claim_registrar::storage::identity::load_identity_metadata;
use claim_registrar::storage::keys::derive_claim_key;
use claim_registrar::storage::models::Namespace;
use tempfile::TempDir;

const PASSWORD: &str = "test_password";

/// Helper to run CLI commands and capture output
struct CliRunner {
    data_dir: PathBuf,
    config_path: PathBuf,
    bin_path: PathBuf,
}

impl CliRunner {
    fn new(temp_dir: &TempDir) -> Self {
        Self {
            data_dir: temp_dir.path().join("data"),
            config_path: temp_dir.path().join("config.json"),
            bin_path: PathBuf::from(env!("CARGO_BIN_EXE_claim-registrar")),
        }
    }

    fn output(&self, args: &[&str]) -> Output {
        Command::new(&self.bin_path)
            .args(["--data-dir", self.data_dir.to_str().unwrap()])
            .args(["--config", self.config_path.to_str().unwrap()])
            .args(args)
            .env("RUST_LOG", "warn") // Suppress debug logs unless needed
            .env_remove("CLAIM_REGISTRAR_DATA_DIR")
            .env_remove("CLAIM_REGISTRAR_DB_FILE")
            .env_remove("CLAIM_REGISTRAR_IDENTITY")
            .output()
            .expect("Failed to execute CLI")
    }

    /// Run a CLI command and return stdout
    fn run(&self, args: &[&str]) -> Result<String, String> {
        let output = self.output(args);

        if !output.status.success() {
            return Err(format!(
                "CLI command failed:\nstdout: {}\nstderr: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a CLI command that must fail and return stderr
    fn run_failing(&self, args: &[&str]) -> String {
        let output = self.output(args);
        assert!(
            !output.status.success(),
            "Expected failure, got stdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

/// Pull the value after `label` from command output
fn field<'a>(output: &'a str, label: &str) -> &'a str {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(str::trim)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", label, output))
}

#[test]
fn test_cli_claim_flow() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cli = CliRunner::new(&temp_dir);

    let created = cli
        .run(&["identity", "create", "alice", "--password", PASSWORD])
        .unwrap();
    assert!(created.contains("Identity 'alice' created"));

    let metadata = load_identity_metadata(&cli.data_dir, "alice").unwrap();
    assert_eq!(field(&created, "Actor ID:"), metadata.actor_id.as_str());

    let claimed = cli
        .run(&[
            "--identity",
            "alice",
            "claim",
            "--property-type",
            "Domain",
            "--property-id",
            "example.com",
            "--evidence",
            "example.com",
            "--method",
            "TXT",
            "--password",
            PASSWORD,
        ])
        .unwrap();
    assert!(claimed.contains("✓ Claim recorded"));

    let expected_key = derive_claim_key(
        &metadata.actor_id,
        "Domain",
        "example.com",
        Namespace::Claims,
    );
    assert_eq!(field(&claimed, "Claim Key:"), expected_key.to_hex());

    // Read with the selected identity and with an explicit actor
    let listed = cli
        .run(&["--identity", "alice", "list-claim-keys"])
        .unwrap();
    assert!(listed.contains("Claim keys (1):"));
    assert!(listed.contains(&format!("[0] {}", expected_key)));
    assert!(listed.contains("(none)"));

    let by_actor = cli
        .run(&["list-claim-keys", "--actor", metadata.actor_id.as_str()])
        .unwrap();
    assert_eq!(by_actor, listed);

    let shown = cli
        .run(&["all-claims", &format!("0x{}", expected_key)])
        .unwrap();
    assert_eq!(field(&shown, "Property Type:"), "Domain");
    assert_eq!(field(&shown, "Property ID:"), "example.com");
    assert_eq!(field(&shown, "Evidence:"), "example.com");
    assert_eq!(field(&shown, "Method:"), "TXT");

    // Registrations live in their own list
    cli.run(&[
        "-i",
        "alice",
        "register",
        "-t",
        "Domain",
        "-d",
        "example.com",
        "-p",
        PASSWORD,
    ])
    .unwrap();
    let registrations = cli.run(&["-i", "alice", "list-claims"]).unwrap();
    assert!(registrations.contains("Registration keys (1):"));
    assert!(!registrations.contains(&expected_key.to_hex()));
}

#[test]
fn test_cli_rejects_blank_property_type() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cli = CliRunner::new(&temp_dir);

    cli.run(&["identity", "create", "alice", "-p", PASSWORD])
        .unwrap();

    let stderr = cli.run_failing(&[
        "-i",
        "alice",
        "claim",
        "--property-type",
        "",
        "--property-id",
        "example.com",
        "-p",
        PASSWORD,
    ]);
    assert!(stderr.contains("CLM001"), "stderr: {}", stderr);

    let stderr = cli.run_failing(&[
        "-i",
        "alice",
        "register",
        "--property-type",
        "Domain",
        "--property-id",
        "",
        "-p",
        PASSWORD,
    ]);
    assert!(stderr.contains("CLM002"), "stderr: {}", stderr);

    let listed = cli.run(&["-i", "alice", "list-claim-keys"]).unwrap();
    assert!(listed.contains("Claim keys (0):"));
}

#[test]
fn test_cli_wrong_password_and_missing_identity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cli = CliRunner::new(&temp_dir);

    cli.run(&["identity", "create", "alice", "-p", PASSWORD])
        .unwrap();

    let stderr = cli.run_failing(&[
        "-i", "alice", "claim", "-t", "Domain", "-d", "example.com", "-p", "nope",
    ]);
    assert!(stderr.contains("Decryption"), "stderr: {}", stderr);

    let stderr = cli.run_failing(&["claim", "-t", "Domain", "-d", "example.com", "-p", PASSWORD]);
    assert!(stderr.contains("No identity selected"), "stderr: {}", stderr);

    let stderr = cli.run_failing(&["all-claims", "abcd"]);
    assert!(stderr.contains("Invalid claim key"), "stderr: {}", stderr);
}

#[test]
fn test_cli_external_reference_set_and_clear() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cli = CliRunner::new(&temp_dir);

    cli.run(&["identity", "create", "alice", "-p", PASSWORD])
        .unwrap();

    let set = cli
        .run(&[
            "-i",
            "alice",
            "claim-with-external",
            "--storage-name",
            "arweave",
            "--key",
            "metadatakey",
            "-p",
            PASSWORD,
        ])
        .unwrap();
    assert!(set.contains("✓ External reference set"));

    let listed = cli.run(&["-i", "alice", "list-claim-keys"]).unwrap();
    assert_eq!(field(&listed, "Storage:"), "arweave");
    assert_eq!(field(&listed, "Key:"), "metadatakey");

    let cleared = cli
        .run(&["-i", "alice", "claim-with-external", "-p", PASSWORD])
        .unwrap();
    assert!(cleared.contains("✓ External reference cleared"));

    let listed = cli.run(&["-i", "alice", "list-claim-keys"]).unwrap();
    assert!(listed.contains("(none)"));
}

#[test]
fn test_cli_config_init_and_identity_listing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cli = CliRunner::new(&temp_dir);

    cli.run(&["config", "init"]).unwrap();
    assert!(cli.config_path.exists());

    let empty = cli.run(&["identity", "list"]).unwrap();
    assert!(empty.contains("No identities found."));

    cli.run(&["identity", "create", "alice", "-p", PASSWORD])
        .unwrap();
    let listed = cli.run(&["identity", "list"]).unwrap();
    assert!(listed.contains("Identities (1):"));

    let shown = cli.run(&["identity", "show", "alice"]).unwrap();
    let metadata = load_identity_metadata(&cli.data_dir, "alice").unwrap();
    assert_eq!(field(&shown, "Actor ID:"), metadata.actor_id.as_str());
}
