use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::{env, fs};

use tempfile::TempDir;

use crate::constants::env_variables::PGP_EXECUTABLE_ENV;
use crate::pgp::PGPClient;

pub fn get_test_username() -> String {
    env::var("PGPIPE_TEST_USERNAME").unwrap_or("pgpipe-test".into())
}

pub fn get_test_email() -> String {
    env::var("PGPIPE_TEST_EMAIL").unwrap_or("foo@pgpipe.test".into())
}

pub fn get_test_executable() -> String {
    env::var("PGPIPE_TEST_EXECUTABLE").unwrap_or("gpg".into())
}

pub fn get_test_password() -> String {
    env::var("PGPIPE_TEST_PASSWORD").unwrap_or("password".into())
}

pub(crate) fn gen_unique_temp_dir() -> (TempDir, PathBuf) {
    let base_dir = tempfile::env::temp_dir().join("pgpipe-test");
    if !base_dir.exists() {
        let _ = fs::create_dir(&base_dir);
    }
    let dir = TempDir::new_in(base_dir).unwrap();
    let path = dir.path().to_path_buf();
    (dir, path)
}

/// Write an executable `/bin/sh` script named `gpg` into `dir` and return its path.
#[cfg(unix)]
pub(crate) fn fake_tool(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("gpg");
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

/// Script line that saves the tool's arguments, one per line, next to the script.
#[cfg(unix)]
pub(crate) const RECORD_ARGS: &str = "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\n";

/// Drop an ambient `GPG_EXECUTABLE`, it would take precedence over the client's executable.
/// Callers are `#[serial]`.
pub(crate) fn clear_executable_override() {
    env::remove_var(PGP_EXECUTABLE_ENV);
}

/// A client driving a [`fake_tool`] with its own empty scratch dir at `root/scratch`.
#[cfg(unix)]
pub(crate) fn fake_client(root: &Path, body: &str) -> PGPClient {
    clear_executable_override();
    let scratch = root.join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    PGPClient::new().with_executable(fake_tool(root, body)).with_scratch_dir(scratch)
}

#[cfg(unix)]
pub(crate) fn recorded_args(root: &Path) -> Vec<String> {
    fs::read_to_string(root.join("args")).unwrap().lines().map(|l| l.to_string()).collect()
}

pub(crate) fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Whether the test executable starts at all. Keyring tests return early without it.
pub(crate) fn gpg_available() -> bool {
    Command::new(get_test_executable())
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn email_to_fingerprint(executable: &str, email: &str) -> Option<String> {
    let output = Command::new(executable)
        .args(["--list-keys", "--with-colons", email])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.starts_with("fpr"))
        .and_then(|line| line.split(':').nth(9))
        .map(|fpr| fpr.to_string())
}

pub fn clean_up_test_key(executable: &str, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    while let Some(fingerprint) = email_to_fingerprint(executable, email) {
        let delete_status = Command::new(executable)
            .args(["--batch", "--yes", "--delete-secret-and-public-keys", &fingerprint])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !delete_status.success() {
            return Err("Failed to delete PGP key".into());
        }
    }
    Ok(())
}

pub fn gpg_key_gen_example_batch() -> String {
    format!(
        r#"%echo Generating a new key
Key-Type: RSA
Key-Length: 2048
Subkey-Type: RSA
Subkey-Length: 2048
Name-Real: {}
Name-Email: {}
Expire-Date: 0
Passphrase: {}
%commit
%echo Key generation complete
"#,
        get_test_username(),
        get_test_email(),
        get_test_password()
    )
}

pub fn gpg_key_edit_example_batch() -> String {
    r#"trust
5
save
"#
    .to_string()
}
