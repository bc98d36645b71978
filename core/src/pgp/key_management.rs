use log::{debug, warn};

use super::command::Operation;
use super::parse::{parse_colon_keys, parse_subkeys};
use super::{Key, PGPClient, Result, SubKey};

impl PGPClient {
    pub fn list_secret_keys(&self) -> Result<Vec<Key>> {
        let output = self.run_batched(&Operation::ListSecretKeys, None, &[])?;
        Ok(parse_colon_keys(&output.stdout_lossy(), &["sec"]))
    }

    /// First primary key matching `id`, `None` if the listing had no usable record.
    pub fn show_key(&self, id: &str) -> Result<Option<Key>> {
        let output = self.run_batched(&Operation::ShowKey { id }, None, &[])?;
        Ok(parse_colon_keys(&output.stdout_lossy(), &["pub", "sec"]).into_iter().next())
    }

    /// Subkeys of the first key matching `id`, in listing order.
    pub fn list_subkeys(&self, id: &str) -> Result<Vec<SubKey>> {
        let output = self.run_batched(&Operation::ListSubkeys { id }, None, &[])?;
        Ok(parse_subkeys(&output.stdout_lossy()))
    }

    /// The last listed subkey of the first key matching `id`.
    pub fn show_subkey(&self, id: &str) -> Result<Option<SubKey>> {
        Ok(self.list_subkeys(id)?.pop())
    }

    /// ASCII-armored public key. Empty when the tool found nothing to export.
    pub fn export_public_key(&self, id: &str) -> Result<String> {
        let output = self.run_batched(&Operation::ExportPublicKey { id }, None, &[])?;
        if output.stdout.is_empty() {
            warn!("Nothing exported for {}: {}", id, output.stderr_lossy().trim_end());
        }
        Ok(output.stdout_lossy())
    }

    /// Import a public key and return its identifier when the tool reported one.
    ///
    /// Importing a key that is already present succeeds as well.
    pub fn import_public_key(&self, key: &str) -> Result<Option<String>> {
        let output = self.run_batched(&Operation::ImportPublicKey, None, key.as_bytes())?;
        let id = self.scraper().imported_key_id(&output.stderr_lossy());
        match &id {
            Some(id) => debug!("Imported key {}", id),
            None => warn!("Key imported but its identifier could not be recovered"),
        }
        Ok(id)
    }

    pub fn delete_key(&self, id: &str) -> Result<()> {
        self.run_batched(&Operation::DeleteKey { id }, None, &[])?;
        Ok(())
    }

    /// gpg only accepts a full fingerprint here in batch mode.
    pub fn delete_secret_and_public_key(&self, fingerprint: &str) -> Result<()> {
        self.run_batched(&Operation::DeleteSecretAndPublicKey { id: fingerprint }, None, &[])?;
        Ok(())
    }

    /// Generate a key from unattended key generation parameters.
    pub fn key_gen_batch(&self, parameters: &str) -> Result<()> {
        self.run_batched(&Operation::KeyGenBatch, None, parameters.as_bytes())?;
        Ok(())
    }

    pub fn key_gen_interactive(&self) -> Result<()> {
        self.run_interactive(&Operation::KeyGenInteractive)
    }

    /// Feed `commands` to `--edit-key`, one command per line.
    pub fn key_edit_batch(&self, id: &str, commands: &str) -> Result<()> {
        self.run_batched(&Operation::KeyEditBatch { id }, None, commands.as_bytes())?;
        Ok(())
    }

    pub fn key_edit_interactive(&self, id: &str) -> Result<()> {
        self.run_interactive(&Operation::KeyEditInteractive { id })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;
    use crate::util::test_util::{fake_client, gen_unique_temp_dir, recorded_args, RECORD_ARGS};

    #[test]
    #[serial]
    fn list_secret_keys_parses_each_sec_record() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(
            &root,
            "cat <<'EOF'\n\
sec:u:2048:1:0123456789ABCDEF:1700000000:::u:Foo <foo@example.org>::scESC:::+:::23::0:\n\
fpr:::::::::AAAABBBBCCCCDDDDEEEEFFFF0123456789ABCDEF:\n\
ssb:u:2048:1:FEDCBA9876543210:1700000000::::::e:::+:::23:\n\
sec:u:bad\n\
sec:u:255:22:1111222233334444:1710000000:::u:Bar <bar@example.org>::scESC:::+::ed25519:::0:\n\
EOF\n",
        );
        let keys = client.list_secret_keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, "0123456789ABCDEF");
        assert_eq!(keys[0].uid, "Foo <foo@example.org>");
        assert_eq!(keys[1].size, 255);
        assert_eq!(keys[1].created, "1710000000");
    }

    #[test]
    #[serial]
    fn show_key_absent_record_is_none() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client =
            fake_client(&root, &format!("{}echo 'tru::1:1700000000:0:3:1:5'\n", RECORD_ARGS));
        assert_eq!(client.show_key("ABCD").unwrap(), None);
        assert_eq!(
            recorded_args(&root),
            ["--batch", "--yes", "--keyid-format", "LONG", "--with-colons", "--list-keys", "ABCD"]
        );
    }

    #[test]
    #[serial]
    fn show_subkey_takes_last_of_first_block() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(
            &root,
            "cat <<'EOF'\n\
pub   rsa2048/0123456789ABCDEF 2024-01-01 [SC]\n\
uid                 [ultimate] Foo <foo@example.org>\n\
sub   rsa2048/FEDCBA9876543210 2024-01-02 [E]\n\
sub   rsa3072/AAAA000011112222 2024-03-04 [A]\n\
\n\
pub   rsa4096/9999999999999999 2020-01-01 [SC]\n\
sub   rsa4096/8888888888888888 2020-01-01 [E]\n\
EOF\n",
        );
        assert_eq!(
            client.show_subkey("foo@example.org").unwrap(),
            Some(SubKey { created: "2024-03-04".into(), size: 3072, id: "AAAA000011112222".into() })
        );
        assert_eq!(client.list_subkeys("foo@example.org").unwrap().len(), 2);
    }

    #[test]
    #[serial]
    fn import_reports_key_id_for_new_and_known_keys() {
        let (_tmp, root) = gen_unique_temp_dir();
        // first run imports, later runs find the key unchanged
        let client = fake_client(
            &root,
            "cat >/dev/null\n\
dir=$(dirname \"$0\")\n\
if [ -f \"$dir/imported\" ]; then\n\
  echo 'gpg: key 0123456789ABCDEF: \"Foo <foo@example.org>\" not changed' >&2\n\
else\n\
  touch \"$dir/imported\"\n\
  echo 'gpg: key 0123456789ABCDEF: public key \"Foo <foo@example.org>\" imported' >&2\n\
fi\n\
echo 'gpg: Total number processed: 1' >&2\n",
        );
        let key = "-----BEGIN PGP PUBLIC KEY BLOCK-----\n...\n-----END PGP PUBLIC KEY BLOCK-----\n";
        assert_eq!(client.import_public_key(key).unwrap().as_deref(), Some("0123456789ABCDEF"));
        assert_eq!(client.import_public_key(key).unwrap().as_deref(), Some("0123456789ABCDEF"));
    }

    #[test]
    #[serial]
    fn delete_key_success_is_ok() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(&root, RECORD_ARGS);
        client.delete_key("ABCD1234").unwrap();
        assert_eq!(recorded_args(&root), ["--batch", "--yes", "--delete-keys", "ABCD1234"]);
    }

    #[test]
    #[serial]
    fn delete_key_failure_carries_stderr() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(
            &root,
            "echo 'gpg: key \"ABCD1234\" not found: Not found' >&2\nexit 2\n",
        );
        let err = client.delete_key("ABCD1234").unwrap_err();
        assert!(err.stderr_lossy().contains("not found"));
    }

    #[test]
    #[serial]
    fn export_returns_armored_text() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(
            &root,
            "echo '-----BEGIN PGP PUBLIC KEY BLOCK-----'\n\
echo '-----END PGP PUBLIC KEY BLOCK-----'\n",
        );
        let armored = client.export_public_key("ABCD").unwrap();
        assert!(armored.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----"));
    }

    #[test]
    #[serial]
    fn key_edit_batch_feeds_commands() {
        let (_tmp, root) = gen_unique_temp_dir();
        let client = fake_client(
            &root,
            &format!("{}cat > \"$(dirname \"$0\")/commands\"\n", RECORD_ARGS),
        );
        client.key_edit_batch("ABCD", "trust\n5\nsave\n").unwrap();
        assert_eq!(
            recorded_args(&root),
            ["--batch", "--yes", "--command-fd", "0", "--status-fd", "1", "--edit-key", "ABCD"]
        );
        assert_eq!(std::fs::read_to_string(root.join("commands")).unwrap(), "trust\n5\nsave\n");
    }

    mod keyring {
        use pretty_assertions::assert_eq;
        use secrecy::{ExposeSecret, SecretString};
        use serial_test::serial;

        use crate::pgp::{EncryptOptions, PGPClient, Recipient};
        use crate::util::defer::cleanup;
        use crate::util::test_util::{
            clean_up_test_key, clear_executable_override, gen_unique_temp_dir, get_test_email,
            get_test_executable, get_test_password, gpg_available, gpg_key_edit_example_batch,
            gpg_key_gen_example_batch,
        };

        fn keyring_client() -> Option<(tempfile::TempDir, PGPClient)> {
            clear_executable_override();
            if !gpg_available() {
                return None;
            }
            let (tmp, scratch) = gen_unique_temp_dir();
            let client =
                PGPClient::new().with_executable(get_test_executable()).with_scratch_dir(scratch);
            client.key_gen_batch(&gpg_key_gen_example_batch()).unwrap();
            Some((tmp, client))
        }

        #[test]
        #[serial]
        fn encrypt_decrypt_round_trip() {
            let Some((_tmp, client)) = keyring_client() else {
                return;
            };
            let email = get_test_email();
            cleanup!(
                {
                    let key = client.show_key(&email).unwrap().unwrap();
                    client.key_edit_batch(&key.id, &gpg_key_edit_example_batch()).unwrap();
                    let to = Recipient::Key(key.id.clone());
                    let ciphertext =
                        client.encrypt(b"hello world", &to, &EncryptOptions::default()).unwrap();
                    assert!(ciphertext[0] & 0x80 != 0);

                    let pass = SecretString::from(get_test_password());
                    let plaintext = client.decrypt(&ciphertext, Some(&pass)).unwrap();
                    assert_eq!(plaintext.expose_secret(), b"hello world");
                },
                {
                    clean_up_test_key(&get_test_executable(), &email).unwrap();
                }
            );
        }

        #[test]
        #[serial]
        fn sign_then_verify_names_signer() {
            let Some((_tmp, client)) = keyring_client() else {
                return;
            };
            let email = get_test_email();
            cleanup!(
                {
                    let pass = SecretString::from(get_test_password());
                    let signed = client.sign_with_passphrase(b"signed text", &pass).unwrap();
                    let verification = client.verify(&signed).unwrap();
                    assert!(verification.signer.is_some());
                    assert_eq!(client.extract_signed(&signed).unwrap(), b"signed text");
                },
                {
                    clean_up_test_key(&get_test_executable(), &email).unwrap();
                }
            );
        }

        #[test]
        #[serial]
        fn import_twice_reports_same_key() {
            let Some((_tmp, client)) = keyring_client() else {
                return;
            };
            let email = get_test_email();
            cleanup!(
                {
                    let key = client.show_key(&email).unwrap().unwrap();
                    let armored = client.export_public_key(&key.id).unwrap();
                    let first = client.import_public_key(&armored).unwrap();
                    let second = client.import_public_key(&armored).unwrap();
                    assert_eq!(first, second);
                    assert_eq!(first.as_deref(), Some(key.id.as_str()));
                    assert!(client.show_subkey(&email).unwrap().is_some());
                },
                {
                    clean_up_test_key(&get_test_executable(), &email).unwrap();
                }
            );
        }
    }
}
