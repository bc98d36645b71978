use std::ffi::{OsStr, OsString};
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use super::{PassphraseMode, Recipient};

const REDACTED: &str = "******";

/// One logical gpg operation with its parameters.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Sign,
    ClearSign,
    DetachSign,
    Verify,
    VerifyFile { signature: &'a Path, data: Option<&'a Path> },
    ExtractSigned,
    Decrypt,
    DecryptFile { path: &'a Path },
    Encrypt { recipient: &'a Recipient, armor: bool, sign: bool },
    EncryptFile { path: &'a Path, recipient: &'a Recipient, armor: bool, sign: bool },
    ListSecretKeys,
    ShowKey { id: &'a str },
    ListSubkeys { id: &'a str },
    ExportPublicKey { id: &'a str },
    ImportPublicKey,
    DeleteKey { id: &'a str },
    DeleteSecretAndPublicKey { id: &'a str },
    ReceiveKey { id: &'a str, keyserver: &'a str },
    SignKey { id: &'a str },
    InteractiveSign { input: &'a Path },
    InteractiveClearSign { input: &'a Path, signer: Option<&'a str> },
    KeyGenBatch,
    KeyGenInteractive,
    KeyEditBatch { id: &'a str },
    KeyEditInteractive { id: &'a str },
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        use Operation::*;

        match self {
            Sign => "sign",
            ClearSign => "clear-sign",
            DetachSign => "detach-sign",
            Verify => "verify",
            VerifyFile { .. } => "verify-file",
            ExtractSigned => "extract-signed",
            Decrypt => "decrypt",
            DecryptFile { .. } => "decrypt-file",
            Encrypt { .. } => "encrypt",
            EncryptFile { .. } => "encrypt-file",
            ListSecretKeys => "list-secret-keys",
            ShowKey { .. } => "show-key",
            ListSubkeys { .. } => "list-subkeys",
            ExportPublicKey { .. } => "export-public-key",
            ImportPublicKey => "import-public-key",
            DeleteKey { .. } => "delete-key",
            DeleteSecretAndPublicKey { .. } => "delete-secret-and-public-key",
            ReceiveKey { .. } => "receive-key",
            SignKey { .. } => "sign-key",
            InteractiveSign { .. } => "interactive-sign",
            InteractiveClearSign { .. } => "interactive-clear-sign",
            KeyGenBatch => "key-gen",
            KeyGenInteractive => "interactive-key-gen",
            KeyEditBatch { .. } => "key-edit",
            KeyEditInteractive { .. } => "interactive-key-edit",
        }
    }

    /// Runs attached to the caller's terminal so the tool can prompt.
    pub fn is_interactive(&self) -> bool {
        use Operation::*;

        matches!(
            self,
            InteractiveSign { .. }
                | InteractiveClearSign { .. }
                | KeyGenInteractive
                | KeyEditInteractive { .. }
        )
    }

    /// Operations whose diagnostics are scraped for an identifier.
    pub fn reports_identifier(&self) -> bool {
        matches!(
            self,
            Operation::Verify | Operation::VerifyFile { .. } | Operation::ImportPublicKey
        )
    }

    fn push_args(&self, args: &mut Vec<OsString>) {
        use Operation::*;

        match *self {
            Sign => push(args, &["--sign"]),
            ClearSign => push(args, &["--clearsign"]),
            DetachSign => push(args, &["--detach-sign"]),
            Verify => push(args, &["--verify"]),
            VerifyFile { signature, data } => {
                push(args, &["--verify"]);
                args.push(signature.into());
                if let Some(data) = data {
                    args.push(data.into());
                }
            }
            ExtractSigned | Decrypt => push(args, &["--decrypt"]),
            DecryptFile { path } => {
                push(args, &["--decrypt"]);
                args.push(path.into());
            }
            Encrypt { recipient, armor, sign } => {
                push_encrypt(args, recipient, armor, sign);
            }
            EncryptFile { path, recipient, armor, sign } => {
                push_encrypt(args, recipient, armor, sign);
                push(args, &["--output", "-"]);
                args.push(path.into());
            }
            ListSecretKeys => push(args, &["--list-secret-keys", "--with-colons"]),
            ShowKey { id } => {
                push(args, &["--keyid-format", "LONG", "--with-colons", "--list-keys", id])
            }
            ListSubkeys { id } => push(args, &["--keyid-format", "LONG", "--list-keys", id]),
            ExportPublicKey { id } => push(args, &["--armor", "--export", id]),
            ImportPublicKey => push(args, &["--import"]),
            DeleteKey { id } => push(args, &["--delete-keys", id]),
            DeleteSecretAndPublicKey { id } => {
                push(args, &["--delete-secret-and-public-keys", id])
            }
            ReceiveKey { id, keyserver } => {
                push(args, &["--keyserver", keyserver, "--recv-keys", id])
            }
            SignKey { id } => push(args, &["--sign-key", id]),
            InteractiveSign { input } => {
                push(args, &["--sign"]);
                args.push(input.into());
            }
            InteractiveClearSign { input, signer } => {
                if let Some(signer) = signer {
                    push(args, &["--local-user", signer]);
                }
                push(args, &["--clearsign"]);
                args.push(input.into());
            }
            KeyGenBatch | KeyGenInteractive => push(args, &["--gen-key"]),
            KeyEditBatch { id } => {
                push(args, &["--command-fd", "0", "--status-fd", "1", "--edit-key", id])
            }
            KeyEditInteractive { id } => push(args, &["--edit-key", id]),
        }
    }
}

fn push<S: AsRef<OsStr>>(args: &mut Vec<OsString>, items: &[S]) {
    args.extend(items.iter().map(|s| s.as_ref().to_os_string()));
}

fn push_encrypt(args: &mut Vec<OsString>, recipient: &Recipient, armor: bool, sign: bool) {
    if armor {
        push(args, &["--armor"]);
    }
    if sign {
        push(args, &["--sign"]);
    }
    push(args, &["--encrypt"]);
    match recipient {
        Recipient::Key(id) => push(args, &["--recipient", id.as_str()]),
        Recipient::DefaultSelf => push(args, &["--default-recipient-self"]),
    }
}

/// A ready-to-run argument vector, plus the passphrase line to feed on stdin in fd mode.
pub struct Invocation {
    operation: &'static str,
    interactive: bool,
    args: Vec<OsString>,
    stdin_prefix: Option<Zeroizing<Vec<u8>>>,
    // index of the literal passphrase in `args`, legacy mode only
    secret_arg: Option<usize>,
}

impl Invocation {
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub(crate) fn stdin_prefix(&self) -> Option<&[u8]> {
        self.stdin_prefix.as_ref().map(|p| p.as_slice())
    }

    /// Arguments for logging, with any literal passphrase masked.
    pub fn redacted(&self) -> String {
        self.args
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if Some(i) == self.secret_arg {
                    REDACTED.into()
                } else {
                    a.to_string_lossy()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the argument vector for `op`.
///
/// Batched operations get `--batch --yes`, interactive ones only `--yes`. A passphrase
/// switches pinentry to loopback and is delivered according to `mode`. `diagnostic_args`
/// are added only for operations whose output is scraped for an identifier.
pub fn build(
    op: &Operation,
    passphrase: Option<(&SecretString, PassphraseMode)>,
    diagnostic_args: &[&str],
) -> Invocation {
    let interactive = op.is_interactive();
    let mut args = Vec::new();
    if interactive {
        push(&mut args, &["--yes"]);
    } else {
        push(&mut args, &["--batch", "--yes"]);
    }

    let mut stdin_prefix = None;
    let mut secret_arg = None;
    if let Some((pass, mode)) = passphrase {
        push(&mut args, &["--pinentry-mode", "loopback"]);
        match mode {
            PassphraseMode::Fd => {
                push(&mut args, &["--passphrase-fd", "0"]);
                let mut line = Zeroizing::new(Vec::with_capacity(pass.expose_secret().len() + 1));
                line.extend_from_slice(pass.expose_secret().as_bytes());
                line.push(b'\n');
                stdin_prefix = Some(line);
            }
            PassphraseMode::Argument => {
                push(&mut args, &["--passphrase", pass.expose_secret()]);
                secret_arg = Some(args.len() - 1);
            }
        }
    }

    if op.reports_identifier() {
        push(&mut args, diagnostic_args);
    }
    op.push_args(&mut args);

    Invocation { operation: op.name(), interactive, args, stdin_prefix, secret_arg }
}
