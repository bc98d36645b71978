pub mod command;
pub mod crypto;
pub mod diagnostics;
pub mod exec;
pub mod interactive;
pub mod key_management;
pub mod keyserver;
pub mod parse;
pub mod scratch;
pub mod utils;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::diagnostics::DiagnosticScraper;

/// Handle on the external gpg tool. Holds configuration only, every call spawns a fresh process.
pub struct PGPClient {
    // explicit executable, the environment override still wins
    executable: Option<String>,
    scratch_dir: PathBuf,
    passphrase_mode: PassphraseMode,
    scraper: Box<dyn DiagnosticScraper>,
}

/// How a passphrase reaches the tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassphraseMode {
    /// `--passphrase-fd 0`, the passphrase is the first line of stdin.
    #[default]
    Fd,
    /// Legacy: `--passphrase <value>` on the command line, visible in process listings.
    Argument,
}

/// A `pub` or `sec` record from a colon listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub created: String,
    pub size: u32,
    pub id: String,
    /// Field 10 of the record. gpg 2.1 and later leave it empty on `pub`/`sec` lines and
    /// print the user id on separate `uid` records, so this is usually `""`.
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubKey {
    pub created: String,
    pub size: u32,
    pub id: String,
}

/// Outcome of a successful verification.
///
/// `signer` is `None` when the tool accepted the signature but the signer could not be
/// recovered from its diagnostics. A rejected signature is an `Err`, never this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub signer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Key(String),
    DefaultSelf,
}

#[derive(Default)]
pub struct EncryptOptions {
    pub armor: bool,
    /// Sign with the default key as well.
    pub sign: bool,
    /// Unlocks the signing key when `sign` is set.
    pub passphrase: Option<secrecy::SecretString>,
}

#[derive(Debug)]
pub enum PGPErr {
    /// The executable could not be started at all.
    Launch { executable: String, source: io::Error },
    /// The tool ran and exited unsuccessfully.
    Execution { operation: &'static str, code: Option<i32>, stdout: Vec<u8>, stderr: Vec<u8> },
    Io(io::Error),
    CannotTakeStdin,
    ScratchCreate { dir: PathBuf, source: io::Error },
    ScratchWrite { path: PathBuf, source: io::Error },
    ArtifactMissing { path: PathBuf },
    ArtifactRead { path: PathBuf, source: io::Error },
}

impl PGPErr {
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, PGPErr::Launch { .. })
    }

    /// Diagnostic text of a failed run, empty for other kinds.
    pub fn stderr_lossy(&self) -> String {
        match self {
            PGPErr::Execution { stderr, .. } => String::from_utf8_lossy(stderr).into_owned(),
            _ => String::new(),
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PGPErr::Execution { code, .. } => *code,
            _ => None,
        }
    }
}

impl Display for PGPErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use PGPErr::*;

        match self {
            Launch { executable, source } => {
                write!(f, "Cannot launch '{}': {}", executable, source)
            }
            Execution { operation, code, stderr, .. } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(
                    f,
                    "PGP {} failed, code: {}\nError: {}",
                    operation,
                    code,
                    String::from_utf8_lossy(stderr).trim_end()
                )
            }
            Io(e) => write!(f, "IO error while talking to PGP process: {}", e),
            CannotTakeStdin => write!(f, "Cannot take child's stdin"),
            ScratchCreate { dir, source } => {
                write!(f, "Cannot create scratch file in {:?}: {}", dir, source)
            }
            ScratchWrite { path, source } => {
                write!(f, "Cannot write scratch file {:?}: {}", path, source)
            }
            ArtifactMissing { path } => write!(f, "Expected output {:?} was not produced", path),
            ArtifactRead { path, source } => {
                write!(f, "Cannot read output {:?}: {}", path, source)
            }
        }
    }
}

impl Error for PGPErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use PGPErr::*;

        match self {
            Launch { source, .. }
            | ScratchCreate { source, .. }
            | ScratchWrite { source, .. }
            | ArtifactRead { source, .. } => Some(source),
            Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PGPErr {
    fn from(e: io::Error) -> Self {
        PGPErr::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, PGPErr>;
