//! Drive the `gpg` command line tool from Rust.
//!
//! [`PGPClient`] builds one argument list per operation, spawns a fresh process for it and
//! turns the outcome into bytes, parsed key records or a [`PGPErr`]. Operations that need the
//! user at the terminal go through a scratch file that is removed on every exit path.

pub mod config;
pub mod constants;
pub mod pgp;
pub mod util;

pub use config::PgpipeConfig;
pub use pgp::diagnostics::{DiagnosticMode, DiagnosticScraper, StatusScraper, TextScraper};
pub use pgp::{
    EncryptOptions, Key, PGPClient, PGPErr, PassphraseMode, Recipient, Result, SubKey,
    Verification,
};
