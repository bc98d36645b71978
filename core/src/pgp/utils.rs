use std::env;
use std::path::{Path, PathBuf};

use log::debug;
use secrecy::SecretString;

use super::command::{build, Invocation, Operation};
use super::diagnostics::{DiagnosticScraper, TextScraper};
use super::exec::{self, CapturedOutput};
use super::{PGPClient, PassphraseMode, Result};
use crate::config::PgpipeConfig;
use crate::constants::default_constants::PGP_EXECUTABLE;
use crate::constants::env_variables::PGP_EXECUTABLE_ENV;
use crate::util::cross_platform::{default_scratch_dir, find_executable_in_path};

/// Pick the executable for one call: `GPG_EXECUTABLE`, then `configured`, then `gpg` from `PATH`.
///
/// When nothing is found on `PATH` the bare name is returned and the spawn reports the
/// launch failure.
pub fn resolve_executable(configured: Option<&str>) -> String {
    if let Ok(from_env) = env::var(PGP_EXECUTABLE_ENV) {
        if !from_env.is_empty() {
            return from_env;
        }
    }
    if let Some(configured) = configured.filter(|c| !c.is_empty()) {
        return configured.to_string();
    }
    match find_executable_in_path(PGP_EXECUTABLE) {
        Some(path) => path.to_string_lossy().into_owned(),
        None => PGP_EXECUTABLE.to_string(),
    }
}

impl Default for PGPClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PGPClient {
    pub fn new() -> Self {
        PGPClient {
            executable: None,
            scratch_dir: default_scratch_dir(),
            passphrase_mode: PassphraseMode::default(),
            scraper: Box::new(TextScraper),
        }
    }

    pub fn from_config(config: &PgpipeConfig) -> Self {
        let scratch_dir = match &config.scratch_config.dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_scratch_dir(),
        };
        PGPClient {
            executable: config.executable_config.pgp_executable.clone(),
            scratch_dir,
            passphrase_mode: config.passphrase_mode,
            scraper: config.diagnostic_mode.scraper(),
        }
    }

    pub fn with_executable<S: Into<String>>(mut self, executable: S) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_scratch_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_passphrase_mode(mut self, mode: PassphraseMode) -> Self {
        self.passphrase_mode = mode;
        self
    }

    pub fn with_scraper(mut self, scraper: Box<dyn DiagnosticScraper>) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn get_executable(&self) -> String {
        resolve_executable(self.executable.as_deref())
    }

    pub fn get_scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn get_passphrase_mode(&self) -> PassphraseMode {
        self.passphrase_mode
    }

    pub(crate) fn scraper(&self) -> &dyn DiagnosticScraper {
        self.scraper.as_ref()
    }

    pub(crate) fn invocation(
        &self,
        op: &Operation,
        passphrase: Option<&SecretString>,
    ) -> Invocation {
        build(op, passphrase.map(|p| (p, self.passphrase_mode)), self.scraper.extra_args())
    }

    pub(crate) fn run_batched(
        &self,
        op: &Operation,
        passphrase: Option<&SecretString>,
        input: &[u8],
    ) -> Result<CapturedOutput> {
        let invocation = self.invocation(op, passphrase);
        let output = exec::run_batched(&self.get_executable(), &invocation, input)?;
        debug!("{} finished, {} bytes on stdout", invocation.operation(), output.stdout.len());
        Ok(output)
    }

    pub(crate) fn run_interactive(&self, op: &Operation) -> Result<()> {
        let invocation = self.invocation(op, None);
        exec::run_interactive(&self.get_executable(), &invocation)
    }
}
