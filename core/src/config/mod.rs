use serde::{Deserialize, Serialize};

use crate::pgp::diagnostics::DiagnosticMode;
use crate::pgp::PassphraseMode;

pub mod loader;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct PgpipeConfig {
    #[serde(default = "ExecutableConfig::default")]
    pub executable_config: ExecutableConfig,
    #[serde(default = "ScratchConfig::default")]
    pub scratch_config: ScratchConfig,
    pub passphrase_mode: PassphraseMode,
    pub diagnostic_mode: DiagnosticMode,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Eq, PartialEq)]
pub struct ExecutableConfig {
    /// Overridden by the `GPG_EXECUTABLE` environment variable.
    pub pgp_executable: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Eq, PartialEq)]
pub struct ScratchConfig {
    /// Where interactive operations put their temporary input. Defaults to
    /// `/dev/shm` when available, the system temp dir otherwise.
    pub dir: Option<String>,
}
