use std::path::Path;

use log::debug;

use super::command::Operation;
use super::scratch::ScratchArtifact;
use super::{PGPClient, Result};
use crate::constants::default_constants::{ARMORED_SIGNATURE_SUFFIX, BINARY_SIGNATURE_SUFFIX};

#[derive(Debug, Clone, Copy)]
enum FileSign<'a> {
    Binary,
    Clear { signer: Option<&'a str> },
}

impl<'a> FileSign<'a> {
    /// Suffix gpg appends to the input name when no `--output` is given.
    fn output_suffix(&self) -> &'static str {
        match self {
            FileSign::Binary => BINARY_SIGNATURE_SUFFIX,
            FileSign::Clear { .. } => ARMORED_SIGNATURE_SUFFIX,
        }
    }

    fn operation<'p>(self, input: &'p Path) -> Operation<'p>
    where
        'a: 'p,
    {
        match self {
            FileSign::Binary => Operation::InteractiveSign { input },
            FileSign::Clear { signer } => Operation::InteractiveClearSign { input, signer },
        }
    }
}

impl PGPClient {
    /// Sign with the tool attached to the terminal so it can prompt for the passphrase.
    /// Returns the binary signed message.
    pub fn sign_interactive(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.sign_through_scratch(data, FileSign::Binary)
    }

    /// Clear-sign with the tool attached to the terminal, optionally as `signer`.
    pub fn clear_sign_interactive(&self, data: &[u8], signer: Option<&str>) -> Result<Vec<u8>> {
        self.sign_through_scratch(data, FileSign::Clear { signer })
    }

    // every early return drops `artifact`, which removes the input and the derived output
    fn sign_through_scratch(&self, data: &[u8], kind: FileSign) -> Result<Vec<u8>> {
        let mut artifact = ScratchArtifact::create(&self.scratch_dir, kind.output_suffix())?;
        artifact.write(data)?;
        self.run_interactive(&kind.operation(artifact.input()))?;
        artifact.mark_invoked();
        let content = artifact.read_output()?;
        debug!("Read {} bytes from {:?}", content.len(), artifact.output());
        Ok(content)
    }
}
