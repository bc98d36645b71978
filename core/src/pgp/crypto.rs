use std::path::Path;

use log::{debug, warn};
use secrecy::{SecretSlice, SecretString};

use super::command::Operation;
use super::{EncryptOptions, PGPClient, PGPErr, Recipient, Result, Verification};

impl PGPClient {
    /// Binary signature (signed message) of `data`.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::Sign, None, data)?.stdout)
    }

    pub fn sign_with_passphrase(&self, data: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::Sign, Some(passphrase), data)?.stdout)
    }

    pub fn clear_sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::ClearSign, None, data)?.stdout)
    }

    pub fn clear_sign_with_passphrase(
        &self,
        data: &[u8],
        passphrase: &SecretString,
    ) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::ClearSign, Some(passphrase), data)?.stdout)
    }

    pub fn detach_sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::DetachSign, None, data)?.stdout)
    }

    pub fn detach_sign_with_passphrase(
        &self,
        data: &[u8],
        passphrase: &SecretString,
    ) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::DetachSign, Some(passphrase), data)?.stdout)
    }

    /// Verify a signed or clear-signed message.
    ///
    /// A rejected signature is an [`PGPErr::Execution`]. On success the signer is whatever
    /// could be recovered from the diagnostics, possibly nothing.
    pub fn verify(&self, signed: &[u8]) -> Result<Verification> {
        let output = self.run_batched(&Operation::Verify, None, signed)?;
        let signer = self.scraper().signer_id(&output.stderr_lossy());
        if signer.is_none() {
            warn!("Signature verified but the signer could not be identified");
        }
        Ok(Verification { signer })
    }

    /// Check a signature file, against `data` for detached signatures.
    ///
    /// `Ok(false)` means the tool rejected the signature. Only a tool that cannot be
    /// started or talked to is an error.
    pub fn verify_file(&self, signature: &Path, data: Option<&Path>) -> Result<bool> {
        match self.run_batched(&Operation::VerifyFile { signature, data }, None, &[]) {
            Ok(_) => Ok(true),
            Err(e @ PGPErr::Execution { .. }) => {
                debug!("Signature {:?} rejected: {}", signature, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Strip the signature from a signed message and return the original data.
    pub fn extract_signed(&self, signed: &[u8]) -> Result<Vec<u8>> {
        Ok(self.run_batched(&Operation::ExtractSigned, None, signed)?.stdout)
    }

    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        passphrase: Option<&SecretString>,
    ) -> Result<SecretSlice<u8>> {
        let output = self.run_batched(&Operation::Decrypt, passphrase, ciphertext)?;
        Ok(SecretSlice::from(output.stdout))
    }

    pub fn decrypt_file(
        &self,
        path: &Path,
        passphrase: Option<&SecretString>,
    ) -> Result<SecretSlice<u8>> {
        let output = self.run_batched(&Operation::DecryptFile { path }, passphrase, &[])?;
        Ok(SecretSlice::from(output.stdout))
    }

    pub fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &Recipient,
        options: &EncryptOptions,
    ) -> Result<Vec<u8>> {
        let op = Operation::Encrypt { recipient, armor: options.armor, sign: options.sign };
        Ok(self.run_batched(&op, options.passphrase.as_ref(), plaintext)?.stdout)
    }

    /// Encrypt the file at `path`. The ciphertext is returned, nothing is written next to it.
    pub fn encrypt_file(
        &self,
        path: &Path,
        recipient: &Recipient,
        options: &EncryptOptions,
    ) -> Result<Vec<u8>> {
        let op =
            Operation::EncryptFile { path, recipient, armor: options.armor, sign: options.sign };
        Ok(self.run_batched(&op, options.passphrase.as_ref(), &[])?.stdout)
    }
}
