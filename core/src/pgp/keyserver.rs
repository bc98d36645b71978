use log::info;
use secrecy::SecretString;

use super::command::Operation;
use super::{PGPClient, Result};

impl PGPClient {
    /// Fetch `id` from `keyserver` into the local keyring.
    pub fn recv_key(&self, id: &str, keyserver: &str) -> Result<()> {
        self.run_batched(&Operation::ReceiveKey { id, keyserver }, None, &[])?;
        info!("Received key {} from {}", id, keyserver);
        Ok(())
    }

    pub fn sign_key(&self, id: &str) -> Result<()> {
        self.run_batched(&Operation::SignKey { id }, None, &[])?;
        Ok(())
    }

    pub fn sign_key_with_passphrase(&self, id: &str, passphrase: &SecretString) -> Result<()> {
        self.run_batched(&Operation::SignKey { id }, Some(passphrase), &[])?;
        Ok(())
    }

    /// Receive `id` and certify it with the default secret key.
    /// Nothing is signed when the receive fails.
    pub fn recv_key_and_sign(
        &self,
        id: &str,
        keyserver: &str,
        passphrase: Option<&SecretString>,
    ) -> Result<()> {
        self.recv_key(id, keyserver)?;
        match passphrase {
            Some(passphrase) => self.sign_key_with_passphrase(id, passphrase),
            None => self.sign_key(id),
        }
    }
}
