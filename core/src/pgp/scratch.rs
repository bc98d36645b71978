use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{PGPErr, Result};
use crate::constants::default_constants::SCRATCH_NAME_LEN;
use crate::util::rand::rand_alphabet_string;

const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchState {
    Created,
    Written,
    Invoked,
    ArtifactRead,
}

/// A randomly named input file plus the output path the tool derives from it.
///
/// Both paths are removed when the artifact is dropped, whatever state it reached.
#[derive(Debug)]
pub struct ScratchArtifact {
    input: PathBuf,
    output: PathBuf,
    state: ScratchState,
}

impl ScratchArtifact {
    /// Create an empty, owner-only input file in `dir`. The output path is
    /// `<input>.<output_suffix>`.
    pub fn create(dir: &Path, output_suffix: &str) -> Result<Self> {
        let create_err =
            |source: io::Error| PGPErr::ScratchCreate { dir: dir.to_path_buf(), source };
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = rand_alphabet_string(SCRATCH_NAME_LEN);
            let input = dir.join(&name);
            let output = dir.join(format!("{}.{}", name, output_suffix));
            if output.exists() {
                continue;
            }
            match open_exclusive(&input) {
                Ok(_) => {
                    debug!("Created scratch file {:?}", input);
                    return Ok(Self { input, output, state: ScratchState::Created });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(create_err(e)),
            }
        }
        Err(create_err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free scratch file name",
        )))
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn state(&self) -> ScratchState {
        self.state
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let write = || -> io::Result<()> {
            let mut file = OpenOptions::new().write(true).truncate(true).open(&self.input)?;
            file.write_all(data)?;
            file.flush()
        };
        write().map_err(|source| PGPErr::ScratchWrite { path: self.input.clone(), source })?;
        self.state = ScratchState::Written;
        Ok(())
    }

    pub fn mark_invoked(&mut self) {
        self.state = ScratchState::Invoked;
    }

    pub fn read_output(&mut self) -> Result<Vec<u8>> {
        if !self.output.exists() {
            return Err(PGPErr::ArtifactMissing { path: self.output.clone() });
        }
        let content = fs::read(&self.output)
            .map_err(|source| PGPErr::ArtifactRead { path: self.output.clone(), source })?;
        self.state = ScratchState::ArtifactRead;
        Ok(content)
    }
}

fn open_exclusive(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn remove_path(path: &Path) {
    let result = if path.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) };
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove scratch path {:?}: {}", path, e),
    }
}

impl Drop for ScratchArtifact {
    fn drop(&mut self) {
        debug!("Cleaning up scratch file {:?} in state {:?}", self.input, self.state);
        remove_path(&self.input);
        remove_path(&self.output);
    }
}
