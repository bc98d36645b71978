pub mod default_constants {
    pub const PGP_EXECUTABLE: &str = "gpg";
    pub const SCRATCH_NAME_LEN: usize = 10;
    pub const BINARY_SIGNATURE_SUFFIX: &str = "gpg";
    pub const ARMORED_SIGNATURE_SUFFIX: &str = "asc";
    #[cfg(unix)]
    pub const SHM_DIR: &str = "/dev/shm";
    pub const CONFIG_RELATIVE_PATH: &str = ".config/pgpipe/config.toml";
}

pub mod env_variables {
    pub const PGP_EXECUTABLE_ENV: &str = "GPG_EXECUTABLE";
    pub const LOG_LEVEL_VAR: &str = "PGPIPE_LOG_LEVEL";
    pub const CONFIG_PATH_ENV: &str = "PGPIPE_CONFIG_PATH";
}
