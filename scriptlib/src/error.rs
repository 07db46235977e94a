use std::{io, result};
use thiserror;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No such script: {0}")]
    UnknownScript(String),
    #[error("A script is already running")]
    AlreadyRunning,
    #[error("Run controller exited")]
    ControllerExited,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = result::Result<T, Error>;
