pub mod assemble;
pub mod export;
pub mod fetch;
pub mod linking;
pub mod runner;
pub mod umls;
pub mod writer;

use thiserror::Error;

use fetch::FetchError;
use linking::LinkError;
use umls::LoadError;
use writer::WriteError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Setup/configuration problems (bad paths, missing inputs, bad options)
    /// as opposed to failures while the run was doing its work.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_configuration(),
            Self::Load(e) => e.is_configuration(),
            Self::Link(e) => e.is_configuration(),
            Self::Write(_) => false,
            Self::Config(_) => true,
        }
    }

    /// Process exit code: 2 for configuration errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            2
        } else {
            1
        }
    }
}
