//! Input selection: a named file or `-` for stdin.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Where one ruleset text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Interpret a command-line argument; `-` means stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path.as_path()),
        }
    }
}

impl Display for InputSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors returned when reading an input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {input}: {source}")]
    Read { input: String, source: io::Error },
}

/// Read the whole input as UTF-8 text.
pub fn read_input(input: &InputSource) -> Result<String, InputError> {
    let read = match input {
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
        InputSource::File(path) => fs::read_to_string(path),
    };
    read.map_err(|source| InputError::Read {
        input: input.to_string(),
        source,
    })
}
