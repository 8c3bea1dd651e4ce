//! Bulk load settings, read from the environment.
//!
//! | Variable    | Meaning                                   | Default            |
//! |-------------|-------------------------------------------|--------------------|
//! | `KEYS_FILE` | newline-separated key file to load        | `keys.txt`         |
//! | `THREADS`   | workers used to verify the loaded keys    | `num_cpus::get()`  |
//! | `LOADER`    | `mmap` or `tokio`                         | `mmap`             |

use std::{path::PathBuf, str::FromStr};

use crate::error::{Error, Result};

/// How the key file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loader {
    /// Map the whole file and verify keys in parallel.
    #[default]
    Mmap,
    /// Stream the file through a line decoder.
    Tokio,
}

impl FromStr for Loader {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mmap" => Ok(Self::Mmap),
            "tokio" => Ok(Self::Tokio),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub keys_file: PathBuf,
    pub threads: usize,
    pub loader: Loader,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let keys_file = lookup("KEYS_FILE")
            .map_or_else(|| PathBuf::from("keys.txt"), PathBuf::from);
        let threads = match lookup("THREADS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(threads) if threads > 0 => threads,
                _ => return Err(Error::Config { name: "THREADS", value }),
            },
            None => num_cpus::get(),
        };
        let loader = match lookup("LOADER") {
            Some(value) => value
                .parse()
                .map_err(|()| Error::Config { name: "LOADER", value })?,
            None => Loader::default(),
        };
        Ok(Self {
            keys_file,
            threads,
            loader,
        })
    }
}
