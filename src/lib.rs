//! Helpers to browse, download and extract Kaggle datasets.
//!
//! This crate drives the official `kaggle` command-line tool:
//! it runs the tool, parses its text tables, and unzips what it downloads.
//!
//! ## Quick start
//! - Install the `kaggle` tool and put your API token in `~/.kaggle/kaggle.json`
//!   (or point `KAGGLE_CONFIG_DIR` at the directory holding it).
//! - Call [`Client::browse`] to search, then [`Client::download`] with a
//!   `<owner>/<dataset-name>` reference.
//!
//! ```no_run
//! use kagglehelper::Client;
//!
//! fn main() -> kagglehelper::Result<()> {
//!     let client = Client::from_env()?;
//!     let table = client.browse("titanic", false)?;
//!     println!("{}", table);
//!
//!     let location = client.download("heptapod/titanic", Some("titanic-data"))?;
//!     println!("{}", location);
//!     Ok(())
//! }
//! ```
//!
//! Every operation checks for the credential file first and fails with
//! [`Error::MissingCredential`] when it is absent.

#![forbid(unsafe_code)]

mod archive;
mod client;
mod config;
mod error;
mod runner;
mod table;
mod util;

pub use client::{Client, ClientConfig, DatasetLocation};
pub use error::{Error, Result};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use table::{CANONICAL_COLUMNS, SearchResult, SearchTable};
