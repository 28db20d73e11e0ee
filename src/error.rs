use thiserror::Error;

/// Everything that can go wrong while driving the `kaggle` tool.
///
/// The `Display` text of each variant is the message shown to users, so
/// callers that only want to print the outcome can use `to_string()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Make sure \"~/.kaggle/kaggle.json\" file exists and the correct \"username\" and \"key\" is present"
    )]
    MissingCredential,

    #[error("Provide file name or command line")]
    MissingTarget,

    #[error("Invalid reference '{0}': expected the form '<owner>/<dataset-name>'")]
    InvalidReference(String),

    #[error("'{0}' must be a plain file or folder name inside the working directory")]
    UnsafeName(String),

    #[error("Zip file not downloaded")]
    CompetitionArchiveNotFound,

    #[error(
        "Zip file not downloaded. Make sure the 'reference' provided is correct. You can check the reference by browsing the Kaggle datasets using 'browse_dataset' method"
    )]
    DatasetArchiveNotFound,

    #[error("No data present")]
    NoData,

    #[error("Search output has no '{0}' column")]
    MissingColumn(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::MissingCredential)
    }

    /// True when the tool ran but left no archive behind (usually a wrong name).
    pub fn is_archive_not_found(&self) -> bool {
        matches!(
            self,
            Error::CompetitionArchiveNotFound | Error::DatasetArchiveNotFound
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
