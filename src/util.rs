use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Splits `<owner>/<dataset-name>` and returns the dataset name.
pub(crate) fn dataset_name(reference: &str) -> Result<&str> {
    match reference.split_once('/') {
        Some((owner, name))
            if !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/') =>
        {
            Ok(name)
        }
        _ => Err(Error::InvalidReference(reference.to_string())),
    }
}

/// Accepts only a single plain path component, so joining it onto the
/// working directory cannot leave it.
pub(crate) fn local_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(Error::UnsafeName(name.to_string())),
    }
}

/// Extraction folders use underscores where the archive name has hyphens.
pub(crate) fn folder_name(name: &str) -> String {
    name.replace('-', "_")
}

pub(crate) fn archive_file_name(name: &str) -> String {
    format!("{}.zip", name)
}

/// Splits a raw invocation such as `kaggle competitions download -c titanic`
/// into the program and its arguments. Returns `None` for a blank line.
pub(crate) fn split_command_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_needs_owner_and_name() {
        assert_eq!(dataset_name("owner/ds-name").unwrap(), "ds-name");
        for bad in ["ds-name", "/ds-name", "owner/", "a/b/c", ""] {
            assert!(
                matches!(dataset_name(bad), Err(Error::InvalidReference(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn local_names_stay_in_one_directory() {
        assert_eq!(local_name("titanic").unwrap(), "titanic");
        assert_eq!(local_name("my-dest").unwrap(), "my-dest");
        for bad in ["/tmp", "../x", "..", ".", "a/b", ""] {
            assert!(
                matches!(local_name(bad), Err(Error::UnsafeName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn hyphens_become_underscores() {
        assert_eq!(folder_name("dest"), "dest");
        assert_eq!(folder_name("my-dest-dir"), "my_dest_dir");
    }

    #[test]
    fn command_line_is_whitespace_split() {
        let (program, args) = split_command_line("  kaggle competitions download -c titanic ").unwrap();
        assert_eq!(program, "kaggle");
        assert_eq!(args, ["competitions", "download", "-c", "titanic"]);
        assert!(split_command_line("   ").is_none());
    }
}
