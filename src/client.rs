use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::extract_all;
use crate::config::{absolutize, credential_present, load_config};
use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner, SystemRunner};
use crate::table::SearchTable;
use crate::util::{archive_file_name, dataset_name, folder_name, local_name, split_command_line};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory holding `kaggle.json`, usually `~/.kaggle`.
    pub config_dir: PathBuf,
    /// Where the tool drops archives and where they get extracted.
    pub work_dir: PathBuf,
    /// Name or path of the `kaggle` executable.
    pub program: String,
}

/// Absolute path of an extracted dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLocation(pub PathBuf);

impl DatasetLocation {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset Location: {}", self.0.display())
    }
}

#[derive(Debug, Clone)]
pub struct Client<R = SystemRunner> {
    config_dir: PathBuf,
    work_dir: PathBuf,
    program: String,
    progress: bool,
    runner: R,
}

impl Client<SystemRunner> {
    /// Creates a client from `KAGGLE_CONFIG_DIR` (or `~/.kaggle`) and the
    /// current directory.
    ///
    /// This is equivalent to `Client::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `config_dir`/`work_dir` arguments
    /// - `KAGGLE_CONFIG_DIR` for the credential directory
    /// - `~/.kaggle` and the current directory
    pub fn new(config_dir: Option<PathBuf>, work_dir: Option<PathBuf>) -> Result<Self> {
        let cfg = load_config(config_dir, work_dir)?;
        Ok(Self::with_config(cfg))
    }

    pub fn with_config(cfg: ClientConfig) -> Self {
        Self {
            config_dir: cfg.config_dir,
            work_dir: cfg.work_dir,
            program: cfg.program,
            progress: true,
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> Client<R> {
    /// Replaces the process runner, e.g. with a fake in tests.
    pub fn with_runner<T: CommandRunner>(self, runner: T) -> Client<T> {
        Client {
            config_dir: self.config_dir,
            work_dir: self.work_dir,
            program: self.program,
            progress: self.progress,
            runner,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl AsRef<Path>) -> Result<Self> {
        self.work_dir = absolutize(work_dir.as_ref())?;
        Ok(self)
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// True when `kaggle.json` exists and its first line names both
    /// `username` and `key`.
    pub fn has_credential(&self) -> bool {
        credential_present(&self.config_dir)
    }

    fn require_credential(&self) -> Result<()> {
        if self.has_credential() {
            Ok(())
        } else {
            Err(Error::MissingCredential)
        }
    }

    /// Downloads and extracts a competition's files.
    ///
    /// `command` is a full invocation such as
    /// `kaggle competitions download -c titanic` and takes precedence over
    /// `name` unless blank; its last token names the archive.
    pub fn download_competition(
        &self,
        name: Option<&str>,
        command: Option<&str>,
    ) -> Result<DatasetLocation> {
        self.require_credential()?;

        let command = command.filter(|c| !c.trim().is_empty());
        let (program, args, name) = match (command, name) {
            (Some(line), _) => {
                let (program, args) = split_command_line(line).ok_or(Error::MissingTarget)?;
                let name = args.last().cloned().unwrap_or_else(|| program.clone());
                (program, args, name)
            }
            (None, Some(name)) if !name.trim().is_empty() => {
                let args = vec![
                    "competitions".to_string(),
                    "download".to_string(),
                    "-c".to_string(),
                    name.to_string(),
                ];
                (self.program.clone(), args, name.to_string())
            }
            _ => return Err(Error::MissingTarget),
        };
        local_name(&name)?;

        self.invoke(&program, &args)?;

        let archive = self.work_dir.join(archive_file_name(&name));
        if !archive.is_file() {
            log::warn!("no archive at {} after download", archive.display());
            return Err(Error::CompetitionArchiveNotFound);
        }
        self.extract(&archive, &folder_name(&name))
    }

    /// Searches public datasets for `subject`.
    ///
    /// Unless `verbose` is set the table is narrowed to
    /// [`CANONICAL_COLUMNS`](crate::CANONICAL_COLUMNS).
    pub fn browse(&self, subject: &str, verbose: bool) -> Result<SearchTable> {
        self.require_credential()?;

        let args = vec![
            "datasets".to_string(),
            "list".to_string(),
            "-s".to_string(),
            subject.to_string(),
        ];
        let output = self.invoke(&self.program, &args)?;

        let table = SearchTable::parse(&output.stdout)?;
        log::info!("search for {:?} returned {} dataset(s)", subject, table.len());
        if verbose {
            Ok(table)
        } else {
            table.canonical()
        }
    }

    /// Downloads the dataset `<owner>/<name>` and extracts it into
    /// `destination` (or `<name>` when it is absent or blank), with hyphens
    /// turned into underscores.
    pub fn download(&self, reference: &str, destination: Option<&str>) -> Result<DatasetLocation> {
        self.require_credential()?;
        let name = local_name(dataset_name(reference)?)?;
        let destination = destination
            .filter(|d| !d.trim().is_empty())
            .map(local_name)
            .transpose()?;

        let args = vec![
            "datasets".to_string(),
            "download".to_string(),
            "-d".to_string(),
            reference.to_string(),
        ];
        self.invoke(&self.program, &args)?;

        let archive = self.work_dir.join(archive_file_name(name));
        if !archive.is_file() {
            log::warn!("no archive at {} after download", archive.display());
            return Err(Error::DatasetArchiveNotFound);
        }

        let folder = folder_name(destination.unwrap_or(name));
        self.extract(&archive, &folder)
    }

    fn extract(&self, archive: &Path, folder: &str) -> Result<DatasetLocation> {
        let dest = self.work_dir.join(folder);
        let count = extract_all(archive, &dest)
            .with_context(|| format!("failed to extract {}", archive.display()))?;
        log::info!("extracted {} file(s) to {}", count, dest.display());
        Ok(DatasetLocation(dest))
    }

    fn invoke(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        log::debug!(
            "running `{} {}` in {}",
            program,
            args.join(" "),
            self.work_dir.display()
        );

        let spinner = if self.progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg} {elapsed}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("{} {}", program, args.join(" ")));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let result = self.runner.run(program, args, &self.work_dir);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let output = result?;
        if !output.success() {
            log::warn!(
                "`{}` exited with {:?}: {}",
                program,
                output.code,
                output.stderr.trim()
            );
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Vec<String>)>>,
        stdout: String,
    }

    impl CommandRunner for Recorder {
        fn run(&self, program: &str, args: &[String], _cwd: &Path) -> anyhow::Result<CommandOutput> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));
            Ok(CommandOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                code: Some(0),
            })
        }
    }

    fn client(dir: &Path, with_credential: bool) -> Client<SystemRunner> {
        let config_dir = dir.join(".kaggle");
        if with_credential {
            fs::create_dir_all(&config_dir).unwrap();
            fs::write(
                config_dir.join("kaggle.json"),
                r#"{"username":"someone","key":"abc123"}"#,
            )
            .unwrap();
        }
        Client::new(Some(config_dir), Some(dir.to_path_buf()))
            .unwrap()
            .with_progress(false)
    }

    #[test]
    fn location_message_matches_legacy_text() {
        let loc = DatasetLocation(PathBuf::from("/data/titanic"));
        assert_eq!(loc.to_string(), "Dataset Location: /data/titanic");
    }

    #[test]
    fn competition_needs_name_or_command() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let client = client(tmp.path(), true).with_runner(&recorder);

        for (name, command) in [(None, None), (Some("  "), None), (None, Some("   "))] {
            let err = client.download_competition(name, command).unwrap_err();
            assert_eq!(err.to_string(), "Provide file name or command line");
        }
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn competition_uses_fixed_template() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let client = client(tmp.path(), true)
            .with_program("/opt/bin/kaggle")
            .with_runner(&recorder);

        let err = client.download_competition(Some("titanic"), None).unwrap_err();
        assert!(matches!(err, Error::CompetitionArchiveNotFound));

        let calls = recorder.calls.borrow();
        assert_eq!(calls[0].0, "/opt/bin/kaggle");
        assert_eq!(calls[0].1, ["competitions", "download", "-c", "titanic"]);
    }

    #[test]
    fn raw_command_wins_over_name() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let client = client(tmp.path(), true).with_runner(&recorder);

        let _ = client.download_competition(Some("ignored"), Some("kaggle competitions download -c house-prices"));
        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "kaggle");
        assert_eq!(calls[0].1.last().map(String::as_str), Some("house-prices"));
    }

    #[test]
    fn browse_passes_subject_as_one_argument() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder {
            stdout: "ref  title  size  downloadCount\n---  -----  ----  -------------\na/b  Thing  1KB   3\n"
                .to_string(),
            ..Default::default()
        };
        let client = client(tmp.path(), true).with_runner(&recorder);

        let table = client.browse("house prices", false).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            recorder.calls.borrow()[0].1,
            ["datasets", "list", "-s", "house prices"]
        );
    }

    #[test]
    fn bad_reference_never_runs_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let client = client(tmp.path(), true).with_runner(&recorder);

        let err = client.download("not-a-reference", None).unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn missing_credential_short_circuits_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let client = client(tmp.path(), false).with_runner(&recorder);
        assert!(!client.has_credential());

        let errors = [
            client.download_competition(None, None).unwrap_err(),
            client.download_competition(Some("titanic"), None).unwrap_err(),
            client.browse("covid", true).unwrap_err(),
            client.download("owner/ds", Some("dest")).unwrap_err(),
            client.download("bad", None).unwrap_err(),
        ];
        for err in errors {
            assert!(err.is_missing_credential());
            assert_eq!(err.to_string(), Error::MissingCredential.to_string());
        }
        assert!(recorder.calls.borrow().is_empty());
    }
}
