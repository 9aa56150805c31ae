//! The download task: sources, destination and options bound to a transport.

use crate::core::dest::DestinationSpec;
use crate::core::error::{FetchError, Result};
use crate::core::failover::fetch_with_failover;
use crate::core::options::TaskOptions;
use crate::core::output;
use crate::core::report::{ItemReport, TaskReport, TaskState};
use crate::core::source::{FetchItem, SourceSpec};
use crate::transport::{Transport, Transports};
use std::path::PathBuf;

/// Where the task writes, before or after kind inference.
#[derive(Debug, Clone)]
enum Destination {
    Infer(PathBuf),
    Explicit(DestinationSpec),
}

pub struct DownloadTask<T: Transport = Transports> {
    source: SourceSpec,
    destination: Destination,
    options: TaskOptions,
    transport: T,
}

impl DownloadTask {
    /// Build a task using the default HTTP(S) and file transports.
    ///
    /// The destination kind is inferred from `dest` when the task runs.
    pub fn new(source: SourceSpec, dest: impl Into<PathBuf>, options: TaskOptions) -> Self {
        let transport = Transports::new(&options.transport);
        Self::with_transport(source, dest, options, transport)
    }
}

impl<T: Transport> DownloadTask<T> {
    pub fn with_transport(
        source: SourceSpec,
        dest: impl Into<PathBuf>,
        options: TaskOptions,
        transport: T,
    ) -> Self {
        Self {
            source,
            destination: Destination::Infer(dest.into()),
            options,
            transport,
        }
    }

    /// Use `destination` as given instead of inferring file vs directory.
    pub fn destination(mut self, destination: DestinationSpec) -> Self {
        self.destination = Destination::Explicit(destination);
        self
    }

    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    /// Resolve sources and destination, failing on any configuration error.
    ///
    /// Never touches the network or the destination.
    pub fn plan(&self) -> Result<(Vec<FetchItem>, DestinationSpec)> {
        let items = self.source.resolve()?;
        let destination = match &self.destination {
            Destination::Infer(path) => DestinationSpec::infer(path.clone(), items.len()),
            Destination::Explicit(spec) => spec.clone(),
        };
        destination.validate(items.len())?;

        for item in &items {
            if let Some(unsupported) = item
                .candidates()
                .iter()
                .find(|c| !self.transport.supports(c))
            {
                return Err(FetchError::config(format!(
                    "no transport for {}",
                    unsupported
                )));
            }
        }
        Ok((items, destination))
    }

    /// Run the task once.
    ///
    /// Configuration errors are returned as `Err`. Fetch failures end the
    /// run with a `Failed` report; items completed before the failure are
    /// kept in the report and on disk.
    pub fn run(&self) -> Result<TaskReport> {
        let (items, destination) = self.plan()?;
        let quiet = self.options.quiet;

        if !quiet {
            output::action(&format!(
                "Fetching {} into {}",
                describe(&items),
                destination.path().display()
            ));
        }

        let mut done: Vec<ItemReport> = Vec::with_capacity(items.len());
        for item in &items {
            match fetch_with_failover(&self.transport, item, &destination, &self.options) {
                Ok(report) => {
                    if !quiet && !report.executed {
                        output::skip(&format!(
                            "{} is up to date ({})",
                            report.destination.display(),
                            report.reason
                        ));
                    }
                    done.push(report);
                }
                Err(err @ FetchError::Config(_)) => return Err(err),
                Err(err) => {
                    output::error(&err.to_string());
                    return Ok(TaskReport::classify(done, Some(&err)));
                }
            }
        }

        let report = TaskReport::classify(done, None);
        if !quiet {
            match report.state {
                TaskState::Executed => output::success(&format!("{}", report.state)),
                _ => output::info(&format!("{}", report.state)),
            }
        }
        Ok(report)
    }
}

fn describe(items: &[FetchItem]) -> String {
    match items {
        [item] if item.candidates().len() == 1 => item.primary().to_string(),
        [item] => format!(
            "{} ({} mirrors)",
            item.primary().file_name(),
            item.candidates().len()
        ),
        _ => format!("{} files", items.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::Location;
    use tempfile::tempdir;

    fn quiet() -> TaskOptions {
        TaskOptions::default().quiet(true)
    }

    fn local_sources(dir: &std::path::Path, names: &[&str]) -> SourceSpec {
        let raw: Vec<String> = names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, name.as_bytes()).unwrap();
                path.display().to_string()
            })
            .collect();
        SourceSpec::parse_list(&raw).unwrap()
    }

    #[test]
    fn test_single_local_file() {
        let temp = tempdir().unwrap();
        let source = local_sources(temp.path(), &["a.txt"]);
        let dest = temp.path().join("out/copy.txt");

        let report = DownloadTask::new(source, &dest, quiet()).run().unwrap();

        assert_eq!(report.state, TaskState::Executed);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a.txt");
    }

    #[test]
    fn test_many_sources_into_inferred_directory() {
        let temp = tempdir().unwrap();
        let source = local_sources(temp.path(), &["a.txt", "b.txt"]);
        let dest = temp.path().join("out");

        let report = DownloadTask::new(source, &dest, quiet()).run().unwrap();

        assert_eq!(report.items.len(), 2);
        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "a.txt");
        assert_eq!(std::fs::read_to_string(dest.join("b.txt")).unwrap(), "b.txt");
    }

    #[test]
    fn test_many_sources_into_explicit_file_fails_before_fetching() {
        let temp = tempdir().unwrap();
        let source = local_sources(temp.path(), &["a.txt", "b.txt"]);
        let dest = temp.path().join("out.bin");

        let task = DownloadTask::new(source, &dest, quiet())
            .destination(DestinationSpec::File(dest.clone()));

        assert!(matches!(task.run(), Err(FetchError::Config(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_second_run_without_overwrite_is_up_to_date() {
        let temp = tempdir().unwrap();
        let source = local_sources(temp.path(), &["a.txt"]);
        let dest = temp.path().join("copy.txt");
        let task = DownloadTask::new(source, &dest, quiet().overwrite(false));

        assert_eq!(task.run().unwrap().state, TaskState::Executed);
        assert_eq!(task.run().unwrap().state, TaskState::UpToDate);
    }

    #[test]
    fn test_offline_without_cache_fails() {
        let temp = tempdir().unwrap();
        let source = SourceSpec::Single(Location::Remote("https://example.com/a".into()));
        let dest = temp.path().join("a");

        let report = DownloadTask::new(source, &dest, quiet().offline(true))
            .run()
            .unwrap();

        assert_eq!(report.state, TaskState::Failed);
        assert_eq!(report.exit_code(), 1);
        assert!(report.items.is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn test_earlier_items_survive_a_later_failure() {
        let temp = tempdir().unwrap();
        let present = temp.path().join("a.txt");
        std::fs::write(&present, "a").unwrap();
        let source = SourceSpec::parse_list(&[
            present.display().to_string(),
            temp.path().join("missing.txt").display().to_string(),
        ])
        .unwrap();
        let dest = temp.path().join("out");

        let report = DownloadTask::new(source, &dest, quiet()).run().unwrap();

        assert_eq!(report.state, TaskState::Failed);
        assert_eq!(report.items.len(), 1);
        assert!(dest.join("a.txt").exists());
        assert!(!dest.join("missing.txt").exists());
    }
}
