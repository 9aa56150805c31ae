//! Fetch CLI - fetch files only when they are missing or stale
//!
//! Usage:
//!   fetch <SRC>... -d <DEST>                 Fetch one or more files
//!   fetch <SRC> -m <MIRROR>... -d <DEST>     Fetch one file with mirrors
//!   fetch -c fetch.toml                      Fetch as described by a task file
//!
//! Exit status is 0 when the task executed or was up to date, 1 otherwise.

use anyhow::{Context, Result, bail};
use clap::Parser;
use clap::builder::BoolishValueParser;
use levitate_fetch::{DownloadTask, SrcEntryToml, SrcToml, TaskFile, output};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fetch")]
#[command(about = "Fetch files only when missing or stale, with mirror failover")]
#[command(version)]
struct Cli {
    /// Source URLs or local paths; several sources fetch several files
    src: Vec<String>,

    /// Destination file, or directory for several sources
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Alternate location for the single source (repeatable, tried in order)
    #[arg(short, long = "mirror")]
    mirrors: Vec<String>,

    /// TOML task file; command-line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace an existing destination (the default)
    #[arg(long, overrides_with = "no_overwrite")]
    overwrite: bool,

    /// Keep an existing destination instead of fetching again
    #[arg(long, overrides_with = "overwrite")]
    no_overwrite: bool,

    /// Fetch only when the source is newer than the destination
    #[arg(long, overrides_with = "no_only_if_newer")]
    only_if_newer: bool,

    /// Ignore `only_if_newer` from a task file
    #[arg(long, overrides_with = "only_if_newer")]
    no_only_if_newer: bool,

    /// Never touch the network; keep whatever is already there
    #[arg(
        long,
        env = "FETCH_OFFLINE",
        action = clap::ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    offline: bool,

    /// Suppress progress bars and status lines
    #[arg(short, long)]
    quiet: bool,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Basic auth user name
    #[arg(long)]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, env = "FETCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// HTTP connect/read timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Print the task report as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// A `--flag` / `--no-flag` pair as an override: `None` when neither was given.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {:?}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {:?}", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl Cli {
    /// Command-line values as a task file layer; unset flags stay `None`.
    fn task_layer(&self) -> Result<TaskFile> {
        let (src, mirrors) = match (self.src.as_slice(), self.mirrors.is_empty()) {
            ([], true) => (None, None),
            ([], false) => (None, Some(self.mirrors.clone())),
            ([primary], false) => {
                let mut all = vec![primary.clone()];
                all.extend(self.mirrors.iter().cloned());
                (None, Some(all))
            }
            (_, false) => bail!("--mirror needs exactly one source"),
            ([single], true) => (Some(SrcToml::One(single.clone())), None),
            (many, true) => (
                Some(SrcToml::Many(
                    many.iter().cloned().map(SrcEntryToml::Location).collect(),
                )),
                None,
            ),
        };

        let headers = (!self.headers.is_empty())
            .then(|| self.headers.iter().cloned().collect::<BTreeMap<_, _>>());

        Ok(TaskFile {
            src,
            mirrors,
            dest: self.dest.clone(),
            overwrite: flag_pair(self.overwrite, self.no_overwrite),
            only_if_newer: flag_pair(self.only_if_newer, self.no_only_if_newer),
            quiet: (self.quiet || self.json).then_some(true),
            timeout_secs: self.timeout,
            user_agent: self.user_agent.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            headers,
        })
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut file = match &cli.config {
        Some(path) => TaskFile::load(path)
            .with_context(|| format!("Failed to load task file {}", path.display()))?,
        None => TaskFile::default(),
    };
    file.merge(cli.task_layer()?);

    let source = file.source_spec().context("No usable source")?;
    let dest = file.destination().context("No destination")?;
    let options = file.options().offline(cli.offline);

    if options.offline && !options.quiet {
        output::info("Offline mode: the network will not be used");
    }

    let report = DownloadTask::new(source, dest, options)
        .run()
        .context("Invalid fetch task")?;

    if cli.json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    }

    Ok(ExitCode::from(report.exit_code()))
}
