//! Argument parsing and commands for the `pakfs` binary.
//!
//! The binary builds one [`PackageManager`] from a config file plus any
//! mounts given on the command line, runs a single query against it and
//! exits. Everything here writes to a caller-supplied writer so it can be
//! driven from tests.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::slice;

use anyhow::{bail, Context, Result};
use pakfs_core::{EntryTypes, PackageConfig, PackageKind, PackageManager, PackageSpec, ROOT};

/// How a command finished, for the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The query ran but found nothing.
    Missing,
}

/// A single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Mounts,
    Pwd,
    Ls { dir: String },
    Find { filter: String, types: EntryTypes },
    Cat { path: String },
    Stat { path: String },
    Exists { path: String },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    /// Mounts from `--archive`/`--dir`, applied after configured packages.
    pub packages: Vec<PackageSpec>,
    pub cwd: Option<String>,
    pub ignore_case: bool,
    pub command: Command,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            config: None,
            root: None,
            packages: Vec::new(),
            cwd: None,
            ignore_case: false,
            command: Command::Help,
        }
    }
}

/// Parse arguments, not including the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut invocation = Invocation::default();
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg.as_str(), None),
        };

        match flag {
            "-h" | "--help" => {
                invocation.command = Command::Help;
                return Ok(invocation);
            }
            "-V" | "--version" => {
                invocation.command = Command::Version;
                return Ok(invocation);
            }
            "-c" | "--config" => {
                invocation.config = Some(take_value(flag, inline, &mut rest)?.into());
            }
            "-r" | "--root" => {
                invocation.root = Some(take_value(flag, inline, &mut rest)?.into());
            }
            "-a" | "--archive" => {
                let value = take_value(flag, inline, &mut rest)?;
                invocation.packages.push(parse_mount(PackageKind::Archive, &value)?);
            }
            "-d" | "--dir" => {
                let value = take_value(flag, inline, &mut rest)?;
                invocation.packages.push(parse_mount(PackageKind::Directory, &value)?);
            }
            "-C" | "--cd" => {
                invocation.cwd = Some(take_value(flag, inline, &mut rest)?);
            }
            "-i" | "--ignore-case" => invocation.ignore_case = true,
            name if !name.starts_with('-') => {
                invocation.command = parse_command(name, rest.as_slice())?;
                return Ok(invocation);
            }
            unknown => bail!("unknown option: {unknown}"),
        }
    }

    bail!("no command given (try --help)")
}

fn take_value(flag: &str, inline: Option<&str>, rest: &mut slice::Iter<'_, String>) -> Result<String> {
    match inline {
        Some(value) => Ok(value.to_string()),
        None => rest
            .next()
            .cloned()
            .with_context(|| format!("{flag} requires a value")),
    }
}

/// `SRC[:MOUNT]`, where MOUNT must start with `/`.
fn parse_mount(kind: PackageKind, value: &str) -> Result<PackageSpec> {
    let (source, mount) = match value.rsplit_once(':') {
        Some((source, mount)) if mount.starts_with('/') => (source, mount),
        _ => (value, ROOT),
    };
    if source.is_empty() {
        bail!("missing source in {value:?}");
    }
    Ok(PackageSpec {
        kind,
        source: source.into(),
        mount: mount.to_string(),
    })
}

fn parse_command(name: &str, args: &[String]) -> Result<Command> {
    let mut positional = Vec::new();
    let mut types = EntryTypes::files_only();

    for arg in args {
        match arg.as_str() {
            "--dirs" if name == "find" => types = EntryTypes::dirs_only(),
            "--all" if name == "find" => types = EntryTypes::all(),
            flag if flag.starts_with("--") => bail!("unknown option for {name}: {flag}"),
            _ => positional.push(arg.clone()),
        }
    }

    let command = match name {
        "help" => Command::Help,
        "mounts" => {
            no_arguments(name, &positional)?;
            Command::Mounts
        }
        "pwd" => {
            no_arguments(name, &positional)?;
            Command::Pwd
        }
        "ls" => Command::Ls {
            dir: at_most_one(name, positional)?.unwrap_or_else(|| ".".to_string()),
        },
        "find" => Command::Find {
            filter: exactly_one(name, "a FILTER", positional)?,
            types,
        },
        "cat" => Command::Cat {
            path: exactly_one(name, "a PATH", positional)?,
        },
        "stat" => Command::Stat {
            path: exactly_one(name, "a PATH", positional)?,
        },
        "exists" => Command::Exists {
            path: exactly_one(name, "a PATH", positional)?,
        },
        other => bail!("unknown command: {other}"),
    };
    Ok(command)
}

fn no_arguments(name: &str, positional: &[String]) -> Result<()> {
    if !positional.is_empty() {
        bail!("{name} takes no arguments");
    }
    Ok(())
}

fn at_most_one(name: &str, mut positional: Vec<String>) -> Result<Option<String>> {
    if positional.len() > 1 {
        bail!("{name} takes at most one argument");
    }
    Ok(positional.pop())
}

fn exactly_one(name: &str, what: &str, positional: Vec<String>) -> Result<String> {
    at_most_one(name, positional)?.with_context(|| format!("{name} requires {what}"))
}

/// Build a manager: configured packages first, then command-line mounts.
///
/// Without `--config` the default config file is used if it exists.
/// A configured package that fails to mount is skipped; a command-line
/// mount that fails is an error.
pub fn build_manager(invocation: &Invocation) -> Result<PackageManager> {
    let mut config = match &invocation.config {
        Some(path) => PackageConfig::load_from(path)?,
        None => PackageConfig::load()?,
    };
    if let Some(root) = &invocation.root {
        config.root_folder = root.clone();
    }
    if invocation.ignore_case {
        config.case_insensitive_search = true;
    }

    let mut manager = PackageManager::from_config(&config);
    for spec in &invocation.packages {
        let loaded = match spec.kind {
            PackageKind::Archive => manager.load_package(&spec.source, &spec.mount),
            PackageKind::Directory => manager.load_directory_as_package(&spec.source, &spec.mount),
        };
        loaded.with_context(|| format!("failed to mount {}", spec.source.display()))?;
    }

    if let Some(dir) = &invocation.cwd {
        manager.change_directory(dir);
    }
    tracing::debug!(
        mounts = manager.mount_table().len(),
        cwd = manager.current_directory(),
        "manager ready"
    );
    Ok(manager)
}

/// Parse `args`, build a manager and run the command.
pub fn run(args: &[String], out: &mut impl Write) -> Result<Status> {
    let invocation = parse_args(args)?;
    match invocation.command {
        Command::Help => {
            write_help(out)?;
            Ok(Status::Success)
        }
        Command::Version => {
            writeln!(out, "pakfs {}", env!("CARGO_PKG_VERSION"))?;
            Ok(Status::Success)
        }
        _ => {
            let manager = build_manager(&invocation)?;
            execute(&manager, &invocation.command, out)
        }
    }
}

/// Run one command against a manager.
pub fn execute(manager: &PackageManager, command: &Command, out: &mut impl Write) -> Result<Status> {
    match command {
        Command::Help => {
            write_help(out)?;
            Ok(Status::Success)
        }
        Command::Version => {
            writeln!(out, "pakfs {}", env!("CARGO_PKG_VERSION"))?;
            Ok(Status::Success)
        }
        Command::Mounts => {
            for info in manager.mounts() {
                let source = info
                    .source
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(out, "{}\t{}\t{}", info.path, info.kind, source)?;
            }
            Ok(Status::Success)
        }
        Command::Pwd => {
            writeln!(out, "{}", manager.current_directory())?;
            Ok(Status::Success)
        }
        Command::Ls { dir } => list(manager, dir, out),
        Command::Find { filter, types } => {
            let hits = manager.search(filter, "", *types)?;
            for hit in &hits {
                writeln!(out, "{}", hit.path())?;
            }
            Ok(found(!hits.is_empty()))
        }
        Command::Cat { path } => {
            let data = manager
                .read_file(path)
                .with_context(|| format!("no such file: {path}"))?;
            out.write_all(&data)?;
            Ok(Status::Success)
        }
        Command::Stat { path } => {
            let size = manager
                .file_size(path)
                .with_context(|| format!("no such file: {path}"))?;
            writeln!(out, "{}\t{size}", manager.absolute_path(path))?;
            Ok(Status::Success)
        }
        Command::Exists { path } => Ok(found(manager.file_exists(path))),
    }
}

fn found(any: bool) -> Status {
    if any { Status::Success } else { Status::Missing }
}

/// Immediate children of `dir` across all mounts, merged and sorted.
/// Mount points directly below `dir` are listed as directories.
fn list(manager: &PackageManager, dir: &str, out: &mut impl Write) -> Result<Status> {
    let base = manager.absolute_path(dir);
    let prefix = if base == ROOT {
        base.clone()
    } else {
        format!("{base}/")
    };

    let filter = format!("{}*", pakfs_glob::escape(&prefix));
    let hits = manager.search(&filter, "", EntryTypes::all())?;
    let mut entries: BTreeSet<String> = hits
        .iter()
        .filter_map(|hit| {
            let path = hit.path();
            let rest = path.strip_prefix(&prefix)?;
            let child = rest.strip_suffix('/').unwrap_or(rest);
            (!child.is_empty() && !child.contains('/')).then(|| rest.to_string())
        })
        .collect();

    for info in manager.mounts() {
        match info.path.strip_prefix(&prefix) {
            Some(rest) if !rest.is_empty() && !rest.contains('/') => {
                entries.insert(format!("{rest}/"));
            }
            _ => {}
        }
    }

    for entry in &entries {
        writeln!(out, "{entry}")?;
    }
    Ok(found(!entries.is_empty()))
}

fn write_help(out: &mut impl Write) -> Result<()> {
    write!(
        out,
        r#"pakfs v{}

Usage:
  pakfs [OPTIONS] <COMMAND> [ARGS]

Commands:
  mounts                       List mounts in precedence order
  pwd                          Print the current directory
  ls [DIR]                     List the entries directly under DIR
  find FILTER [--dirs|--all]   Search all mounts (files only by default)
  cat PATH                     Write a file to stdout
  stat PATH                    Print a file's size in bytes
  exists PATH                  Exit 0 if the file exists, 1 otherwise

Options:
  -c, --config <file>          Config file (default: ~/.config/pakfs/packages.toml)
  -r, --root <dir>             Base directory for relative sources
  -a, --archive <src[:mount]>  Mount a zip archive (lowest precedence)
  -d, --dir <src[:mount]>      Mount a directory (highest precedence)
  -C, --cd <dir>               Start in this logical directory
  -i, --ignore-case            Case-insensitive search
  -h, --help                   Show this help
  -V, --version                Show version

Logging is controlled by RUST_LOG, e.g. RUST_LOG=pakfs_core=debug.
"#,
        env!("CARGO_PKG_VERSION")
    )?;
    Ok(())
}
