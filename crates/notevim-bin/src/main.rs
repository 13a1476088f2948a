//! notevim entrypoint: run a Vim key script against a note file.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{ExHost, KeyResult, Session, StatusKind, StatusMessage, StatusSink};
use core_config::load_from;
use core_events::parse_keys;
use core_text::Buffer;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[cfg(feature = "system-clipboard")]
mod system_clipboard;

const LOG_FILE: &str = "notevim.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "notevim", version, about = "Vim-style modal editing for notes")]
struct Args {
    /// Note to edit. A missing file starts empty and is created on `:w`.
    pub path: PathBuf,
    /// Keys to feed, in Vim notation (e.g. `3dd:wq<CR>`).
    #[arg(long = "keys")]
    pub keys: Option<String>,
    /// Configuration file (overrides discovery of `notevim.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Directory for `notevim.log`; logs go to stderr when omitted.
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,
    /// Print the final buffer to stdout.
    #[arg(long = "print")]
    pub print: bool,
}

/// Ex host backed by the note file.
struct FileHost {
    path: PathBuf,
}

impl ExHost for FileHost {
    fn save(&mut self, text: &str) -> Result<()> {
        std::fs::write(&self.path, text)
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        info!(target: "runtime", path = %self.path.display(), size_bytes = text.len(), "note_written");
        Ok(())
    }

    fn quit(&mut self) {
        debug!(target: "runtime", path = %self.path.display(), "quit_requested");
    }
}

/// Status line replacement: messages go to stderr.
struct StderrStatus;

impl StatusSink for StderrStatus {
    fn post(&mut self, message: StatusMessage) {
        match message.kind {
            StatusKind::Info => eprintln!("{}", message.text),
            StatusKind::Error => eprintln!("E: {}", message.text),
        }
    }
}

fn configure_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let Some(dir) = log_dir else {
        // a subscriber may already be installed (tests); keep it
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log dir {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_buffer(path: &Path) -> Result<Buffer> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("note");
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(target: "runtime", file = %path.display(), size_bytes = content.len(), "file_read_ok");
            Buffer::from_str(name, &content)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(target: "runtime", file = %path.display(), "file_missing_starting_empty");
            Buffer::from_str(name, "")
        }
        Err(err) => Err(err).with_context(|| format!("cannot read {}", path.display())),
    }
}

/// Build the session for `args` and feed its key script. Keys after a quit
/// are not delivered.
fn run(args: &Args) -> Result<Session> {
    let config = load_from(args.config.clone())?;
    let options = config.options();
    let source = config.source.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime",
        config = source.as_deref(),
        shiftwidth = options.shiftwidth,
        report = options.report,
        "config_applied"
    );

    let session = Session::new(load_buffer(&args.path)?)
        .with_options(options)
        .with_status_sink(StderrStatus)
        .with_host(FileHost {
            path: args.path.clone(),
        });
    let mut session = attach_clipboard(session);

    let keys = match args.keys.as_deref() {
        Some(notation) => parse_keys(notation)?,
        None => Vec::new(),
    };
    for (idx, key) in keys.iter().enumerate() {
        if session.quit_requested() {
            debug!(target: "runtime", ignored = keys.len() - idx, "keys_after_quit_ignored");
            break;
        }
        let result = session.handle_key(key);
        trace!(target: "runtime", key = %key, ?result, "key_handled");
        if let KeyResult::Ex(Err(err)) = &result {
            warn!(target: "runtime", error = %err, "ex_command_failed");
        }
    }
    Ok(session)
}

#[cfg(feature = "system-clipboard")]
fn attach_clipboard(session: Session) -> Session {
    match system_clipboard::SystemClipboard::new() {
        Ok(clipboard) => session.with_clipboard(clipboard),
        Err(err) => {
            warn!(target: "runtime", error = %err, "system_clipboard_unavailable");
            session
        }
    }
}

#[cfg(not(feature = "system-clipboard"))]
fn attach_clipboard(session: Session) -> Session {
    session
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log_dir.as_deref())?;
    install_panic_hook();
    info!(target: "runtime", path = %args.path.display(), "startup");

    let session = run(&args)?;
    if args.print {
        print!("{}", session.text());
    }
    info!(
        target: "runtime",
        modified = session.is_modified(),
        quit = session.quit_requested(),
        mode = session.mode().name(),
        "shutdown"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(dir: &TempDir, file: &str, keys: &str) -> Args {
        Args {
            path: dir.path().join(file),
            keys: Some(keys.to_string()),
            // explicit missing file keeps a developer's notevim.toml out of the tests
            config: Some(dir.path().join("absent.toml")),
            log_dir: None,
            print: false,
        }
    }

    #[test]
    fn cli_flags_parse() {
        let args = Args::try_parse_from([
            "notevim",
            "todo.txt",
            "--keys",
            "dd:wq<CR>",
            "--log-dir",
            "logs",
            "--print",
        ])
        .unwrap();
        assert_eq!(args.path, PathBuf::from("todo.txt"));
        assert_eq!(args.keys.as_deref(), Some("dd:wq<CR>"));
        assert_eq!(args.log_dir, Some(PathBuf::from("logs")));
        assert!(args.print);
        assert!(args.config.is_none());
        assert!(Args::try_parse_from(["notevim"]).is_err());
    }

    #[test]
    fn write_quit_updates_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("note.txt"), "a\nb\n").unwrap();
        let session = run(&args(&dir, "note.txt", "dd:wq<CR>")).unwrap();
        assert!(session.quit_requested());
        assert!(!session.is_modified());
        let on_disk = std::fs::read_to_string(dir.path().join("note.txt")).unwrap();
        assert_eq!(on_disk, "b\n");
    }

    #[test]
    fn keys_after_quit_are_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("note.txt"), "abc\n").unwrap();
        let session = run(&args(&dir, "note.txt", ":q<CR>ihello<Esc>")).unwrap();
        assert!(session.quit_requested());
        assert_eq!(session.text(), "abc\n");
    }

    #[test]
    fn unsaved_quit_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("note.txt"), "abc\n").unwrap();
        let session = run(&args(&dir, "note.txt", "x:q<CR>")).unwrap();
        assert!(!session.quit_requested());
        assert!(session.is_modified());
        let on_disk = std::fs::read_to_string(dir.path().join("note.txt")).unwrap();
        assert_eq!(on_disk, "abc\n");
    }

    #[test]
    fn missing_file_is_created_on_write() {
        let dir = TempDir::new().unwrap();
        let session = run(&args(&dir, "new.txt", "ihi<Esc>:w<CR>")).unwrap();
        assert!(!session.quit_requested());
        let on_disk = std::fs::read_to_string(dir.path().join("new.txt")).unwrap();
        assert_eq!(on_disk, "hi");
    }

    #[test]
    fn config_file_options_apply() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("note.txt"), "a\n").unwrap();
        let config = dir.path().join("notevim.toml");
        std::fs::write(&config, "[editor]\nshiftwidth = 2\n").unwrap();
        let mut a = args(&dir, "note.txt", ">>:x<CR>");
        a.config = Some(config);
        let session = run(&a).unwrap();
        assert!(session.quit_requested());
        let on_disk = std::fs::read_to_string(dir.path().join("note.txt")).unwrap();
        assert_eq!(on_disk, "  a\n");
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut a = args(&dir, "note.txt", "");
        a.path = dir.path().to_path_buf();
        assert!(run(&a).is_err());
    }

    #[test]
    fn bad_key_notation_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(run(&args(&dir, "note.txt", "<Nope>")).is_err());
    }

    #[test]
    fn file_host_reports_write_failures() {
        let dir = TempDir::new().unwrap();
        let mut host = FileHost {
            path: dir.path().join("missing").join("note.txt"),
        };
        let err = host.save("x").unwrap_err();
        assert!(err.to_string().starts_with("cannot write"));
    }
}
