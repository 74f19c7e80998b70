use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ztabs::kernel::services::adapters::{
    ensure_session_dir, ensure_settings_file, get_session_file_path, load_settings,
    BusStatusRefresher, FileWatcherService, LocalFileStore, RopeModelFactory, TokioSaveTimer,
};
use ztabs::kernel::services::ports::{FileStore, Settings};
use ztabs::kernel::services::{engine_bus, EngineBusReceiver};
use ztabs::kernel::tabs::kinds::register_builtin_kinds;
use ztabs::kernel::tabs::{OpenOptions, TabSource, TabTypeRegistry};
use ztabs::kernel::{EngineServices, Handled, Workbench};

mod logging;

const EVENT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Args {
    files: Vec<PathBuf>,
    /// Skip restoring the stored session.
    fresh: bool,
    /// Keep processing file and save events for this long before exiting.
    watch: Option<Duration>,
    verbose: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut out = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fresh" => out.fresh = true,
                "-v" | "--verbose" => out.verbose = true,
                "--watch" => {
                    let secs = args
                        .next()
                        .ok_or_else(|| "--watch needs a number of seconds".to_string())?;
                    let secs: u64 = secs
                        .parse()
                        .map_err(|_| format!("invalid --watch value: {secs}"))?;
                    out.watch = Some(Duration::from_secs(secs));
                }
                "-h" | "--help" => return Err(usage()),
                other if other.starts_with('-') => return Err(format!("unknown flag: {other}")),
                other => out.files.push(PathBuf::from(other)),
            }
        }
        Ok(out)
    }
}

fn usage() -> String {
    "usage: ztabs [--fresh] [--watch SECS] [-v] [FILE...]".to_string()
}

fn main() -> std::io::Result<()> {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let logging = logging::init(args.verbose);
    if args.verbose {
        if let Some(guard) = logging.as_ref() {
            eprintln!("logs: {}", guard.log_dir().display());
        }
    }

    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "cannot create settings file");
    }
    let settings = load_settings().unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let workspace = std::env::current_dir()?;
    runtime.block_on(run(args, settings, workspace))
}

async fn run(args: Args, settings: Settings, workspace: PathBuf) -> std::io::Result<()> {
    let (tx, mut rx) = engine_bus();
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new());
    let services = EngineServices {
        files: Arc::clone(&files),
        timer: Arc::new(TokioSaveTimer::new(
            tokio::runtime::Handle::current(),
            tx.clone(),
        )),
        status: Arc::new(BusStatusRefresher::new(tx)),
        models: Arc::new(RopeModelFactory::new()),
    };
    let mut registry = TabTypeRegistry::new();
    register_builtin_kinds(&mut registry);
    let mut wb = Workbench::new(settings.engine.clone(), registry, services);

    let session_path = get_session_file_path(&workspace);
    if settings.session.restore && !args.fresh {
        if let Some(path) = &session_path {
            match wb.load_session(path).await {
                Ok(Some(report)) if !report.failures.is_empty() => {
                    tracing::warn!(failed = report.failures.len(), "some tabs could not be restored");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "session not restored"),
            }
        }
    }

    for file in &args.files {
        let path = std::path::absolute(file).unwrap_or_else(|_| file.clone());
        if let Err(e) = open_path(&mut wb, files.as_ref(), &path).await {
            eprintln!("{}: {e}", path.display());
        }
    }

    let mut watcher = match FileWatcherService::new(&workspace) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable");
            None
        }
    };
    if let Some(watcher) = watcher.as_mut() {
        let tracked = wb.content().tracked_paths();
        watcher.sync_paths(tracked.iter().map(PathBuf::as_path));
    }

    if let Some(window) = args.watch {
        let deadline = Instant::now() + window;
        while Instant::now() < deadline {
            tokio::time::sleep(EVENT_TICK).await;
            pump(&mut wb, &mut rx, watcher.as_mut()).await;
        }
    }
    pump(&mut wb, &mut rx, watcher.as_mut()).await;

    if settings.session.save_dirty_on_exit {
        for (path, outcome) in wb.save_all().await {
            if !outcome.is_ok() {
                eprintln!("{}: not saved ({outcome:?})", path.display());
            }
        }
    }

    if let Some(path) = &session_path {
        match ensure_session_dir() {
            Ok(_) => {
                if let Err(e) = wb.write_session(path).await {
                    tracing::warn!(path = %path.display(), error = %e, "session not saved");
                }
            }
            Err(e) => tracing::warn!(error = %e, "cannot create session directory"),
        }
    }

    print_summary(&wb);
    wb.teardown();
    Ok(())
}

async fn open_path(
    wb: &mut Workbench,
    files: &dyn FileStore,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = files.read_file_bytes(path).await?;
    let source = match String::from_utf8(bytes) {
        Ok(content) => TabSource::file(path, content),
        Err(e) => TabSource::Bytes {
            path: path.to_path_buf(),
            bytes: e.into_bytes(),
        },
    };
    let opened = wb.open_tab(source, OpenOptions::new())?;
    tracing::info!(tab = %opened.key.tab, reused = opened.reused, path = %path.display(), "opened");
    Ok(())
}

/// Handles everything queued on the bus and the watcher.
async fn pump(
    wb: &mut Workbench,
    rx: &mut EngineBusReceiver,
    mut watcher: Option<&mut FileWatcherService>,
) {
    let mut messages = rx.drain();
    if let Some(watcher) = watcher.as_deref_mut() {
        messages.extend(watcher.drain_events());
    }
    for msg in messages {
        match wb.handle_message(msg).await {
            Handled::Saved { path, outcome } if outcome.is_ok() => {
                if let Some(watcher) = watcher.as_deref_mut() {
                    watcher.acknowledge_write(&path);
                }
            }
            Handled::Reloaded { path, tabs } if tabs > 0 => {
                tracing::info!(path = %path.display(), tabs, "reloaded from disk");
            }
            _ => {}
        }
    }
}

fn print_summary(wb: &Workbench) {
    let panes = wb.panes();
    for pane_id in panes.leaves() {
        let Some(pane) = panes.pane(pane_id) else {
            continue;
        };
        let marker = if pane_id == panes.active_pane() { "*" } else { " " };
        println!("{marker} {pane_id}");
        for tab in pane.tabs() {
            let active = if pane.active_tab_id() == Some(tab.id) { ">" } else { " " };
            println!("  {active} {} [{}]", tab.display_title(), tab.kind());
        }
    }
}
