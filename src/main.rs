use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use parking_lot::Mutex;
use tracing::{info, warn};

use hotkey_dispatch::config::{
    default_config_path, default_shortcuts_path, load_config, JsonConfigStore, RunMode,
    DEFAULT_FORCE_EXIT_GRACE_MS,
};
use hotkey_dispatch::hotkeys::{spawn_event_bridge, BindingRegistry, GlobalHotkeyBackend};
use hotkey_dispatch::host::DesktopHost;
use hotkey_dispatch::shortcuts::load_into_keymap;
use hotkey_dispatch::{bind_keymap, logging, AppError, DispatchOptions, Dispatcher, Keymap};

#[derive(Debug, Parser)]
#[command(name = "hotkey-dispatch", version, about = "Global hotkeys for a screenshot assistant")]
struct Cli {
    /// Config file (defaults to ~/.hotkey-dispatch/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shortcut overrides file (defaults to ~/.hotkey-dispatch/shortcuts.json)
    #[arg(long)]
    shortcuts: Option<PathBuf>,

    /// Development mode: force-exit shortly after Quit
    #[arg(long)]
    dev: bool,

    /// Print the effective keymap and exit
    #[arg(long)]
    print_keymap: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let shortcuts_path = cli.shortcuts.unwrap_or_else(default_shortcuts_path);
    let mut keymap = Keymap::defaults();
    let applied = load_into_keymap(&shortcuts_path, &mut keymap);
    info!(applied, path = %shortcuts_path.display(), "Shortcut overrides loaded");

    if cli.print_keymap {
        print_keymap(&keymap);
        return Ok(());
    }

    let run_mode = if cli.dev {
        RunMode::Development
    } else {
        RunMode::from_env()
    };
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path);
    info!(?run_mode, config = %config_path.display(), "Starting hotkey-dispatch");

    // NOTE: The hotkey manager must be created on the main thread
    let backend = match GlobalHotkeyBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            let err = AppError::HotkeyManager(e.to_string());
            let severity = format!("{:?}", err.severity());
            logging::log_error("startup", &err.user_message(), Some(&severity));
            return Err(err).context("Failed to initialize the global hotkey manager");
        }
    };
    let registry = Arc::new(Mutex::new(BindingRegistry::new(Box::new(backend))));
    let report = bind_keymap(&mut registry.lock(), &keymap);
    if report.bound.is_empty() {
        warn!("No shortcuts could be bound");
    }

    let host = Arc::new(DesktopHost::new(
        &config,
        JsonConfigStore::new(config_path),
        Box::new(std::io::stdout()),
    ));
    let options = DispatchOptions {
        run_mode,
        force_exit_grace: Duration::from_millis(DEFAULT_FORCE_EXIT_GRACE_MS),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the async runtime")?;

    runtime.block_on(async {
        let dispatcher = Dispatcher::new(Arc::clone(&host), registry, options);
        run(&dispatcher, &host).await;
        let released = dispatcher.will_quit();
        info!(released, "Shutdown complete");
    });
    Ok(())
}

/// Dispatch hotkey presses until the app quits or the process is signalled.
async fn run(dispatcher: &Dispatcher<DesktopHost>, host: &DesktopHost) {
    let events = spawn_event_bridge();
    let quit = host.shutdown_signal();
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(hotkey_id) => {
                    dispatcher.dispatch_hotkey(hotkey_id);
                }
                Err(_) => {
                    warn!("Hotkey event bridge stopped");
                    break;
                }
            },
            _ = quit.notified() => {
                info!("Quit requested");
                break;
            }
            _ = &mut signal => {
                info!("Termination signal received");
                break;
            }
        }
    }
}

fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
    }
}

fn print_keymap(keymap: &Keymap) {
    for entry in keymap.entries() {
        let combos = match keymap.effective_combos(&entry.id) {
            Some(combos) => combos.join(" | "),
            None => "(disabled)".to_string(),
        };
        println!("{:<24} {:<40} {}", entry.id, combos, entry.action.description());
    }
}
