//! HFT Dashboard - Entry Point
//!
//! 1. Loads `.env` and the dashboard configuration (fatal on error)
//! 2. Initializes logging into the bot store (logs screen) and `LOG_FILE`
//! 3. Takes over the terminal and starts the dashboard
//! 4. Spawns terminal input, bot command and optional replay tasks
//! 5. Waits for `ctrl+c` (key or signal), then restores the terminal and
//!    repeats the exit message on it

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use hft_dashboard::config::constants::{config_path, replay_interval, replay_path};
use hft_dashboard::config::{init_logging, load_config, log_startup_error, LoggingConfig};
use hft_dashboard::core::{
    command_task, replay_task, BotCommand, BotStore, BusinessSnapshot, SnapshotProvider,
};
use hft_dashboard::tui::bindings::exit_notice;
use hft_dashboard::tui::event::forward_terminal_input;
use hft_dashboard::tui::terminal::{install_panic_hook, TerminalGuard};
use hft_dashboard::tui::{Dashboard, SystemLinkOpener, TerminalSurface};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Config
    // =========================================================================
    dotenvy::dotenv().ok();

    // Validated before the terminal is touched, so the error stays readable
    let path = config_path();
    let config = match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log_startup_error(&e, std::io::stderr);
            eprintln!("[ERROR] Configuration failed: {}", e);
            std::process::exit(1);
        }
    };

    // =========================================================================
    // 2. Bot store + logging
    // =========================================================================
    let (store, commands_rx) = BotStore::new(BusinessSnapshot::default(), config.log_capacity);
    init_logging(LoggingConfig::from_env(), Some(Arc::clone(&store)))?;
    info!(
        config = %path.display(),
        fps = config.fps,
        allow_clear_console = config.allow_clear_console,
        "Dashboard configuration loaded"
    );

    // =========================================================================
    // 3. Terminal + dashboard
    // =========================================================================
    install_panic_hook();
    let mut terminal = TerminalGuard::enter()?;

    let dashboard = match Dashboard::start(
        config,
        store.clone(),
        Box::new(TerminalSurface::stdout()),
        Arc::new(SystemLinkOpener),
    ) {
        Ok(handle) => handle,
        Err(e) => {
            terminal.cleanup();
            error!(error = %e, "Dashboard failed to start");
            eprintln!("[ERROR] Dashboard failed to start: {}", e);
            std::process::exit(1);
        }
    };

    // =========================================================================
    // 4. Background tasks
    // =========================================================================
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let input_handle = tokio::spawn(forward_terminal_input(
        dashboard.clone(),
        shutdown_tx.subscribe(),
    ));
    let command_handle = tokio::spawn(command_task(
        store.clone(),
        commands_rx,
        shutdown_tx.subscribe(),
    ));
    let replay_handle = replay_path().map(|replay| {
        let store = store.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        let interval = replay_interval();
        tokio::spawn(async move {
            if let Err(e) = replay_task(store, &replay, interval, shutdown_rx).await {
                error!(event_type = "REPLAY_FAILED", error = %e, "Snapshot replay failed");
            }
        })
    });

    // =========================================================================
    // 5. Wait for shutdown
    // =========================================================================
    tokio::select! {
        _ = dashboard.wait() => {}
        Ok(()) = tokio::signal::ctrl_c() => {
            info!("[SHUTDOWN] Interrupt signal received");
            store.set_status(BotCommand::Stop);
            dashboard.shutdown();
            dashboard.wait().await;
        }
    }

    info!("[SHUTDOWN] Graceful shutdown initiated");
    let _ = shutdown_tx.send(());

    match input_handle.await {
        Ok(Err(e)) => error!(error = %e, "Terminal input task failed"),
        Err(e) => error!(error = %e, "Terminal input task panicked"),
        Ok(Ok(())) => {}
    }
    let _ = command_handle.await;
    if let Some(handle) = replay_handle {
        let _ = handle.await;
    }

    terminal.cleanup();
    if let Some(line) = exit_notice(store.snapshot().status) {
        println!("{}", line);
    }
    info!("[SHUTDOWN] Clean exit");
    Ok(())
}
