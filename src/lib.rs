pub mod commands;
pub mod config;
pub mod core_state;
pub mod directory; // Mock data store
pub mod error;
pub mod identity; // Phone → role resolver
pub mod lifecycle; // Appointment status machine + views
pub mod models;
pub mod notify;
pub mod session;
pub mod shell;

use std::io;

use tracing_subscriber::EnvFilter;

/// Console entry point used by the `carepulse` binary.
pub fn run() -> io::Result<()> {
    // Logs go to stderr so they never interleave with shell output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let state = core_state::CoreState::from_env();
    if let Some(user) = commands::session::restore_session(&state) {
        tracing::info!(user_id = %user.id, "Resumed previous session");
    }

    // Backend sweep: the only path that marks visits completed. Not exposed
    // as a shell command.
    let today = chrono::Local::now().date_naive();
    if let Err(e) = commands::appointment::complete_elapsed_appointments(&state, today) {
        tracing::warn!(error = %e, "Completion sweep failed");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell::run_loop(&state, stdin.lock(), &mut stdout)
}
