use anyhow::{Context, Result};
use clap::Parser;
use neurostream::app::App;
use neurostream::cli::Cli;
use neurostream::config::Config;
use neurostream::styles::init_theme;
use neurostream::utils::get_log_dir;

/// Set up panic hook to restore terminal state on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal state before handling panic
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        original_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subcommands print to the terminal and never start the TUI
    if cli.execute()? {
        return Ok(());
    }

    setup_panic_hook();

    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;
    let log_file = log_dir.join("neurostream.log");

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::never(&log_dir, "neurostream.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    eprintln!("Logs are being written to: {:?}", log_file);

    let config = Config::load_or_create(&cli.config_path()).context("Failed to load configuration")?;
    init_theme(config.theme.name);

    let mut app = App::new(&config, cli.skip_splash)?;
    let result = app.run();

    drop(app);
    drop(guard);

    result
}
