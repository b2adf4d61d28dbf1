use clap::Parser;
use smtpmock::{Configuration, Message, Server};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// Mock SMTP server for testing mail-sending code
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:2525")]
    listen: String,

    /// TOML file overriding response templates and policies
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let configuration = match cli.config.as_deref().map(Configuration::from_file) {
        Some(Ok(configuration)) => configuration,
        Some(Err(e)) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
        None => Configuration::default(),
    };

    let (tx, rx) = mpsc::channel::<Message>();
    let server = Server::new(configuration);

    thread::spawn(move || {
        let mut count = 0;
        while let Ok(message) = rx.recv() {
            count += 1;
            tracing::info!(
                count,
                from = message.mailfrom_email.as_deref(),
                to = ?message.rcptto_emails,
                subject = message.subject(),
                complete = message.is_consistent(),
                "message received"
            );
        }
    });

    if let Err(e) = server.start(cli.listen.as_str(), tx) {
        tracing::error!(error = %e, "failed to start server");
        std::process::exit(1);
    }
}
