use option_pricer::config::{AppConfig, OutputFormat};
use option_pricer::{OptionPricer, Pricer};

fn main() {
    // Structured logging on stderr; stdout carries only the prices.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    tracing::info!(model = %cfg.model, "option pricer starting");

    let mut pricer = match Pricer::from_config(&cfg) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("pricer error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let quote = pricer.quote();
    match cfg.output {
        OutputFormat::Text => {
            println!("Call Option Price: {}", quote.call);
            println!("Put Option Price: {}", quote.put);
        }
        OutputFormat::Json => match serde_json::to_string(&quote) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                tracing::error!("serialize error: {e}");
                std::process::exit(1);
            }
        },
    }
}
