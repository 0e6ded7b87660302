use std::{fs::read_to_string, path::PathBuf};

use clap::Parser;
use common::config::PlotConfig;
use eyre::{Context, Result};
use tracing::{debug, error};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Draws speedup, efficiency, throughput and latency charts from matrix
/// multiplication benchmark results
#[derive(Parser)]
struct Cli {
    /// Benchmark results CSV [default: benchmark_results.csv]
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Directory for the charts [default: graphs]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// YAML file with plot settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Extra tracing filter directives, ie. common=trace
    #[arg(short, long)]
    log: Vec<String>,
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("matmul_plots={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    if !args.log.iter().any(|x| x.starts_with("common")) {
        env_filter = env_filter.add_directive(format!("common={log_level}").parse()?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    let config = resolve_config(args)?;
    debug!("Plot config: {config:?}");
    match common::generate_with(&config) {
        Ok(written) => {
            println!(
                "Wrote {} charts to {}",
                written.len(),
                config.output_dir.display()
            );
            Ok(())
        }
        Err(err) => {
            error!("{err:#?}");
            Err(err)
        }
    }
}

/// Command line flags win over the config file, which wins over the defaults
fn resolve_config(args: Cli) -> Result<PlotConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read_to_string(path).wrap_err_with(|| format!("Read config {path:?}"))?;
            serde_yml::from_str(&text).wrap_err_with(|| format!("Parse config {path:?}"))?
        }
        None => PlotConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    Ok(config)
}
