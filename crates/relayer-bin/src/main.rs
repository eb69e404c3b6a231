use anyhow::{Context, Result};
use clap::{Arg, Command};
use relay_config::Config;
use relay_telemetry::trace;
use relayer::runner;
use std::{env, fs, path::Path};

const COMMAND_RUN: &str = "run";
const COMMAND_EXAMPLE_CONFIG: &str = "generate-example-config";
const ARG_OUTPUT_PATH: &str = "output-path";
const ARG_CONFIG: &str = "config";

fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read(&path)
        .with_context(|| format!("read config file from {}", path.as_ref().to_string_lossy()))?;
    let config = toml::from_slice(&content).with_context(|| "parse config file")?;
    Ok(config)
}

fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = Config::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}

async fn run_cli() -> Result<()> {
    let app = Command::new("relayer")
        .about("Relays batches and verifies state roots between L1 and L2.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new(COMMAND_RUN)
                .about("Run the relayer")
                .arg(
                    Arg::new(ARG_CONFIG)
                        .short('c')
                        .takes_value(true)
                        .required(true)
                        .default_value("./config.toml")
                        .help("The config file path"),
                )
                .display_order(0),
        )
        .subcommand(
            Command::new(COMMAND_EXAMPLE_CONFIG)
                .about("Generate an example config file")
                .arg(
                    Arg::new(ARG_OUTPUT_PATH)
                        .short('o')
                        .takes_value(true)
                        .required(true)
                        .default_value("./config.example.toml")
                        .help("The path of the example config file"),
                )
                .display_order(1),
        );

    let matches = app.get_matches();
    match matches.subcommand() {
        Some((COMMAND_EXAMPLE_CONFIG, m)) => {
            let path = m
                .value_of(ARG_OUTPUT_PATH)
                .context("missing output path")?;
            let _guard = trace::init(None)?;
            generate_example_config(path)?;
        }
        Some((COMMAND_RUN, m)) => {
            let config_path = m.value_of(ARG_CONFIG).context("missing config path")?;
            let config = read_config(config_path)?;
            let _guard = trace::init(config.trace)?;
            runner::run(config).await?;
        }
        _ => {
            // default command: run with ./config.toml
            let config = read_config("./config.toml")?;
            let _guard = trace::init(config.trace)?;
            runner::run(config).await?;
        }
    };
    Ok(())
}

fn main() -> Result<()> {
    let threads = match env::var("RELAYER_THREADS") {
        Err(env::VarError::NotPresent) => num_cpus::get(),
        Err(e) => return Err(e.into()),
        Ok(v) => v.parse()?,
    };
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()?;

    rt.block_on(run_cli())
}
