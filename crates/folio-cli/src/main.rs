// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use folio_app::AppState;
use runtime::{ApiRuntime, DEMO_RECORD_COUNT, DemoRuntime};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `folio --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        return run_check(&backend_client(&options, &config)?);
    }

    let source = record_source(&options, &config)?;
    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %options.config_path.display(),
        log = %log_path.display(),
        "folio starting"
    );

    let mut state = AppState::with_page_size(config.page_size());
    state.filters_visible = config.show_filters();

    match source {
        RecordSourceKind::Demo => {
            let mut runtime = DemoRuntime::new(DEMO_RECORD_COUNT);
            folio_tui::run_app(&mut state, &mut runtime)
        }
        RecordSourceKind::Api(client) => {
            info!(base_url = client.base_url(), "using portfolio backend");
            let mut runtime = ApiRuntime::new(client);
            folio_tui::run_app(&mut state, &mut runtime)
        }
    }
}

enum RecordSourceKind {
    Demo,
    Api(folio_api::Client),
}

/// Demo mode never touches the backend settings.
fn record_source(options: &CliOptions, config: &Config) -> Result<RecordSourceKind> {
    if options.demo {
        return Ok(RecordSourceKind::Demo);
    }
    backend_client(options, config).map(RecordSourceKind::Api)
}

fn backend_client(options: &CliOptions, config: &Config) -> Result<folio_api::Client> {
    let base_url = match &options.api_url {
        Some(url) => {
            config::validate_base_url(url).context("invalid --api-url")?;
            url.trim_end_matches('/').to_owned()
        }
        None => config.api_base_url(),
    };
    folio_api::Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })
}

fn run_check(client: &folio_api::Client) -> Result<()> {
    let health = client.ping()?;
    println!("backend {}: {health}", client.base_url());
    let records = client
        .fetch_records()
        .map_err(|error| anyhow!("fetch records: {error}"))?;
    println!("fetched {} records", records.len());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_url: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        api_url: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--api-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--api-url requires a URL"))?;
                options.api_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("folio {}", env!("CARGO_PKG_VERSION"));
    println!("  --config <path>          Use a specific config path");
    println!("  --api-url <url>          Override the backend base URL");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse generated records without a backend");
    println!("  --check                  Validate config, ping the backend and fetch once");
    println!("  --help                   Show this help");
}
