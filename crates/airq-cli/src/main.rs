// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use airq_app::{AppCommand, AppState, LocationId, Section, StaticCatalog};
use airq_tui::AppRuntime;
use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::PredictRuntime;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;

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
            "load config {}; run `airq --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())?;

    let base_url = config.base_url();
    let client = airq_client::Client::new(&base_url, config.timeout()?).with_context(|| {
        format!(
            "invalid [service] config in {}; fix base_url/timeout or AIRQ_PREDICT_URL",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        return Ok(());
    }

    let today = OffsetDateTime::now_utc().date();
    let section = options.section.unwrap_or_else(|| config.default_section());
    let location = options
        .location
        .map(LocationId::new)
        .unwrap_or_else(|| config.default_location());
    tracing::info!(
        %base_url,
        section = section.as_str(),
        %location,
        log = %log_path.display(),
        "starting airq"
    );

    let mut runtime = PredictRuntime::new(StaticCatalog::builtin(today), client);
    let mut state = AppState::new(section, config.confirm_discard());
    state.dispatch(runtime.catalog(), AppCommand::SelectLocation(location));
    airq_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    location: Option<String>,
    section: Option<Section>,
    print_config_path: bool,
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
        location: None,
        section: None,
        print_config_path: false,
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
            "--location" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--location requires a location id"))?;
                options.location = Some(value.as_ref().trim().to_owned());
            }
            "--section" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--section requires enterprise or individual"))?;
                let section = Section::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown section {:?}; use enterprise or individual",
                        value.as_ref()
                    )
                })?;
                options.section = Some(section);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
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
    println!("airq - air quality readings and forecasts");
    println!("  --config <path>          Use a specific config path");
    println!("  --location <id>          Start on this location (for example paris)");
    println!("  --section <name>         Start in the enterprise or individual section");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and the service client, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use airq_app::Section;
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/airq-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                location: None,
                section: None,
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for (flag, hint) in [
            ("--config", "requires a file path"),
            ("--location", "requires a location id"),
            ("--section", "requires enterprise or individual"),
        ] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(hint), "{flag}: {error}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_reads_location_and_section() -> Result<()> {
        let options = parse_cli_args(
            vec!["--location", "paris", "--section", "individual"],
            default_options_path(),
        )?;
        assert_eq!(options.location.as_deref(), Some("paris"));
        assert_eq!(options.section, Some(Section::Individual));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_unknown_section() {
        let error = parse_cli_args(vec!["--section", "both"], default_options_path())
            .expect_err("unknown section should fail");
        assert!(error.to_string().contains("unknown section"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
