// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use greffe_api::Client;
use greffe_app::{AppState, DocumentFormat, DossierId, ReferenceListKind, validate_transfer};
use runtime::ApiRuntime;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
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
            "load config {}; run `greffe --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::setup_tracing(&config)?;

    let client = Client::new(config.base_url(), config.timeout()?, config.token())
        .with_context(|| {
            format!(
                "invalid [server] config in {}; fix base_url/timeout/token values",
                options.config_path.display()
            )
        })?;

    if options.check_only {
        client.fetch_parametres()?;
        info!(base_url = client.base_url(), "configuration check passed");
        return Ok(());
    }

    let download_dir = match &options.out_dir {
        Some(dir) => dir.clone(),
        None => config.download_dir()?,
    };

    if let Some(command) = &options.command {
        let stdout = io::stdout();
        return run_command(&client, command, &download_dir, &mut stdout.lock());
    }

    let mut state = AppState::with_tab(config.start_tab());
    let mut runtime = ApiRuntime::new(client, download_dir);
    greffe_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List(ReferenceListKind),
    Transfer {
        source: String,
        target: String,
    },
    DownloadTemplate(String),
    UploadTemplate {
        name: String,
        file: PathBuf,
    },
    RestoreTemplate(String),
    Generate {
        dossier: DossierId,
        template: String,
        format: DocumentFormat,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
    out_dir: Option<PathBuf>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
        out_dir: None,
    };

    let mut iter = args.into_iter().map(|arg| arg.as_ref().to_owned());
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str, what: &str| take_value(&mut iter, flag, what);
        match arg.as_str() {
            "--config" => {
                options.config_path = PathBuf::from(value("--config", "a file path")?);
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
            "--out" => {
                options.out_dir = Some(PathBuf::from(value("--out", "a directory")?));
            }
            "--list" => {
                let key = value("--list", "a list key")?;
                let kind = ReferenceListKind::parse(&key).ok_or_else(|| {
                    anyhow!(
                        "unknown list {key:?}; expected one of {}",
                        list_keys().join(", ")
                    )
                })?;
                set_command(&mut options, Command::List(kind))?;
            }
            "--transfer" => {
                let source = value("--transfer", "a source and a target rédacteur")?;
                let target = value("--transfer", "a source and a target rédacteur")?;
                set_command(&mut options, Command::Transfer { source, target })?;
            }
            "--download-template" => {
                let name = value("--download-template", "a template name")?;
                set_command(&mut options, Command::DownloadTemplate(name))?;
            }
            "--upload-template" => {
                let name = value("--upload-template", "a template name and a file")?;
                let file = PathBuf::from(value("--upload-template", "a template name and a file")?);
                set_command(&mut options, Command::UploadTemplate { name, file })?;
            }
            "--restore-template" => {
                let name = value("--restore-template", "a template name")?;
                set_command(&mut options, Command::RestoreTemplate(name))?;
            }
            "--generate" => {
                let what = "a dossier id, a template and a format";
                let raw_id = value("--generate", what)?;
                let template = value("--generate", what)?;
                let raw_format = value("--generate", what)?;
                let dossier = raw_id
                    .trim()
                    .parse::<i64>()
                    .map(DossierId::new)
                    .with_context(|| format!("dossier id {raw_id:?} is not a number"))?;
                let format = DocumentFormat::parse(&raw_format).ok_or_else(|| {
                    anyhow!("unknown format {raw_format:?}; expected pdf, odt or docx")
                })?;
                set_command(
                    &mut options,
                    Command::Generate {
                        dossier,
                        template,
                        format,
                    },
                )?;
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

fn take_value(iter: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> Result<String> {
    iter.next().ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn set_command(options: &mut CliOptions, command: Command) -> Result<()> {
    if options.command.is_some() {
        bail!("only one command can run at a time; run with --help to see supported options");
    }
    options.command = Some(command);
    Ok(())
}

fn list_keys() -> Vec<&'static str> {
    ReferenceListKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .collect()
}

fn run_command(
    client: &Client,
    command: &Command,
    out_dir: &Path,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List(kind) => {
            let parametres = client.fetch_parametres()?;
            for (index, value) in parametres.values(*kind).iter().enumerate() {
                writeln!(out, "{index}\t{value}")?;
            }
        }
        Command::Transfer { source, target } => {
            let redacteurs = client
                .fetch_parametres()?
                .values(ReferenceListKind::Redacteurs);
            let request = validate_transfer(source, target, &redacteurs)?;
            let outcome = client.transfer_portfolio(&request)?;
            info!(
                source = %source,
                target = %target,
                affaires = outcome.affaires_modifiees,
                "portfolio transferred"
            );
            writeln!(
                out,
                "{} affaire(s) transferred from {source} to {target}",
                outcome.affaires_modifiees
            )?;
        }
        Command::DownloadTemplate(name) => {
            let path = client.download_template(name)?.save_into(out_dir)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::UploadTemplate { name, file } => {
            client.upload_template(name, file)?;
            writeln!(out, "{name} uploaded from {}", file.display())?;
        }
        Command::RestoreTemplate(name) => {
            client.restore_template(name)?;
            writeln!(out, "{name} restored to the default version")?;
        }
        Command::Generate {
            dossier,
            template,
            format,
        } => {
            let path = client
                .generate_document(*dossier, template, *format)?
                .save_into(out_dir)?;
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

fn print_help() {
    println!("greffe (case-management client)");
    println!("  --config <path>                        Use a specific config path");
    println!("  --print-config-path                    Print resolved config path");
    println!("  --print-example-config                 Print a v1 config template");
    println!("  --check                                Validate config + server reachability");
    println!("  --list <key>                           Print a reference list ({})", list_keys().join(", "));
    println!("  --transfer <source> <target>           Move a rédacteur's portfolio");
    println!("  --download-template <name>             Save a template into the download dir");
    println!("  --upload-template <name> <file>        Replace a template with a local file");
    println!("  --restore-template <name>              Restore the default template");
    println!("  --generate <dossier> <template> <fmt>  Generate a document (pdf, odt, docx)");
    println!("  --out <dir>                            Override the download dir");
    println!("  --help                                 Show this help");
}
