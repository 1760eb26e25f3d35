use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use game_showcase::app::{App, ProgressSinkKind, RunOptions, RunReport, resolve_only};
use game_showcase::config::ConfigLoader;
use game_showcase::domain::Lang;
use game_showcase::error::ShowcaseError;
use game_showcase::output::{JsonOutput, OutputMode};
use game_showcase::page::{DEFAULT_OUTPUT, HtmlFilePublisher};
use game_showcase::render::RunPhase;
use game_showcase::roblox::RobloxHttpClient;
use game_showcase::tui::Tui;

#[derive(Parser)]
#[command(name = "showcase")]
#[command(about = "Render a catalog of Roblox games with live names, icons and visit counts")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch game data and write the catalog page")]
    Build(BuildArgs),
    #[command(about = "Resolve universe ids from the catalog without any network access")]
    Resolve(ResolveArgs),
}

#[derive(Args, Clone, Default)]
struct BuildArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    out: Option<Utf8PathBuf>,

    #[arg(long)]
    lang: Option<Lang>,
}

#[derive(Args)]
struct ResolveArgs {
    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ShowcaseError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ShowcaseError) -> u8 {
    match error {
        ShowcaseError::MissingConfig
        | ShowcaseError::ConfigRead(_)
        | ShowcaseError::ConfigParse(_)
        | ShowcaseError::InvalidConfig(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command.unwrap_or(Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => run_build(args, output_mode),
        Commands::Resolve(args) => run_resolve(args, output_mode),
    }
}

fn run_build(args: BuildArgs, output_mode: OutputMode) -> miette::Result<()> {
    let config = ConfigLoader::resolve(args.config.as_deref())?;
    let options = RunOptions::for_config(&config, args.lang);

    let out = args.out.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));
    let publisher = HtmlFilePublisher::new(out, config.title.clone());
    let client = RobloxHttpClient::new(config.upstream.clone())?;
    let app = App::new(client);

    match output_mode {
        OutputMode::NonInteractive => {
            let report = app.run(&config.catalog, &options, &publisher, &JsonOutput)?;
            JsonOutput::print_run(&report).into_diagnostic()?;
            Ok(())
        }
        OutputMode::Interactive => {
            let catalog = config.catalog;
            let path = publisher.path().to_owned();
            let mut tui = Tui::new(ProgressSinkKind::Build);
            let report = tui.run(move |sink| app.run(&catalog, &options, &publisher, sink))?;
            tui.finish_run(&report)?;
            print_run_summary(&report, path.as_str());
            Ok(())
        }
    }
}

fn run_resolve(args: ResolveArgs, output_mode: OutputMode) -> miette::Result<()> {
    let config = ConfigLoader::resolve(args.config.as_deref())?;
    match output_mode {
        OutputMode::NonInteractive => {
            let report = resolve_only(&config.catalog, &JsonOutput);
            JsonOutput::print_resolve(&report).into_diagnostic()?;
            Ok(())
        }
        OutputMode::Interactive => {
            let catalog = config.catalog;
            let mut tui = Tui::new(ProgressSinkKind::Resolve);
            let report = tui.run(move |sink| Ok(resolve_only(&catalog, sink)))?;
            tui.finish_resolve(&report)?;
            Ok(())
        }
    }
}

fn print_run_summary(report: &RunReport, path: &str) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}Showcase summary{reset}");
    println!("{cyan}Page: {path}{reset}");
    match report.phase {
        RunPhase::Resolved => println!(
            "{green}Resolved {} games, total visits {}{reset}",
            report.resolved,
            report.page.total().text()
        ),
        _ => println!(
            "{yellow}Live data unavailable: {}{reset}",
            report.error.as_deref().unwrap_or("unknown error")
        ),
    }
    if report.unresolved > 0 {
        println!(
            "{yellow}{} catalog entries have no universe id{reset}",
            report.unresolved
        );
    }
}
