use clap::{CommandFactory, Parser};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use xsscout::cli::args::Cli;
use xsscout::core::cancel::CancelFlag;
use xsscout::core::context::ScanConfig;
use xsscout::core::engine::Engine;
use xsscout::reporting::reporter::Reporter;
use xsscout::reporting::{json, text};

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════════════════════╗
 ║                                                                    ║
 ║    ██╗  ██╗███████╗███████╗ ██████╗ ██████╗ ██╗   ██╗████████╗     ║
 ║    ╚██╗██╔╝██╔════╝██╔════╝██╔════╝██╔═══██╗██║   ██║╚══██╔══╝     ║
 ║     ╚███╔╝ ███████╗███████╗██║     ██║   ██║██║   ██║   ██║        ║
 ║     ██╔██╗ ╚════██║╚════██║██║     ██║   ██║██║   ██║   ██║        ║
 ║    ██╔╝ ██╗███████║███████║╚██████╗╚██████╔╝╚██████╔╝   ██║        ║
 ║    ╚═╝  ╚═╝╚══════╝╚══════╝ ╚═════╝ ╚═════╝  ╚═════╝    ╚═╝        ║
 ║                                                                    ║
 ║    Crawl-driven reflected XSS discovery                            ║
 ║                                                                    ║
 ║    License : Apache-2.0                                            ║
 ║                                                                    ║
 ╚════════════════════════════════════════════════════════════════════╝
"#;

fn print_banner(to_stderr: bool) {
    if to_stderr {
        eprintln!("\x1b[36m{}\x1b[0m", BANNER); // Cyan color
    } else {
        println!("\x1b[36m{}\x1b[0m", BANNER);
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "xsscout=debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    // Banner before help unless --no-banner
    let show_help = args.iter().any(|a| a == "--help" || a == "-h");
    let no_banner = args.iter().any(|a| a == "--no-banner");
    if show_help && !no_banner {
        print_banner(false);
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let cli = Cli::parse();

    // Keep stdout clean for the report when it is printed there
    let chatter_to_stderr = cli.output.is_none();

    if !cli.no_banner && !cli.quiet {
        print_banner(chatter_to_stderr);
    }

    init_tracing(&cli);

    let config = ScanConfig::from_cli(&cli);
    let engine = Engine::new(config)?;

    // Progress lines are printed as they arrive; quiet mode drops them
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let quiet = cli.quiet;
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if quiet && !line.starts_with("[vuln]") && !line.starts_with("[error]") {
                continue;
            }
            if chatter_to_stderr {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    });

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing current requests");
                cancel.cancel();
            }
        });
    }

    let reporter = Arc::new(Reporter::with_sink(tx));
    let outcome = engine.run(reporter.clone(), &cancel).await;

    // Closing the last sender lets the printer drain and exit
    drop(reporter);
    let _ = printer.await;

    let report = outcome?;

    let rendered = match cli.format.as_str() {
        "json" => json::render(&report)?,
        "text" => text::render(&report),
        other => {
            tracing::warn!("Unknown format '{}', using text", other);
            text::render(&report)
        }
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            tracing::info!("Report written to {}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
