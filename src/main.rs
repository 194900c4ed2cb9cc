use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use news_reel::{Config, Pipeline, PipelineReport};

fn cli() -> Command {
    Command::new("News Reel")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Summarize trending articles, translate them and narrate a short video")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (defaults to news-reel.toml lookup)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(Command::new("run").about("Fetch, summarize, translate and render the video"))
        .subcommand(Command::new("articles").about("Fetch, summarize and translate only"))
        .subcommand(
            Command::new("video")
                .about("Render a video from a saved summary")
                .arg(
                    Arg::new("summary-file")
                        .short('s')
                        .long("summary-file")
                        .value_name("FILE")
                        .help("Text file holding the article summary")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("init-config")
                .about("Write the default configuration")
                .arg(
                    Arg::new("path")
                        .value_name("PATH")
                        .default_value("news-reel.toml"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path)),
        None => Config::load().or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Ok(Config::default())
        }),
    }
}

fn print_report(report: &PipelineReport) {
    info!("📰 Sources: {}", report.source_urls.len());
    for stage in &report.stages {
        info!("  {:?}: {:.2}s", stage.stage, stage.elapsed.as_secs_f64());
    }
    if let Some(translations) = &report.translations {
        println!("{}", translations.render());
    }
    if let Some(video) = &report.video {
        info!("🎬 Video: {} ({:.1}s)", video.path.display(), video.duration.as_secs_f64());
    }
}

fn init_tracing(verbose: bool, log_level: &str) {
    let filter = if verbose {
        EnvFilter::new("news_reel=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("news_reel={},warn", log_level)))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose");

    if let Some(("init-config", sub)) = matches.subcommand() {
        init_tracing(verbose, "info");
        let path = PathBuf::from(sub.get_one::<String>("path").map(String::as_str).unwrap_or("news-reel.toml"));
        Config::default().save(&path)?;
        return Ok(());
    }

    let mut config = load_config(&matches)?;
    init_tracing(verbose, &config.output.log_level);

    if let Some(("video", _)) = matches.subcommand() {
        config = config.without_translation();
    }

    config.validate()?;
    info!("{}", config.summary());

    let pipeline = Pipeline::new(config)?;

    let report = match matches.subcommand() {
        Some(("run", _)) => pipeline.run().await?,
        Some(("articles", _)) => pipeline.run_articles().await?,
        Some(("video", sub)) => {
            let path = sub
                .get_one::<String>("summary-file")
                .ok_or_else(|| anyhow!("--summary-file is required"))?;
            let summary = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read summary file {}", path))?;
            pipeline.run_video(summary.trim()).await?
        }
        Some((other, _)) => return Err(anyhow!("Unknown command: {}", other)),
        None => return Err(anyhow!("No command given")),
    };

    if pipeline.config().output.save_report {
        pipeline.save_report(&report).await?;
    }

    print_report(&report);
    Ok(())
}
