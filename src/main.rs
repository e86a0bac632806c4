use std::process::ExitCode;

use clap::Parser;
use console::style;
use media_dl::commands::{self, Cli, Commands};
use media_dl::utils::dependency_check;
use media_dl::utils::input::Prompter;
use media_dl::{Config, Downloader, Error, Result};

const BANNER_WIDTH: usize = 60;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load();
    let downloader = Downloader::with_config(config.clone());

    match cli.command {
        Commands::Config { action } => commands::config_command(config, action),
        Commands::Download { url, media, filename, trim } => {
            start(&downloader, &config).await?;
            finish(commands::download_command(&downloader, url, media, filename, trim).await)
        }
        Commands::Batch { file, url, media } => {
            start(&downloader, &config).await?;
            finish(commands::batch_download_command(&downloader, url, file, media).await)
        }
        Commands::Info { url } => {
            start(&downloader, &config).await?;
            finish(commands::info_command(&downloader, url).await)
        }
        Commands::Interactive => {
            start(&downloader, &config).await?;
            let mut prompter = Prompter::stdio();
            let result = commands::interactive_command(&mut prompter, &downloader)
                .await
                .and_then(|summary| match summary.failed {
                    0 => Ok(()),
                    failed => Err(Error::BatchFailed {
                        failed,
                        total: summary.rounds,
                    }),
                });
            finish(result)
        }
    }
}

/// Prints the banner and makes sure yt-dlp can be run.
async fn start(downloader: &Downloader, config: &Config) -> Result<()> {
    print_rule();
    println!(
        "{}",
        style(format!("{:^width$}", "MEDIA DOWNLOADER (Powered by yt-dlp)", width = BANNER_WIDTH)).blue()
    );
    print_rule();

    dependency_check::ensure_dependencies(downloader.tool(), config).await?;
    Ok(())
}

fn finish(result: Result<()>) -> Result<()> {
    print_rule();
    result
}

fn print_rule() {
    println!("{}", style("=".repeat(BANNER_WIDTH)).blue());
}
