//! MuniQA CLI - suite runner entry point
//!
//! Exit codes: 0 when every checked link passed (warnings allowed), 1 when
//! any section failed, 2 when the run could not start at all (bad
//! configuration, WebDriver unreachable).

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use muniqa_harness::{LinkPolicy, PortalConfig, SessionConfig};
use muniqa_pages::{RunnerConfig, Section, SuiteRunner};

mod output;

/// MuniQA - municipal portal link and flow checker
#[derive(Parser)]
#[command(name = "muniqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the portal configuration JSON
    #[arg(long, env = "MUNIQA_CONFIG", default_value = "secrets.json", global = true)]
    config: PathBuf,

    /// WebDriver endpoint (chromedriver)
    #[arg(
        long,
        env = "MUNIQA_WEBDRIVER_URL",
        default_value = "http://localhost:9515",
        global = true
    )]
    webdriver_url: String,

    /// Run the browser with a visible window
    #[arg(long, global = true)]
    headed: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Directory for failure screenshots
    #[arg(long, default_value = "screenshots", global = true)]
    screenshot_dir: PathBuf,

    /// Directory to write results.json into
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the portal suite
    Run {
        /// Sections to run (default: all configured)
        #[arg(long = "section")]
        sections: Vec<String>,

        /// Stop at the first failed section
        #[arg(long)]
        fail_fast: bool,

        /// Treat every URL deviation as a failure
        #[arg(long)]
        strict: bool,

        /// Skip the initial portal login even when configured
        #[arg(long)]
        skip_login: bool,
    },

    /// List the known portal sections
    Sections,

    /// Validate the configuration file and show what would run
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Sections => {
            for section in Section::ALL {
                println!("{section}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::CheckConfig => {
            let portal = PortalConfig::load(&cli.config)?;
            output::print_success(&format!("{} parses", cli.config.display()));
            for (key, url) in portal.section_urls() {
                println!("  {key}: {url}");
            }
            let creds = match (&portal.user_data.phone_number, &portal.user_data.password) {
                (Some(_), Some(_)) => "phone + password",
                (Some(_), None) => "phone only (no student-file login)",
                (None, Some(_)) => "password only (no OTP login)",
                (None, None) => "none (public flows only)",
            };
            println!("  credentials: {creds}");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run {
            sections,
            fail_fast,
            strict,
            skip_login,
        } => {
            let portal = PortalConfig::load(&cli.config)?;

            let selected = if sections.is_empty() {
                Section::ALL.to_vec()
            } else {
                sections
                    .iter()
                    .map(|s| Section::from_str(s).map_err(|e| anyhow::anyhow!(e)))
                    .collect::<Result<Vec<_>, _>>()?
            };

            let session = SessionConfig {
                webdriver_url: cli.webdriver_url.clone(),
                headless: !cli.headed,
                ..SessionConfig::default()
            };
            let runner_config = RunnerConfig {
                session,
                policy: if strict {
                    LinkPolicy::strict()
                } else {
                    LinkPolicy::default()
                },
                screenshot_dir: cli.screenshot_dir.clone(),
                output_dir: cli.output.clone(),
                fail_fast,
                skip_login,
            };

            let runner = SuiteRunner::new(runner_config, portal);
            let result = runner.run(&selected).await?;
            output::print_suite(&result, cli.format);

            if result.success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
    }
}
