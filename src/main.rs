use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bank_ui_harness::capture::{
    DirectorySink, MemorySink, cleanup_old_runs, list_run_artifacts, list_runs,
};
use bank_ui_harness::config;
use bank_ui_harness::page::{SimulatedBank, WebDriverConfig, WebDriverPage};
use bank_ui_harness::scenario::{RunReport, ScenarioRunner, ScenarioStatus};
use bank_ui_harness::{ArtifactSink, HarnessError};

/// Bank UI Harness - acceptance tests for the demo banking application
#[derive(Parser, Debug)]
#[command(
    name = "bank-ui-harness",
    about = "Browser-driven acceptance tests with screenshot audit trail",
    after_help = "ENVIRONMENT VARIABLES:\n\
        BANK_UI_BASE_URL         Application root URL\n\
        BANK_UI_WEBDRIVER_URL    WebDriver endpoint\n\
        BANK_UI_BROWSER          Browser name (chrome, firefox)\n\
        BANK_UI_HEADLESS         Run the browser headless\n\
        BANK_UI_TIMEOUT          Default wait timeout (s)\n\
        BANK_UI_POLL_INTERVAL    Readiness poll interval (ms)\n\
        BANK_UI_ARTIFACT_DIR     Base directory for screenshot runs\n\
        BANK_UI_USERNAME         Valid username\n\
        BANK_UI_PASSWORD         Valid password\n\
        RUST_LOG                 Log filter (default: info)"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run all scenarios in a real browser through WebDriver
    Run {
        /// Application root URL
        #[arg(long, env = "BANK_UI_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
        base_url: String,

        /// WebDriver endpoint
        #[arg(long, env = "BANK_UI_WEBDRIVER_URL", default_value = config::DEFAULT_WEBDRIVER_URL)]
        webdriver: String,

        /// Browser name sent in the capabilities request
        #[arg(long, env = "BANK_UI_BROWSER", default_value = config::DEFAULT_BROWSER)]
        browser: String,

        /// Run the browser headless
        #[arg(long, env = "BANK_UI_HEADLESS")]
        headless: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run all scenarios against the built-in simulated bank
    Simulate {
        /// Probes each page load takes before its elements become ready
        #[arg(long, default_value = "2")]
        render_delay: u32,

        /// Keep screenshots in memory instead of writing them
        #[arg(long)]
        in_memory: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List recorded runs and their screenshots
    Artifacts {
        /// Base directory holding run directories
        #[arg(long, env = "BANK_UI_ARTIFACT_DIR", default_value = config::DEFAULT_ARTIFACT_DIR)]
        dir: PathBuf,

        /// Delete runs older than this many hours instead of listing
        #[arg(long)]
        cleanup_hours: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Default wait timeout in seconds
    #[arg(long, env = "BANK_UI_TIMEOUT", default_value_t = config::DEFAULT_WAIT_TIMEOUT)]
    timeout: u64,

    /// Readiness poll interval in milliseconds
    #[arg(long, env = "BANK_UI_POLL_INTERVAL", default_value_t = config::DEFAULT_POLL_INTERVAL)]
    poll_ms: u64,

    /// Output directory for screenshots (default: new run directory under BANK_UI_ARTIFACT_DIR)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output the run report as JSON
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn runner(&self, base_url: &str) -> Result<ScenarioRunner, HarnessError> {
        if self.timeout == 0 {
            return Err(HarnessError::Config("timeout must be at least 1 second".to_string()));
        }
        Ok(ScenarioRunner::new(base_url)
            .timeout(Duration::from_secs(self.timeout))
            .poll_interval(Duration::from_millis(self.poll_ms)))
    }

    /// Run directory sink, created and initialised
    fn sink(&self, name: &str) -> std::io::Result<DirectorySink> {
        let sink = match &self.output {
            Some(dir) => DirectorySink::in_dir(dir),
            None => DirectorySink::with_name(config::artifact_dir(), name),
        };
        sink.init()?;
        Ok(sink)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Some(Commands::Run {
            base_url,
            webdriver,
            browser,
            headless,
            common,
        }) => {
            let runner = common.runner(&base_url)?;
            let sink = common.sink("run")?;
            let driver = WebDriverConfig::new(webdriver).browser(browser).headless(headless);
            let page = WebDriverPage::connect(&driver).map_err(HarnessError::from)?;
            if let Some(id) = page.session_id() {
                tracing::info!("WebDriver session {}", id);
            }

            let report = runner.run(Box::new(page), Box::new(sink.clone()));
            finish(&report, Some(&sink.dir), common.json)?;
        }

        Some(Commands::Simulate {
            render_delay,
            in_memory,
            common,
        }) => {
            let runner = common.runner(&config::base_url())?;
            let bank = SimulatedBank::new().render_delay(render_delay);

            let (sink, run_dir): (Box<dyn ArtifactSink>, Option<PathBuf>) = if in_memory {
                (Box::new(MemorySink::new()), None)
            } else {
                let sink = common.sink("simulate")?;
                let dir = sink.dir.clone();
                (Box::new(sink), Some(dir))
            };

            let report = runner.run(Box::new(bank), sink);
            finish(&report, run_dir.as_deref(), common.json)?;
        }

        Some(Commands::Artifacts { dir, cleanup_hours }) => {
            if let Some(hours) = cleanup_hours {
                let removed = cleanup_old_runs(&dir, cleanup_age(hours))?;
                println!("Removed {} run(s) older than {}h from {}", removed, hours, dir.display());
                return Ok(());
            }

            let runs = list_runs(&dir)?;
            if runs.is_empty() {
                println!("No runs in {}", dir.display());
            }
            for run in runs {
                let artifacts = list_run_artifacts(&run)?;
                println!("{} ({} screenshots)", run.display(), artifacts.len());
                for artifact in artifacts {
                    if let Some(name) = artifact.file_name() {
                        println!("  {}", name.to_string_lossy());
                    }
                }
            }
        }

        None => {
            println!("Bank UI Harness - acceptance tests for the demo banking application");
            println!();
            println!("Usage: bank-ui-harness <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run        Run all scenarios in a real browser through WebDriver");
            println!("  simulate   Run all scenarios against the built-in simulated bank");
            println!("  artifacts  List recorded runs and their screenshots");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

/// Age limit for `artifacts --cleanup-hours`
fn cleanup_age(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

/// Print the report, save it next to the screenshots, and exit non-zero on abort
fn finish(report: &RunReport, run_dir: Option<&Path>, json: bool) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = run_dir {
        std::fs::write(dir.join("report.json"), serde_json::to_string_pretty(report)?)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for outcome in &report.scenarios {
            let status = match outcome.status {
                ScenarioStatus::Passed => "passed",
                ScenarioStatus::Failed => "FAILED",
                ScenarioStatus::Skipped => "skipped",
            };
            println!(
                "  {:<14} {:<8} {:>3} assertions  {} ms",
                outcome.scenario.to_string(),
                status,
                outcome.assertions,
                outcome.duration_ms
            );
        }
        println!("{}", report.summary());
        if let Some(dir) = run_dir {
            println!("\nScreenshots: {}", dir.display());
        }
    }

    if !report.success {
        for (depth, cause) in report.error_chain.iter().enumerate() {
            if depth == 0 {
                eprintln!("Test failed: {}", cause);
            } else {
                eprintln!("  caused by: {}", cause);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_age_saturates() {
        assert_eq!(cleanup_age(2), Duration::from_secs(7200));
        assert_eq!(cleanup_age(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
