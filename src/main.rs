use clap::{Args, Parser, Subcommand};
use loanflow::application::checker::LoanChecker;
use loanflow::application::generator::LoanGenerator;
use loanflow::application::pipeline::{PipelineConfig, run_pipeline};
use loanflow::application::sink::LoanSink;
use loanflow::config::{
    BrokerConfig, CheckerConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_THRESHOLD, GeneratorConfig, SinkConfig,
};
use loanflow::domain::channel::Channel;
use loanflow::interfaces::json_lines::{JsonLinesPublisher, JsonLinesSubscription};
use loanflow::telemetry;
use miette::{IntoDiagnostic, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "LOANFLOW_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate loan applications as JSON lines on stdout
    Source(SourceArgs),
    /// Route applications read from stdin to the approved/declined channels on stdout
    Check(CheckArgs),
    /// Log approved/declined loans read from stdin
    Sink(SinkCommandArgs),
    /// Run source, checker and sink in one process over an in-memory broker
    Run(RunArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Milliseconds between two generated loans
    #[arg(long, env = "LOANFLOW_PERIOD_MS", default_value_t = 1000)]
    period_ms: u64,

    /// Stop after this many loans
    #[arg(long)]
    count: Option<u64>,

    /// Seed for the random source, for reproducible runs
    #[arg(long, env = "LOANFLOW_SEED")]
    seed: Option<u64>,

    /// Borrower names to choose from (defaults to the built-in list)
    #[arg(long = "name", value_delimiter = ',')]
    names: Vec<String>,

    /// Amounts to choose from (defaults to the built-in list)
    #[arg(long = "amount", value_delimiter = ',')]
    amounts: Vec<u64>,
}

impl SourceArgs {
    fn config(&self) -> Result<GeneratorConfig> {
        let defaults = GeneratorConfig::default();
        let names = if self.names.is_empty() {
            defaults.names
        } else {
            self.names.clone()
        };
        let amounts = if self.amounts.is_empty() {
            defaults.amounts
        } else {
            self.amounts.clone()
        };
        GeneratorConfig::new(names, amounts, Duration::from_millis(self.period_ms))
            .into_diagnostic()
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Args)]
struct CheckArgs {
    /// Amounts strictly above this value are declined
    #[arg(long, env = "LOANFLOW_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: u64,
}

#[derive(Args)]
struct SinkArgs {
    /// Number of recent loans the sink keeps in memory
    #[arg(long, env = "LOANFLOW_HISTORY", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history: usize,
}

#[derive(Args)]
struct SinkCommandArgs {
    #[command(flatten)]
    sink: SinkArgs,

    /// Channels to consume
    #[arg(
        long = "channel",
        value_delimiter = ',',
        default_values_t = [Channel::Approved, Channel::Declined]
    )]
    channels: Vec<Channel>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    check: CheckArgs,

    #[command(flatten)]
    sink: SinkArgs,

    /// Per-subscription queue size of the in-memory broker
    #[arg(long, env = "LOANFLOW_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log).into_diagnostic()?;

    match cli.command {
        Command::Source(args) => {
            let config = args.config()?;
            let publisher = Arc::new(JsonLinesPublisher::new(stdout()));
            let mut generator = LoanGenerator::new(config, args.rng(), publisher);
            info!("Loan source has started...");

            let report = generator.run(args.count, shutdown_signal()).await;
            info!(
                "Loan source stopped: {} published, {} failed",
                report.published, report.failed
            );
        }
        // Checker and sink stop at end of input; an upstream Ctrl-C closes the pipe
        Command::Check(args) => {
            let mut applications =
                JsonLinesSubscription::new(BufReader::new(stdin()), &[Channel::Applications]);
            let publisher = Arc::new(JsonLinesPublisher::new(stdout()));
            let checker = LoanChecker::new(
                CheckerConfig {
                    threshold: args.threshold,
                },
                publisher,
            );
            info!("Loan checker has started with threshold {}", checker.threshold());

            checker.run(&mut applications).await.into_diagnostic()?;
        }
        Command::Sink(args) => {
            let mut decisions =
                JsonLinesSubscription::new(BufReader::new(stdin()), &args.channels);
            let mut sink = LoanSink::new(SinkConfig {
                history_capacity: args.sink.history,
            });
            info!("Loan sink has started...");

            sink.run(&mut decisions).await.into_diagnostic()?;
        }
        Command::Run(args) => {
            let config = PipelineConfig {
                generator: args.source.config()?,
                checker: CheckerConfig {
                    threshold: args.check.threshold,
                },
                sink: SinkConfig {
                    history_capacity: args.sink.history,
                },
                broker: BrokerConfig::new(args.queue_capacity).into_diagnostic()?,
            };

            let report = run_pipeline(
                config,
                args.source.rng(),
                args.source.count,
                shutdown_signal(),
            )
            .await
            .into_diagnostic()?;
            info!(
                "Pipeline finished: {} generated, {} approved, {} declined",
                report.generator.published, report.sink.approved, report.sink.declined
            );
        }
    }

    Ok(())
}
