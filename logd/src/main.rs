use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::config::{read_config, RepConfig};
use common::err::CResult;
use common::log::{init_log, OutputType, TracingFactoryOptions};
use orchestrator::Orchestrator;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "logd")]
#[command(version = "0.1.0")]
#[command(author = "rust-us")]
#[command(about = "High-throughput log collection and tamper-evident storage service")]
#[command(long_about = None)]
struct CliArgs {
    #[arg(short = 'd', long, help = "database file path", value_name = "PATH")]
    database: Option<String>,

    #[arg(long = "syslog-port", help = "syslog UDP listen port", value_name = "PORT")]
    syslog_port: Option<u16>,

    #[arg(long = "rest-port", help = "REST HTTP listen port", value_name = "PORT")]
    rest_port: Option<u16>,

    #[arg(long = "snmp-port", help = "SNMP trap UDP listen port", value_name = "PORT")]
    snmp_port: Option<u16>,

    #[arg(long = "batch-size", help = "write-queue batch size", value_name = "N")]
    batch_size: Option<usize>,

    #[arg(long = "flush-interval-ms", help = "write-queue flush interval in ms", value_name = "MS")]
    flush_interval_ms: Option<u64>,

    #[arg(long = "no-syslog", help = "disable the syslog receiver")]
    no_syslog: bool,

    #[arg(long = "no-rest", help = "disable the REST receiver")]
    no_rest: bool,

    #[arg(long = "no-snmp", help = "disable the SNMP receiver")]
    no_snmp: bool,

    #[arg(short = 'c', long, help = "path to a TOML config file", value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, help = "raise log verbosity to debug", default_value_t = false)]
    debug: bool,
}

/// CLI flags win over config-file values, which win over `RepConfig`
/// defaults. A present `Some`/`true` flag always overrides; absent
/// flags fall through to whatever the loaded config already carried.
fn merge(mut config: RepConfig, args: &CliArgs) -> RepConfig {
    if let Some(database) = &args.database {
        config.database = database.clone();
    }
    if let Some(port) = args.syslog_port {
        config.syslog_port = port;
    }
    if let Some(port) = args.rest_port {
        config.rest_port = port;
    }
    if let Some(port) = args.snmp_port {
        config.snmp_port = port;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(flush_interval_ms) = args.flush_interval_ms {
        config.flush_interval_ms = flush_interval_ms;
    }
    if args.no_syslog {
        config.enable_syslog = false;
    }
    if args.no_rest {
        config.enable_rest = false;
    }
    if args.no_snmp {
        config.enable_snmp = false;
    }
    if args.debug {
        config.debug = true;
    }
    config
}

const REPORT_INTERVAL: Duration = Duration::from_secs(10);
const POLL_SLEEP: Duration = Duration::from_millis(1);

#[tokio::main]
async fn main() -> CResult<()> {
    let args = CliArgs::parse();

    let file_config = match &args.config {
        Some(path) => read_config(path),
        None => RepConfig::default(),
    };
    let config = merge(file_config, &args);

    let output = match &config.log_dir {
        Some(dir) => OutputType::File { dir: dir.clone() },
        None => OutputType::Stdout,
    };
    init_log(TracingFactoryOptions::new(config.debug, output));

    info!(?config, "starting logd");

    let mut orchestrator = Orchestrator::new(&config)?;
    orchestrator.start()?;

    let mut report_at = tokio::time::Instant::now() + REPORT_INTERVAL;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(POLL_SLEEP) => {
                orchestrator.poll()?;
            }
        }

        if tokio::time::Instant::now() >= report_at {
            let counters = orchestrator.counters();
            info!(
                received = counters.received(),
                written = counters.written(),
                errors = counters.errors(),
                batches = counters.batch_count(),
                queued = orchestrator.queued(),
                "status report"
            );
            report_at = tokio::time::Instant::now() + REPORT_INTERVAL;
        }
    }

    orchestrator.stop();
    Ok(())
}
