use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

static INIT: OnceCell<()> = OnceCell::new();

/// Where structured log events are written.
#[derive(Debug, Clone)]
pub enum OutputType {
    Stdout,
    /// Daily-rolling file under `dir`, merged with stdout.
    File { dir: String },
}

#[derive(Debug, Clone)]
pub struct TracingFactoryOptions {
    pub debug: bool,
    pub output: OutputType,
}

impl TracingFactoryOptions {
    pub fn new(debug: bool, output: OutputType) -> Self {
        TracingFactoryOptions { debug, output }
    }
}

impl Default for TracingFactoryOptions {
    fn default() -> Self {
        TracingFactoryOptions::new(false, OutputType::Stdout)
    }
}

/// Installs the process-wide `tracing` subscriber. Idempotent: only the
/// first call takes effect, matching the single-subscriber contract of
/// `tracing_subscriber::fmt().try_init()`.
pub fn init_log(opts: TracingFactoryOptions) {
    INIT.get_or_init(|| {
        let level = if opts.debug { Level::DEBUG } else { Level::INFO };
        let format = tracing_subscriber::fmt::format()
            .with_file(true)
            .with_line_number(false)
            .with_target(false)
            .with_thread_ids(true)
            .compact();

        match opts.output {
            OutputType::Stdout => {
                let _ = tracing_subscriber::fmt()
                    .with_max_level(level)
                    .event_format(format)
                    .try_init();
            }
            OutputType::File { dir } => {
                let file_appender = tracing_appender::rolling::daily(&dir, "logd.log");
                let writer = file_appender.and(std::io::stdout);
                let _ = tracing_subscriber::fmt()
                    .with_max_level(level)
                    .event_format(format)
                    .with_writer(writer)
                    .try_init();
            }
        }
    });
}
