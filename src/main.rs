use env_logger::{Builder, Env};
use minidsp_control::{
    ApiRequest, AppConfig, DeviceModel, DeviceWriter, InMemoryCatalogue, LegacyApi,
    LegacyTranslator, RingbufSink, create_command_channel,
};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn setup_logger(default_filter: &str) {
    // RUST_LOG overrides the configured filter
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .unwrap_or(());
}

/// Answer one request per input line with a `STATUS BODY` line
///
/// Each answer is flushed before the next line is read.
fn serve(api: &LegacyApi, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match ApiRequest::from_line(&line) {
            Ok(request) => {
                let response = api.handle(&request);
                writeln!(output, "{} {}", response.status, response.body)?;
            }
            Err(e) => {
                log::warn!("Unparseable request line: {}", e);
                writeln!(output, "400 {}", json!({ "error": e }))?;
            }
        }
        output.flush()?;
    }
    Ok(())
}

fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalogue = match &config.catalogue_path {
        Some(path) => InMemoryCatalogue::from_file(path)?,
        None => {
            log::warn!("No catalogue configured, preset search and load are unavailable");
            InMemoryCatalogue::empty()
        }
    };

    // Device transport is out of reach here: the writer logs each line it delivers
    let (producer, consumer) = create_command_channel(config.command_buffer_capacity);
    let writer = DeviceWriter::spawn(
        consumer,
        Duration::from_millis(config.writer_poll_ms),
        |line| log::info!("device <- {}", line),
    )?;

    let translator = LegacyTranslator::new(
        DeviceModel::new(),
        RingbufSink::with_timeout(producer, Duration::from_millis(config.sink_timeout_ms)),
        Arc::new(catalogue),
    );
    let api = LegacyApi::new(Arc::new(translator));
    log::info!("Legacy control surface ready, reading requests from stdin");

    serve(&api, io::stdin().lock(), io::stdout().lock())?;

    let delivered = writer.stop();
    log::info!("Shutting down, {} commands delivered", delivered);
    Ok(())
}

fn main() {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    setup_logger(&config.log_filter);
    log::info!("=== MiniDSP legacy control {} ===", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
