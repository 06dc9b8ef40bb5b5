use clap::Parser;
use netpeek::base::{BuildError, Error};
use netpeek::config::DiagConfig;
use netpeek::http::Transport;
use netpeek::render::{Event, OutputSink};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "netpeek", version)]
#[command(about = "Send one HTTP request and show how it went", long_about = None)]
struct Cli {
    /// Request method
    #[arg(short = 'X', long = "request", default_value = "GET")]
    method: String,

    /// Request body
    #[arg(short, long, default_value = "")]
    data: String,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Echo the request and show connection details before the response
    #[arg(short = 'i', long)]
    connect_info: bool,

    /// Print the whole body instead of its first and last lines
    #[arg(short, long)]
    full: bool,

    /// Target URL; `http://` is assumed when no scheme is given
    url: String,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected `Name: value`, got `{}`", raw)),
    }
}

fn target_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("http://{}", raw))
    }
}

/// Writes events to stdout, one per line.
struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn emit(&mut self, event: Event) {
        let res = match &event {
            Event::BodyFull(bytes) => self
                .out
                .write_all(bytes)
                .and_then(|_| self.out.write_all(b"\n")),
            _ => writeln!(self.out, "{}", event),
        };
        if let Err(e) = res {
            tracing::debug!(error = %e, "stdout write failed");
        }
    }
}

fn config_from(cli: Cli) -> Result<DiagConfig, Error> {
    let url = target_url(&cli.url).map_err(|e| BuildError::new(&cli.method, &cli.url, e))?;
    let method = http::Method::from_bytes(cli.method.as_bytes())
        .map_err(|e| BuildError::new(&cli.method, url.as_str(), e))?;

    let mut config = DiagConfig::new(method, url);
    config.body = cli.data;
    config.headers = cli.headers;
    config.show_connect_info = cli.connect_info;
    config.show_full_body = cli.full;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netpeek=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match config_from(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = Transport::new();
    let mut sink = TerminalSink {
        out: io::stdout().lock(),
    };

    match netpeek::pipeline::visit(&config, &transport, &mut sink).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A failed connect ends the run here; nothing else is retried.
            tracing::debug!(fatal = e.is_fatal(), "request failed");
            if let Err(flush_err) = sink.out.flush() {
                tracing::debug!(error = %flush_err, "stdout flush failed");
            }
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Trace: abc:def").unwrap(),
            ("X-Trace".to_string(), "abc:def".to_string())
        );
        assert!(parse_header("novalue").is_err());
        assert!(parse_header(": v").is_err());
    }

    #[test]
    fn test_scheme_defaults_to_http() {
        assert_eq!(target_url("example.com/a").unwrap().as_str(), "http://example.com/a");
        assert_eq!(target_url("https://example.com").unwrap().scheme(), "https");
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "netpeek", "-X", "POST", "-d", "x=1", "-H", "A: 1", "-H", "B: 2", "-i", "-f",
            "example.com",
        ]);
        let config = config_from(cli).unwrap();
        assert_eq!(config.method, http::Method::POST);
        assert_eq!(config.body, "x=1");
        assert_eq!(config.headers.len(), 2);
        assert!(config.show_connect_info && config.show_full_body);
    }

    #[test]
    fn test_terminal_sink_writes_lines() {
        let mut sink = TerminalSink { out: Vec::new() };
        sink.emit(Event::BodyLabel);
        sink.emit(Event::BodyFull(bytes::Bytes::from_static(b"raw")));
        assert_eq!(sink.out, b"Body:\nraw\n");
    }
}
