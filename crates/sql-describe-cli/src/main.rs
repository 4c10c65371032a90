//! sql-describe CLI - Cross-dialect table introspection.

mod report;

use clap::{Parser, Subcommand};
use sql_describe::{Config, DescribeError, Describer, DialectImpl, DialectKind, QueryContext, SchemaDialect};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "sql-describe")]
#[command(about = "Describe tables on MySQL, PostgreSQL and SQL Server")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the columns, foreign keys and indexes of a table
    Describe {
        /// Table name
        table: String,

        /// Override the configured schema
        #[arg(long)]
        schema: Option<String>,

        /// Override the configured query timeout, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Test the database connection
    HealthCheck,

    /// Print the catalog queries of a dialect
    Queries {
        /// Dialect: mysql, postgres or mssql
        dialect: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DescribeError> {
    let cli = Cli::parse();

    // Needs neither config nor connection
    if let Commands::Queries { ref dialect } = cli.command {
        let dialect = DialectImpl::for_kind(DialectKind::parse(dialect)?);
        print_queries(&dialect, cli.output_json)?;
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Queries { .. } => unreachable!(), // Handled above
        Commands::Describe {
            table,
            schema,
            timeout,
        } => {
            if let Some(schema) = schema {
                config.connection.schema = Some(schema);
            }
            let timeout = timeout
                .map(Duration::from_secs)
                .or_else(|| config.describe.query_timeout());

            // Installed before connecting so Ctrl-C also aborts the connect
            let cancel_token = setup_signal_handler();
            let connect_ctx = QueryContext::new().with_cancel_token(cancel_token.clone());
            let describer = Describer::connect_with(&config, &connect_ctx).await?;

            let ctx = QueryContext::new()
                .with_cancel_token(cancel_token)
                .with_optional_timeout(timeout);
            let result = describer.describe_table(&table, &ctx).await;
            describer.close().await;
            let desc = result?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&desc)?);
            } else {
                print!("{}", report::table_report(describer.schema(), &table, &desc));
            }
        }

        Commands::HealthCheck => {
            let connect_ctx = QueryContext::new().with_cancel_token(setup_signal_handler());
            let describer = Describer::connect_with(&config, &connect_ctx).await?;
            let result = describer.health_check().await;
            describer.close().await;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print!("{}", report::health_report(&result));
            }

            if !result.healthy {
                return Err(DescribeError::pool(
                    result.error.unwrap_or_default(),
                    "health check failed",
                ));
            }
        }
    }

    Ok(())
}

fn print_queries(dialect: &DialectImpl, json: bool) -> Result<(), DescribeError> {
    if json {
        let queries: Vec<serde_json::Value> = sql_describe::QueryKind::ALL
            .iter()
            .map(|k| {
                let q = dialect.query(*k);
                serde_json::json!({
                    "dialect": dialect.name(),
                    "kind": q.kind.as_str(),
                    "params": q.params.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                    "sql": q.sql.trim(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&queries)?);
    } else {
        print!("{}", report::queries_report(dialect));
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Cancel the returned token on SIGINT (Ctrl-C) or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for (kind, name) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            let mut stream = match signal(kind) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to install {} handler: {}", name, e);
                    return;
                }
            };
            stream.recv().await;
            eprintln!("\nReceived {}. Cancelling describe...", name);
            token.cancel();
        });
    }

    cancel_token
}

/// Cancel the returned token on Ctrl-C.
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            return;
        }
        eprintln!("\nReceived Ctrl-C. Cancelling describe...");
        token.cancel();
    });

    cancel_token
}
