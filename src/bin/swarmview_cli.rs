//! Headless client for the optimization service.
//!
//! Examples:
//!   swarmview-cli objectives
//!   swarmview-cli schema bat
//!   swarmview-cli run --algorithm ga --objective rastrigin --param mutation_rate=0.05
//!
//! Talks to http://127.0.0.1:5000 by default; override with `--base-url`, or point
//! `--endpoint` / `SWARMVIEW_ENDPOINT` at the run URL directly.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swarmview::config::ClientConfig;
use swarmview::convergence::{AxisScale, ConvergenceSeries};
use swarmview::error::{ConfigError, RunError};
use swarmview::float_fmt::{fmt_f64_exp, fmt_f64_plain};
use swarmview::orchestrator::{RunOrchestrator, RunOutcome, RunSurfaces};
use swarmview::playback::{PlaybackClip, Placeholder};
use swarmview::protocol::{HttpReply, RunTransport, Stats};
use swarmview::request::{RunForm, RunRequest};
use swarmview::schema::{schema_for, AlgorithmId, FieldKind, ObjectiveId, GLOBAL_FIELDS, OBJECTIVES};
use swarmview::stats::{present_stats, ResultSummary};
use swarmview::validation::describe_rule;

#[derive(Parser)]
#[command(name = "swarmview-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit metaheuristic optimization runs and inspect the results", long_about = None)]
struct Cli {
    /// JSON client config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run endpoint (absolute URL or path relative to --base-url)
    #[arg(long, global = true, env = "SWARMVIEW_ENDPOINT")]
    endpoint: Option<String>,

    /// Server origin used for relative endpoints
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and submit a run, then print the results
    Run {
        #[arg(short, long, default_value = "abc")]
        algorithm: String,

        #[arg(short, long, default_value = "sphere")]
        objective: String,

        #[arg(long, default_value = "100")]
        iterations: String,

        #[arg(long, default_value = "2")]
        dimensions: String,

        #[arg(long, default_value = "20")]
        agents: String,

        /// Algorithm parameter override, repeatable
        #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Print the parameter fields of an algorithm
    Schema { algorithm: String },

    /// Print the objective catalog
    Objectives,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut cfg = match &cli.config {
        Some(path) => ClientConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        cfg.endpoint = endpoint.clone();
        cfg.validate()?;
    }
    Ok(cfg)
}

struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    fn new(url: String, timeout_ms: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { client, url })
    }
}

impl RunTransport for HttpTransport {
    async fn post_run(&self, request: &RunRequest) -> Result<HttpReply, RunError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| RunError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| RunError::Transport(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

/// Prints each panel as the orchestrator fills it.
struct TerminalSurfaces;

impl RunSurfaces for TerminalSurfaces {
    fn reset(&mut self) {}

    fn set_status(&mut self, text: &str) {
        eprintln!("{text}");
    }

    fn show_validation_errors(&mut self, messages: &[String]) {
        for m in messages {
            eprintln!("  - {m}");
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn show_summary(&mut self, summary: &ResultSummary) {
        println!("best value:    {}", summary.best_value);
        println!("best solution: {}", summary.solution_text());
    }

    fn show_stats(&mut self, stats: Option<&Stats>) {
        let Some(rows) = present_stats(stats) else {
            return;
        };
        println!();
        for row in rows {
            println!("{:<24}{}", row.label, row.value);
        }
    }

    fn show_convergence(&mut self, history: &[f64]) {
        let series = ConvergenceSeries::from_history(history);
        let scale = match series.scale {
            AxisScale::Log => "log",
            AxisScale::Linear => "linear",
        };
        println!();
        print!("convergence:   {} points, {scale} axis", series.len());
        if let (Some(first), Some(last)) = (history.first(), history.last()) {
            print!(", {} -> {}", fmt_f64_exp(*first, 4), fmt_f64_exp(*last, 4));
        }
        println!();
    }

    fn start_playback(&mut self, clip: PlaybackClip) {
        println!(
            "animation:     {} frames over [{}, {}]{}",
            clip.frame_count(),
            fmt_f64_plain(clip.bounds.0),
            fmt_f64_plain(clip.bounds.1),
            clip.background
                .map(|url| format!(", background {url}"))
                .unwrap_or_default(),
        );
    }

    fn show_placeholder(&mut self, placeholder: &Placeholder) {
        println!("animation:     {}", placeholder.message());
    }
}

fn print_schema(algorithm: &str) -> Result<(), String> {
    let schema = schema_for(&AlgorithmId::parse(algorithm)).map_err(|e| e.to_string())?;
    println!("{}", schema.title);
    for f in GLOBAL_FIELDS.iter().chain(schema.fields) {
        let kind = match f.kind {
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Enum => "enum",
        };
        let rule = match (f.rule, f.choices.is_empty()) {
            (Some(rule), _) => describe_rule(rule),
            (None, false) => {
                let values: Vec<&str> = f.choices.iter().map(|c| c.value).collect();
                format!("one of {}", values.join(", "))
            }
            (None, true) => String::new(),
        };
        println!("  {:<18}{:<7}{:<12}{}", f.name, kind, f.default, rule);
    }
    Ok(())
}

fn print_objectives() {
    for o in OBJECTIVES {
        println!("  {:<12}{:<12}{}", o.key, o.name, o.bounds_info);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    match &cli.command {
        Commands::Objectives => print_objectives(),
        Commands::Schema { algorithm } => {
            if let Err(e) = print_schema(algorithm) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        Commands::Run {
            algorithm,
            objective,
            iterations,
            dimensions,
            agents,
            params,
        } => {
            let mut form = RunForm {
                objective: ObjectiveId::parse(objective),
                iterations: iterations.clone(),
                dimensions: dimensions.clone(),
                agents: agents.clone(),
                ..RunForm::default()
            };
            form.select_algorithm(AlgorithmId::parse(algorithm));
            for (name, value) in params {
                if !form.panel.set_raw(name, value.as_str()) {
                    eprintln!("'{name}' is not a parameter of {}", form.algorithm().as_str());
                    process::exit(1);
                }
            }

            let url = cfg.endpoint_url(&cli.base_url);
            let transport = HttpTransport::new(url, cfg.request_timeout_ms)?;
            let mut orchestrator = RunOrchestrator::new();
            let outcome = orchestrator
                .submit(&transport, &form, &mut TerminalSurfaces)
                .await;
            if !matches!(outcome, RunOutcome::Succeeded) {
                process::exit(1);
            }
        }
    }

    Ok(())
}
