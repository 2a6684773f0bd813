//! SignalGrid CLI — parameter sweeps and single evaluations.
//!
//! Commands:
//! - `sweep` — run a TOML-configured grid search and export the result table
//! - `evaluate` — evaluate one strategy with one parameter combination

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use signalgrid_core::domain::PriceSeries;
use signalgrid_core::evaluation::{EvaluationMode, EvaluationOutcome, MetricName};
use signalgrid_core::params::{ParamName, ParameterCombination};
use signalgrid_core::strategy::{StrategyKind, StrategySettings};
use signalgrid_runner::{
    export_pivot_csv, load_csv, save_sweep, synthetic_series, GridSearch, LoadedSeries,
    ResultTable, SweepConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "signalgrid",
    about = "SignalGrid CLI — indicator strategy backtests and parameter sweeps"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a grid search from a TOML config file.
    Sweep {
        /// Path to the sweep config.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        data: DataArgs,

        /// Output directory for results.csv, sweep.json and pivot.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Number of ranked rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Ranking metric. Defaults to the evaluation mode's headline metric.
        #[arg(long)]
        metric: Option<MetricName>,
    },
    /// Evaluate a single parameter combination.
    Evaluate {
        /// sma_crossover, sma_trix or stoch_rsi_trix.
        #[arg(long)]
        strategy: StrategyKind,

        /// Parameter as name=value, repeatable (e.g. --param window_sma_short=2).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(ParamName, usize)>,

        #[command(flatten)]
        data: DataArgs,

        /// position, trade_pairs or price_difference. Defaults per strategy.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<EvaluationMode>,

        /// Commission fraction charged per signal row.
        #[arg(long, default_value_t = 0.001)]
        commission: f64,

        /// Starting balance.
        #[arg(long, default_value_t = 1000.0)]
        initial_cash: f64,

        /// Print the outcome as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Candle CSV with header timestamp,open,high,low,close,volume.
    #[arg(long, conflicts_with = "synthetic_bars", required_unless_present = "synthetic_bars")]
    data: Option<PathBuf>,

    /// Use a synthetic random walk of this many one-minute bars instead.
    #[arg(long)]
    synthetic_bars: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sweep {
            config,
            data,
            output_dir,
            top,
            metric,
        } => run_sweep_cmd(config, data, output_dir, top, metric),
        Commands::Evaluate {
            strategy,
            params,
            data,
            mode,
            commission,
            initial_cash,
            json,
        } => run_evaluate_cmd(strategy, params, data, mode, commission, initial_cash, json),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_param(s: &str) -> Result<(ParamName, usize), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name: ParamName = name.trim().parse()?;
    let value = value
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name, value))
}

fn parse_mode(s: &str) -> Result<EvaluationMode, String> {
    [
        EvaluationMode::Position,
        EvaluationMode::TradePairs,
        EvaluationMode::PriceDifference,
    ]
    .into_iter()
    .find(|m| m.to_string() == s)
    .ok_or_else(|| format!("unknown mode '{s}'. Valid: position, trade_pairs, price_difference"))
}

fn load_series(data: &DataArgs) -> Result<LoadedSeries> {
    match (&data.data, data.synthetic_bars) {
        (Some(path), _) => {
            load_csv(path).with_context(|| format!("failed to load {}", path.display()))
        }
        (None, Some(n)) => synthetic_series("signalgrid", n, chrono::Utc::now().timestamp_millis())
            .context("failed to generate synthetic series"),
        (None, None) => bail!("one of --data or --synthetic-bars is required"),
    }
}

fn run_sweep_cmd(
    config_path: PathBuf,
    data: DataArgs,
    output_dir: PathBuf,
    top: usize,
    metric: Option<MetricName>,
) -> Result<()> {
    let config = SweepConfig::load(&config_path)
        .with_context(|| format!("invalid sweep config {}", config_path.display()))?;
    let grid = config.grid()?;
    let loaded = load_series(&data)?;
    let run_id = config.run_id();

    let mut search = GridSearch::new(config.settings());
    if let Some(threads) = config.sweep.threads {
        search = search.with_threads(threads);
    }

    print_series(&loaded);
    println!(
        "Sweeping {} over {} combinations",
        config.strategy.kind,
        grid.len_valid()
    );

    let last_decile = AtomicUsize::new(0);
    let table = search.run_with_progress(config.strategy.kind, &loaded.series, &grid, |done, total| {
        let decile = done * 10 / total.max(1);
        if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            eprintln!("  {done}/{total} ({}%)", decile * 10);
        }
    })?;

    let metric = metric.unwrap_or_else(|| table.mode().headline_metric());
    print_table_summary(&table, metric, top);

    let run_dir = save_sweep(&output_dir, &table, &run_id, &loaded.dataset_hash)?;
    let axes = grid.axes();
    if axes.len() >= 2 {
        match table.pivot(axes[0].name, axes[1].name, metric) {
            Ok(pivot) => {
                let path = run_dir.join("pivot.csv");
                std::fs::write(&path, export_pivot_csv(&pivot)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            Err(e) => tracing::warn!(error = %e, "pivot skipped"),
        }
    }
    println!("Run id:         {run_id}");
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_evaluate_cmd(
    strategy: StrategyKind,
    params: Vec<(ParamName, usize)>,
    data: DataArgs,
    mode: Option<EvaluationMode>,
    commission: f64,
    initial_cash: f64,
    json: bool,
) -> Result<()> {
    if !(0.0..1.0).contains(&commission) {
        bail!("--commission must be in [0, 1), got {commission}");
    }
    if initial_cash <= 0.0 {
        bail!("--initial-cash must be positive, got {initial_cash}");
    }

    let loaded = load_series(&data)?;
    let mut settings = StrategySettings {
        evaluation: mode,
        ..StrategySettings::default()
    };
    settings.costs.commission = commission;
    settings.costs.initial_cash = initial_cash;

    let combination = ParameterCombination::new(params);
    let record = GridSearch::new(settings).evaluate_one(strategy, &loaded.series, &combination);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_series(&loaded);
    println!();
    println!("=== Evaluation ===");
    println!("Strategy:       {strategy}");
    println!("Parameters:     {combination}");
    println!("Status:         {}", record.outcome.status());
    match &record.outcome {
        EvaluationOutcome::Completed(metrics) => {
            println!("Mode:           {}", metrics.mode());
            for &name in metrics.mode().metric_names() {
                if let Some(value) = metrics.get(name) {
                    println!("{:<28}{}", format!("{name}:"), format_metric(value));
                }
            }
        }
        EvaluationOutcome::NoCompletedTrades {
            buy_signals,
            sell_signals,
        } => {
            println!("Buy signals:    {buy_signals}");
            println!("Sell signals:   {sell_signals}");
        }
        EvaluationOutcome::Failed { kind, message } => {
            println!("Failure:        {kind}: {message}");
        }
    }
    println!();
    Ok(())
}

fn print_series(loaded: &LoadedSeries) {
    let series: &PriceSeries = &loaded.series;
    let fmt_time = |ms: i64| {
        chrono::DateTime::from_timestamp_millis(ms)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ms.to_string())
    };
    println!(
        "Data:           {} bars, {} to {}",
        series.len(),
        fmt_time(series.first().timestamp),
        fmt_time(series.last().timestamp)
    );
    println!("Dataset hash:   {}", &loaded.dataset_hash[..16.min(loaded.dataset_hash.len())]);
    if loaded.dropped_rows > 0 {
        println!("Dropped rows:   {}", loaded.dropped_rows);
    }
    if loaded.synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }
}

fn print_table_summary(table: &ResultTable, metric: MetricName, top: usize) {
    println!();
    println!("=== Sweep Result ===");
    println!("Strategy:       {}", table.strategy());
    println!("Mode:           {}", table.mode());
    println!("Rows:           {}", table.len());
    println!("Completed:      {}", table.count_status("completed"));
    println!("No trades:      {}", table.count_status("no_completed_trades"));
    println!("Failed:         {}", table.count_status("failed"));
    println!();

    let ranked = table.top_n(metric, top);
    if ranked.is_empty() || ranked[0].metric(metric).is_none() {
        println!("No row produced {metric}.");
        return;
    }

    println!("--- Top {} by {metric} ---", ranked.len());
    let header: Vec<String> = table
        .param_names()
        .iter()
        .map(|p| format!("{:>18}", p.as_str()))
        .collect();
    println!("{} {:>18}", header.join(" "), metric.as_str());
    for record in ranked {
        let Some(value) = record.metric(metric) else {
            break;
        };
        let cells: Vec<String> = table
            .param_names()
            .iter()
            .map(|&p| format!("{:>18}", record.param(p).map_or("-".into(), |v| v.to_string())))
            .collect();
        println!("{} {:>18}", cells.join(" "), format_metric(value));
    }
    println!();
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.6}")
    }
}
