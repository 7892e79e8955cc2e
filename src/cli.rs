//! CLI definition and dispatch.

use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::alert_log_adapter::AlertLogAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::discord_adapter::DiscordAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestParams};
use crate::domain::config_validation::{validate_backtest_config, validate_monitor_config};
use crate::domain::error::CrosswatchError;
use crate::domain::indicator::MaSnapshot;
use crate::domain::monitor::{self, MonitorParams};
use crate::domain::signal::Signal;
use crate::ports::alert_port::{AlertPort, SignalAlert};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, Interval};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "crosswatch", about = "Moving-average crossover monitor and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Monitor a symbol and alert on new crossover signals
    Monitor {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay the strategy over historical data
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        months: Option<u32>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Read prices from <SYMBOL>.csv files in this directory instead of Yahoo
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Send one test BUY and one test SELL alert through the configured webhook
    TestAlert {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Monitor { config } => run_monitor(&config),
        Command::Backtest {
            config,
            symbol,
            months,
            output,
            data_dir,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            months,
            output.as_ref(),
            data_dir.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::TestAlert { config } => run_test_alert(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CrosswatchError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_monitor_params(config: &dyn ConfigPort) -> Result<MonitorParams, CrosswatchError> {
    let symbol = config
        .get_string("monitor", "symbol")
        .ok_or_else(|| CrosswatchError::ConfigMissing {
            section: "monitor".into(),
            key: "symbol".into(),
        })?;

    Ok(MonitorParams {
        symbol: symbol.trim().to_uppercase(),
        short_window: config.get_int("strategy", "short_window", 5) as usize,
        long_window: config.get_int("strategy", "long_window", 20) as usize,
        lookback_days: config.get_int("monitor", "lookback_days", 30),
    })
}

pub fn build_backtest_params(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    months_override: Option<u32>,
) -> Result<(BacktestParams, u32), CrosswatchError> {
    let symbol = match symbol_override {
        Some(s) => s.to_uppercase(),
        None => config
            .get_string("monitor", "symbol")
            .ok_or_else(|| CrosswatchError::ConfigMissing {
                section: "monitor".into(),
                key: "symbol".into(),
            })?
            .trim()
            .to_uppercase(),
    };

    let period_months =
        months_override.unwrap_or(config.get_int("backtest", "period_months", 6) as u32);

    let params = BacktestParams {
        symbol,
        short_window: config.get_int("strategy", "short_window", 5) as usize,
        long_window: config.get_int("strategy", "long_window", 20) as usize,
        initial_capital: config.get_double("backtest", "initial_capital", 10_000.0),
    };

    Ok((params, period_months))
}

/// Webhook delivery with a journal line on success. Without a webhook the
/// journal is the only sink.
struct MonitorAlerts {
    webhook: Option<DiscordAdapter>,
    journal: AlertLogAdapter,
}

impl AlertPort for MonitorAlerts {
    fn send(&self, alert: &SignalAlert) -> Result<(), CrosswatchError> {
        if let Some(webhook) = &self.webhook {
            webhook.send(alert)?;
        }
        if let Err(e) = self.journal.send(alert) {
            eprintln!("warning: failed to journal alert: {e}");
        }
        Ok(())
    }
}

fn build_monitor_alerts(config: &dyn ConfigPort) -> Result<MonitorAlerts, CrosswatchError> {
    let webhook = match config.get_string("alert", "discord_webhook_url") {
        Some(url) => Some(DiscordAdapter::new(&url)?),
        None => {
            eprintln!("warning: no Discord webhook configured, journaling alerts only");
            None
        }
    };

    let log_file = config
        .get_string("alert", "log_file")
        .unwrap_or_else(|| "alerts.log".to_string());

    Ok(MonitorAlerts {
        webhook,
        journal: AlertLogAdapter::new(PathBuf::from(log_file)),
    })
}

fn run_monitor(config_path: &PathBuf) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_monitor_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let params = match build_monitor_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let interval_minutes = adapter.get_int("monitor", "fetch_interval_minutes", 5) as u64;

    // Stage 2: Build adapters
    let alerts = match build_monitor_alerts(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = YahooAdapter::new();

    eprintln!(
        "Monitoring {} (short MA {}, long MA {}, every {} min, {} day lookback)",
        params.symbol,
        params.short_window,
        params.long_window,
        interval_minutes,
        params.lookback_days,
    );

    // Stage 3: Cycle loop; previous signal is threaded between cycles
    let mut previous: Option<Signal> = None;
    let mut iteration: u64 = 0;

    loop {
        iteration += 1;
        eprintln!(
            "[{}] cycle #{}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            iteration
        );

        match monitor::run_cycle(&data_port, &alerts, &params, previous) {
            Ok(report) => {
                eprintln!("  fetched {} points", report.points_fetched);
                if let Some(ratio) = report.compression_ratio {
                    eprintln!("  compression ratio: {ratio:.2}x");
                }
                if let Some(MaSnapshot {
                    short_ma,
                    long_ma,
                    current_price,
                }) = report.snapshot
                {
                    eprintln!(
                        "  price ${current_price:.2}  short MA ${short_ma:.2}  long MA ${long_ma:.2}"
                    );
                }
                match report.signal {
                    Some(signal) if report.alerted => {
                        eprintln!("  new {signal} signal, alert sent");
                    }
                    Some(signal) if report.delivery_failed => {
                        eprintln!("  new {signal} signal, alert delivery failed");
                    }
                    Some(signal) => eprintln!("  signal unchanged ({signal})"),
                    None => eprintln!("  no signal"),
                }
                previous = report.signal;
            }
            Err(e) => {
                eprintln!("  cycle failed: {e}, retrying next cycle");
            }
        }

        eprintln!("  next check in {interval_minutes} minutes");
        std::thread::sleep(std::time::Duration::from_secs(interval_minutes * 60));
    }
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    months_override: Option<u32>,
    output_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build params
    let (params, period_months) =
        match build_backtest_params(&adapter, symbol_override, months_override) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

    // Stage 4: Fetch historical series
    let end = Utc::now();
    let start = end - ChronoDuration::days(30 * period_months as i64);

    eprintln!(
        "Fetching {} months of daily data for {}...",
        period_months, params.symbol
    );

    let series = {
        let fetch = |port: &dyn DataPort| {
            port.fetch_closes(&params.symbol, start, end, Interval::Daily)
        };
        let result = match data_dir {
            Some(dir) => fetch(&CsvAdapter::new(dir.clone())),
            None => fetch(&YahooAdapter::new()),
        };
        match result {
            Ok(series) => series,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    };

    eprintln!("Loaded {} data points", series.len());

    // Stage 5: Run the engine
    let run = match backtest_engine::run(&series, &params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 6: Console summary
    let report = &run.report;
    eprintln!("\n=== Backtest Results: {} ===", params.symbol);
    eprintln!("Total Trades:     {}", report.total_trades);
    eprintln!("Winning Trades:   {}", report.winning_trades);
    eprintln!("Losing Trades:    {}", report.losing_trades);
    eprintln!("Win Rate:         {:.2}%", report.win_rate);
    eprintln!("Initial Capital:  ${:.2}", params.initial_capital);
    eprintln!("Final Capital:    ${:.2}", report.final_capital);
    eprintln!("Total Return:     ${:.2}", report.total_return);
    eprintln!("Return %:         {:+.2}%", report.total_return_pct);
    eprintln!("Avg Profit/Trade: ${:.2}", report.avg_profit_per_trade);
    eprintln!("Best Trade:       ${:.2}", report.max_profit);
    eprintln!("Worst Trade:      ${:.2}", report.max_loss);
    eprintln!("Max Drawdown:     {:.2}%", report.max_drawdown_pct);

    // Stage 7: Optional JSON report
    if let Some(output) = output_path {
        match JsonReportAdapter.write(&run, &params, &output.display().to_string()) {
            Ok(()) => eprintln!("\nReport written to: {}", output.display()),
            Err(e) => {
                eprintln!("error: failed to write report: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_monitor_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let params = match build_monitor_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nConfiguration is valid:");
    eprintln!("  symbol:          {}", params.symbol);
    eprintln!("  short window:    {}", params.short_window);
    eprintln!("  long window:     {}", params.long_window);
    eprintln!("  lookback days:   {}", params.lookback_days);
    eprintln!(
        "  fetch interval:  {} minutes",
        adapter.get_int("monitor", "fetch_interval_minutes", 5)
    );
    eprintln!(
        "  webhook:         {}",
        if adapter.get_string("alert", "discord_webhook_url").is_some() {
            "configured"
        } else {
            "not configured"
        }
    );

    ExitCode::SUCCESS
}

fn run_test_alert(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let url = match adapter.get_string("alert", "discord_webhook_url") {
        Some(url) => url,
        None => {
            let err = CrosswatchError::ConfigMissing {
                section: "alert".into(),
                key: "discord_webhook_url".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let webhook = match DiscordAdapter::new(&url) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let snapshot = MaSnapshot {
        short_ma: 124.0,
        long_ma: 122.5,
        current_price: 123.45,
    };

    for signal in [Signal::Buy, Signal::Sell] {
        eprintln!("Sending test {signal} alert...");
        let alert = SignalAlert {
            symbol: "AAPL".into(),
            signal,
            price: 123.45,
            snapshot: Some(snapshot),
            at: Utc::now(),
        };
        match webhook.send(&alert) {
            Ok(()) => eprintln!("  {signal} alert sent"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    eprintln!("Alert system test complete");
    ExitCode::SUCCESS
}
