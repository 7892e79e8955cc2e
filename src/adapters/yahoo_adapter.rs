//! Yahoo Finance data adapter.
//!
//! Fetches closing prices from Yahoo's v8 chart API with the blocking
//! reqwest client. Yahoo has no official API and changes formats without
//! notice; the CSV adapter is the offline fallback.

use crate::domain::error::CrosswatchError;
use crate::domain::series::PricePoint;
use crate::ports::data_port::{DataPort, Interval};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    fn chart_url(symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={}&period2={}&interval={}",
            start.timestamp(),
            end.timestamp(),
            interval.as_str(),
        )
    }

    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
    ) -> Result<Vec<PricePoint>, CrosswatchError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => CrosswatchError::NoData {
                symbol: symbol.to_string(),
            },
            Some(err) => CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: format!("{}: {}", err.code, err.description),
            },
            None => CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: "empty result with no error".into(),
            },
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: "result array is empty".into(),
            })?;

        let timestamps = data.timestamp.ok_or_else(|| CrosswatchError::Fetch {
            symbol: symbol.to_string(),
            reason: "no timestamps".into(),
        })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| CrosswatchError::Fetch {
                symbol: symbol.to_string(),
                reason: "no quote data".into(),
            })?;

        let mut points = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp =
                DateTime::from_timestamp(ts, 0).ok_or_else(|| CrosswatchError::Fetch {
                    symbol: symbol.to_string(),
                    reason: format!("invalid timestamp: {ts}"),
                })?;

            // null close rows are holidays or not-yet-settled bars
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };

            points.push(PricePoint::new(timestamp, close));
        }

        if points.is_empty() {
            return Err(CrosswatchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        Ok(points)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, CrosswatchError> {
        let url = Self::chart_url(symbol, start, end, interval);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(CrosswatchError::Fetch {
                            symbol: symbol.to_string(),
                            reason: "rate limited".into(),
                        });
                        continue;
                    }

                    if !status.is_success() {
                        last_error = Some(CrosswatchError::Fetch {
                            symbol: symbol.to_string(),
                            reason: format!("HTTP {status}"),
                        });
                        continue;
                    }

                    let chart: ChartResponse =
                        resp.json().map_err(|e| CrosswatchError::Fetch {
                            symbol: symbol.to_string(),
                            reason: format!("failed to parse response: {e}"),
                        })?;

                    return Self::parse_response(symbol, chart);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(CrosswatchError::Fetch {
                            symbol: symbol.to_string(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    return Err(CrosswatchError::Fetch {
                        symbol: symbol.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CrosswatchError::Fetch {
            symbol: symbol.to_string(),
            reason: "max retries exceeded".into(),
        }))
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPort for YahooAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, CrosswatchError> {
        self.fetch_with_retry(symbol, start, end, interval)
    }

    fn fetch_latest_price(&self, symbol: &str) -> Result<f64, CrosswatchError> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(2);
        let points = self.fetch_with_retry(symbol, start, end, Interval::FiveMinute)?;
        points
            .last()
            .map(|p| p.close)
            .ok_or_else(|| CrosswatchError::NoData {
                symbol: symbol.to_string(),
            })
    }
}
