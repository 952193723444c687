//! Flattens raw market records into the analytic table.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetcher::{RawMarket, RawNumber, RawOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticRow {
    pub id: String,
    pub question: String,
    pub category: String,
    pub volume: f64,
    pub yes_price: f64,
    pub no_price: f64,
    pub yes_volume: f64,
    pub no_volume: f64,
    pub total_volume: f64,
    pub end_date: DateTime<Utc>,
    pub days_to_end: i64,
}

/// The two sides of a binary market, taken from outcome index 0 (yes) and 1 (no).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomePair<'a> {
    pub yes: &'a RawOutcome,
    pub no: &'a RawOutcome,
}

impl<'a> OutcomePair<'a> {
    pub fn from_market(market: &'a RawMarket) -> Result<Self, ShapeError> {
        match market.outcomes.as_slice() {
            [yes, no] => Ok(Self { yes, no }),
            other => Err(ShapeError::OutcomeCount {
                market_id: market.id.clone(),
                found: other.len(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("market {market_id} has {found} outcomes, expected exactly 2")]
    OutcomeCount { market_id: String, found: usize },
    #[error("market {market_id} is missing field {field}")]
    MissingField {
        market_id: String,
        field: &'static str,
    },
    #[error("market {market_id}: failed to parse field {field} value '{value}'")]
    ParseField {
        market_id: String,
        field: &'static str,
        value: String,
    },
    #[error("market {market_id}: end timestamp {seconds} is out of range")]
    InvalidTimestamp { market_id: String, seconds: i64 },
}

/// Shapes every market in order. The first malformed record aborts the pass.
pub fn shape_markets(
    markets: &[RawMarket],
    now: DateTime<Utc>,
) -> Result<Vec<AnalyticRow>, ShapeError> {
    markets
        .iter()
        .map(|market| shape_market(market, now))
        .collect()
}

pub fn shape_markets_now(markets: &[RawMarket]) -> Result<Vec<AnalyticRow>, ShapeError> {
    shape_markets(markets, Utc::now())
}

pub fn shape_market(market: &RawMarket, now: DateTime<Utc>) -> Result<AnalyticRow, ShapeError> {
    let id = market.id.as_str();
    let volume = parse_f64(id, "volume", &market.volume)?;

    let outcomes = OutcomePair::from_market(market)?;
    let yes_price = required_f64(id, "outcomes[0].price", &outcomes.yes.price)?;
    let no_price = required_f64(id, "outcomes[1].price", &outcomes.no.price)?;
    let yes_volume = required_f64(
        id,
        "outcomes[0].totalVolumeYes",
        &outcomes.yes.total_volume_yes,
    )?;
    let no_volume = required_f64(id, "outcomes[1].totalVolumeNo", &outcomes.no.total_volume_no)?;

    let end_seconds = parse_i64(id, "endDate", &market.end_date)?;
    let end_date = Utc
        .timestamp_opt(end_seconds, 0)
        .single()
        .ok_or_else(|| ShapeError::InvalidTimestamp {
            market_id: id.to_string(),
            seconds: end_seconds,
        })?;

    Ok(AnalyticRow {
        id: market.id.clone(),
        question: market.question.clone(),
        category: market.category.clone(),
        volume,
        yes_price,
        no_price,
        yes_volume,
        no_volume,
        total_volume: yes_volume + no_volume,
        end_date,
        days_to_end: days_between(now, end_date),
    })
}

/// Whole days from `now` until `end`, rounded toward negative infinity.
pub fn days_between(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let delta = end - now;
    // num_days truncates toward zero; step down when a fraction of a day was cut off.
    let days = delta.num_days();
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

fn required_f64(
    market_id: &str,
    field: &'static str,
    value: &Option<RawNumber>,
) -> Result<f64, ShapeError> {
    let raw = value.as_ref().ok_or_else(|| ShapeError::MissingField {
        market_id: market_id.to_string(),
        field,
    })?;
    parse_f64(market_id, field, raw)
}

fn parse_f64(market_id: &str, field: &'static str, raw: &RawNumber) -> Result<f64, ShapeError> {
    let parsed = match raw {
        RawNumber::Number(number) => number.as_f64(),
        RawNumber::Text(text) => text.trim().parse::<f64>().ok(),
    };
    parsed.ok_or_else(|| ShapeError::ParseField {
        market_id: market_id.to_string(),
        field,
        value: raw.as_text(),
    })
}

fn parse_i64(market_id: &str, field: &'static str, raw: &RawNumber) -> Result<i64, ShapeError> {
    let parsed = match raw {
        RawNumber::Number(number) => number.as_i64(),
        RawNumber::Text(text) => text.trim().parse::<i64>().ok(),
    };
    parsed.ok_or_else(|| ShapeError::ParseField {
        market_id: market_id.to_string(),
        field,
        value: raw.as_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(price: &str, yes: Option<&str>, no: Option<&str>) -> RawOutcome {
        RawOutcome {
            price: Some(RawNumber::from(price)),
            total_volume_yes: yes.map(RawNumber::from),
            total_volume_no: no.map(RawNumber::from),
        }
    }

    fn market(id: &str, outcomes: Vec<RawOutcome>) -> RawMarket {
        RawMarket {
            id: id.to_string(),
            question: format!("question {id}"),
            category: "Crypto".to_string(),
            volume: RawNumber::from("1000.5"),
            outcomes,
            end_date: RawNumber::from("1700000000"),
        }
    }

    fn binary(id: &str) -> RawMarket {
        market(
            id,
            vec![
                outcome("0.6", Some("600"), None),
                outcome("0.4", None, Some("400")),
            ],
        )
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn reference_record_shapes_to_expected_row() {
        let row = shape_market(&binary("m1"), at(1_699_000_000)).unwrap();

        assert_eq!(row.id, "m1");
        assert_eq!(row.category, "Crypto");
        assert_eq!(row.volume, 1000.5);
        assert_eq!(row.yes_price, 0.6);
        assert_eq!(row.no_price, 0.4);
        assert_eq!(row.yes_volume, 600.0);
        assert_eq!(row.no_volume, 400.0);
        assert_eq!(row.total_volume, 1000.0);
        assert_eq!(row.end_date.timestamp(), 1_700_000_000);
        assert_eq!(row.days_to_end, 11);
    }

    #[test]
    fn days_to_end_floors_and_goes_negative() {
        let end = at(1_700_000_000);
        assert_eq!(days_between(at(1_700_000_000), end), 0);
        assert_eq!(days_between(at(1_700_000_001), end), -1);
        assert_eq!(days_between(at(1_700_000_000 - 86_400), end), 1);
        assert_eq!(days_between(at(1_700_000_000 - 86_399), end), 0);
        assert_eq!(days_between(at(1_700_000_000 + 3 * 86_400), end), -3);
    }

    #[test]
    fn sub_millisecond_past_end_is_already_minus_one() {
        let end = at(1_700_000_000);
        let just_after = end + TimeDelta::microseconds(500);
        assert_eq!(days_between(just_after, end), -1);

        let just_before = end - TimeDelta::nanoseconds(1);
        assert_eq!(days_between(just_before, end), 0);

        let day_and_a_hair_late = end + TimeDelta::days(1) + TimeDelta::nanoseconds(1);
        assert_eq!(days_between(day_and_a_hair_late, end), -2);
    }

    #[test]
    fn order_is_preserved_and_one_row_per_record() {
        let markets = vec![binary("a"), binary("b"), binary("c")];
        let rows = shape_markets(&markets, at(1_690_000_000)).unwrap();
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn wrong_outcome_count_is_rejected() {
        let single = market("m9", vec![outcome("0.5", Some("1"), None)]);
        assert_eq!(
            shape_market(&single, at(0)).unwrap_err(),
            ShapeError::OutcomeCount {
                market_id: "m9".to_string(),
                found: 1
            }
        );

        let triple = market(
            "m10",
            vec![
                outcome("0.3", Some("1"), None),
                outcome("0.3", None, Some("1")),
                outcome("0.4", None, None),
            ],
        );
        assert!(matches!(
            shape_market(&triple, at(0)),
            Err(ShapeError::OutcomeCount { found: 3, .. })
        ));
    }

    #[test]
    fn malformed_numeric_field_names_the_field() {
        let mut bad = binary("m3");
        bad.volume = RawNumber::from("12,5");
        assert_eq!(
            shape_market(&bad, at(0)).unwrap_err(),
            ShapeError::ParseField {
                market_id: "m3".to_string(),
                field: "volume",
                value: "12,5".to_string()
            }
        );

        let mut fractional_end = binary("m4");
        fractional_end.end_date = RawNumber::from("1700000000.5");
        assert!(matches!(
            shape_market(&fractional_end, at(0)),
            Err(ShapeError::ParseField { field: "endDate", .. })
        ));
    }

    #[test]
    fn missing_side_volume_is_reported() {
        let swapped = market(
            "m5",
            vec![
                outcome("0.6", None, Some("600")),
                outcome("0.4", None, Some("400")),
            ],
        );
        assert_eq!(
            shape_market(&swapped, at(0)).unwrap_err(),
            ShapeError::MissingField {
                market_id: "m5".to_string(),
                field: "outcomes[0].totalVolumeYes"
            }
        );
    }

    #[test]
    fn first_bad_record_aborts_the_pass() {
        let mut bad = binary("bad");
        bad.outcomes.pop();
        let markets = vec![binary("ok"), bad, binary("never")];
        assert!(shape_markets(&markets, at(0)).is_err());
    }
}
