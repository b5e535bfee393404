//! Wire types for the Hyperliquid `clearinghouseState` query.

use serde::{Deserialize, Serialize};

use crate::domain::position::{nullable_text, parse_decimal};
use crate::domain::{AccountSnapshot, CumulativeFunding, Leverage, Position};

/// Request body for `POST /info`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearinghouseRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user: &'a str,
}

impl<'a> ClearinghouseRequest<'a> {
    #[must_use]
    pub fn new(user: &'a str) -> Self {
        Self {
            kind: "clearinghouseState",
            user,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginSummary {
    #[serde(default, deserialize_with = "nullable_text")]
    pub account_value: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub total_ntl_pos: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub total_margin_used: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageDto {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumFundingDto {
    #[serde(default, deserialize_with = "nullable_text")]
    pub all_time: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub since_open: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub coin: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub szi: String,
    #[serde(default)]
    pub leverage: LeverageDto,
    #[serde(default, deserialize_with = "nullable_text")]
    pub entry_px: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub position_value: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub unrealized_pnl: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub return_on_equity: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub liquidation_px: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub margin_used: String,
    #[serde(default)]
    pub cum_funding: CumFundingDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetPosition {
    pub position: PositionDto,
}

/// Response body of the `clearinghouseState` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    #[serde(default)]
    pub margin_summary: MarginSummary,
    #[serde(default)]
    pub asset_positions: Vec<AssetPosition>,
}

impl From<PositionDto> for Position {
    fn from(p: PositionDto) -> Self {
        Self {
            symbol: p.coin,
            size: p.szi,
            leverage: Leverage {
                kind: p.leverage.kind,
                value: p.leverage.value,
            },
            entry_price: p.entry_px,
            position_value: p.position_value,
            unrealized_pnl: p.unrealized_pnl,
            return_on_equity: p.return_on_equity,
            liquidation_price: p.liquidation_px,
            margin_used: p.margin_used,
            cumulative_funding: CumulativeFunding {
                all_time: p.cum_funding.all_time,
                since_open: p.cum_funding.since_open,
            },
        }
    }
}

impl From<ClearinghouseState> for AccountSnapshot {
    fn from(state: ClearinghouseState) -> Self {
        let account_value = parse_decimal(&state.margin_summary.account_value);
        AccountSnapshot::new(
            state
                .asset_positions
                .into_iter()
                .map(|a| Position::from(a.position)),
            account_value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "marginSummary": {
            "accountValue": "13109.482328",
            "totalNtlPos": "4405.5",
            "totalRawUsd": "8704.0",
            "totalMarginUsed": "440.55"
        },
        "crossMarginSummary": {
            "accountValue": "13109.482328",
            "totalNtlPos": "4405.5",
            "totalRawUsd": "8704.0",
            "totalMarginUsed": "440.55"
        },
        "crossMaintenanceMarginUsed": "44.0",
        "withdrawable": "12668.9",
        "assetPositions": [
            {
                "type": "oneWay",
                "position": {
                    "coin": "ETH",
                    "szi": "-1.5",
                    "leverage": { "type": "cross", "value": 10 },
                    "entryPx": "2937.0",
                    "positionValue": "4405.5",
                    "unrealizedPnl": "-12.3",
                    "returnOnEquity": "-0.0279",
                    "liquidationPx": null,
                    "marginUsed": "440.55",
                    "maxLeverage": 50,
                    "cumFunding": { "allTime": "5.1", "sinceOpen": "1.2", "sinceChange": "0.3" }
                }
            }
        ],
        "time": 1708622398623
    }"#;

    #[test]
    fn decodes_clearinghouse_state() {
        let state: ClearinghouseState = serde_json::from_str(SAMPLE).unwrap();
        let snapshot = AccountSnapshot::from(state);

        assert!((snapshot.account_value - 13109.482328).abs() < 1e-9);
        let eth = &snapshot.positions["ETH"];
        assert_eq!(eth.size(), -1.5);
        assert_eq!(eth.leverage.kind, "cross");
        assert_eq!(eth.leverage.value, 10);
        assert_eq!(eth.entry_price(), 2937.0);
        assert_eq!(eth.liquidation_price, "");
        assert_eq!(eth.funding_since_open(), 1.2);
    }

    #[test]
    fn decodes_empty_account() {
        let state: ClearinghouseState =
            serde_json::from_str(r#"{"marginSummary":{"accountValue":"0.0"},"assetPositions":[]}"#)
                .unwrap();
        let snapshot = AccountSnapshot::from(state);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.account_value, 0.0);
    }

    #[test]
    fn malformed_account_value_is_zero() {
        let state: ClearinghouseState =
            serde_json::from_str(r#"{"marginSummary":{"accountValue":"oops"}}"#).unwrap();
        assert_eq!(AccountSnapshot::from(state).account_value, 0.0);
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(ClearinghouseRequest::new("0xabc")).unwrap();
        assert_eq!(body["type"], "clearinghouseState");
        assert_eq!(body["user"], "0xabc");
    }
}
