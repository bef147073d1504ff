use serde::{Deserialize, Serialize};

use crate::datasource::pagination::Timestamped;

/// One executed trade leg. Amounts stay as the strings the API sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub coin: String,
    pub closed_pnl: String,
    pub fee: String,
    pub time: i64,
}

/// Funding cash flow for one position at one funding interval
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawFundingEvent")]
pub struct FundingEvent {
    pub time: i64,
    pub coin: String,
    pub usdc: String,
}

#[derive(Deserialize)]
struct RawFundingEvent {
    time: i64,
    #[serde(default)]
    coin: Option<String>,
    #[serde(default)]
    usdc: Option<String>,
    #[serde(default)]
    delta: Option<RawFundingDelta>,
}

#[derive(Deserialize)]
struct RawFundingDelta {
    #[serde(default)]
    coin: Option<String>,
    #[serde(default)]
    usdc: Option<String>,
}

impl TryFrom<RawFundingEvent> for FundingEvent {
    type Error = String;

    // The info API nests the payment under `delta`; older payloads are flat.
    fn try_from(raw: RawFundingEvent) -> Result<Self, Self::Error> {
        let (delta_coin, delta_usdc) = raw
            .delta
            .map(|d| (d.coin, d.usdc))
            .unwrap_or_default();

        let usdc = delta_usdc
            .or(raw.usdc)
            .ok_or_else(|| format!("funding record at {} has no usdc amount", raw.time))?;
        let coin = delta_coin.or(raw.coin).unwrap_or_default();

        Ok(Self {
            time: raw.time,
            coin,
            usdc,
        })
    }
}

impl Timestamped for Fill {
    fn timestamp_ms(&self) -> i64 {
        self.time
    }
}

impl Timestamped for FundingEvent {
    fn timestamp_ms(&self) -> i64 {
        self.time
    }
}

/// Clearinghouse state at fetch time. Absent pieces read as zero downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    #[serde(default)]
    pub asset_positions: Option<Vec<AssetPosition>>,
    #[serde(default)]
    pub margin_summary: Option<MarginSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPosition {
    pub position: PositionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginSummary {
    #[serde(default)]
    pub account_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fill_ignores_extra_fields() {
        let fill: Fill = serde_json::from_value(json!({
            "coin": "BTC",
            "closedPnl": "12.5",
            "fee": "0.3",
            "time": 1_700_000_000_000_i64,
            "px": "35000.0",
            "sz": "0.01",
            "side": "A",
            "oid": 1
        }))
        .unwrap();
        assert_eq!(fill.closed_pnl, "12.5");
        assert_eq!(fill.fee, "0.3");
        assert_eq!(fill.timestamp_ms(), 1_700_000_000_000);
    }

    #[test]
    fn funding_prefers_nested_delta() {
        let event: FundingEvent = serde_json::from_value(json!({
            "time": 5,
            "hash": "0x00",
            "delta": {"type": "funding", "coin": "ETH", "usdc": "-0.42", "szi": "1.0", "fundingRate": "0.0001"}
        }))
        .unwrap();
        assert_eq!(event.coin, "ETH");
        assert_eq!(event.usdc, "-0.42");
    }

    #[test]
    fn funding_accepts_flat_shape() {
        let event: FundingEvent =
            serde_json::from_value(json!({"time": 5, "coin": "SOL", "usdc": "1.5"})).unwrap();
        assert_eq!(event.coin, "SOL");
        assert_eq!(event.usdc, "1.5");
    }

    #[test]
    fn funding_without_amount_is_rejected() {
        let result = serde_json::from_value::<FundingEvent>(json!({"time": 5, "coin": "SOL"}));
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_tolerates_missing_and_null_sections() {
        let empty: AccountSnapshot = serde_json::from_value(json!({})).unwrap();
        assert!(empty.asset_positions.is_none());
        assert!(empty.margin_summary.is_none());

        let nulls: AccountSnapshot =
            serde_json::from_value(json!({"assetPositions": null, "marginSummary": null})).unwrap();
        assert!(nulls.asset_positions.is_none());

        let full: AccountSnapshot = serde_json::from_value(json!({
            "assetPositions": [{"type": "oneWay", "position": {"coin": "BTC", "szi": "0.1", "unrealizedPnl": "3.25"}}],
            "marginSummary": {"accountValue": "1000.0", "totalNtlPos": "0.0"},
            "withdrawable": "900.0"
        }))
        .unwrap();
        let positions = full.asset_positions.unwrap();
        assert_eq!(positions[0].position.unrealized_pnl.as_deref(), Some("3.25"));
        assert_eq!(
            full.margin_summary.unwrap().account_value.as_deref(),
            Some("1000.0")
        );
    }
}
