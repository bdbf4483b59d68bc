//! Business snapshot read model
//!
//! Everything the dashboard knows about the bot arrives as an immutable
//! `BusinessSnapshot` cloned out of the bot store at render time. The
//! dashboard never writes to it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Lifecycle status reported by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    #[default]
    Starting,
    Running,
    Executing,
    Stopping,
    Stopped,
    Error,
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotStatus::Starting => write!(f, "starting"),
            BotStatus::Running => write!(f, "running"),
            BotStatus::Executing => write!(f, "executing"),
            BotStatus::Stopping => write!(f, "stopping"),
            BotStatus::Stopped => write!(f, "stopped"),
            BotStatus::Error => write!(f, "error"),
        }
    }
}

/// User-triggered commands forwarded to the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotCommand {
    /// Stop trading and shut down
    #[serde(rename = "bot:stop")]
    Stop,
    /// Re-run the most recently computed route
    #[serde(rename = "execute:recentRoute")]
    ExecuteRecentRoute,
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotCommand::Stop => write!(f, "bot:stop"),
            BotCommand::ExecuteRecentRoute => write!(f, "execute:recentRoute"),
        }
    }
}

/// Chart series sampled by the bot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSeries {
    pub price: Vec<f64>,
    pub expected_profit_percent: Vec<f64>,
}

/// Token balance held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub symbol: String,
    pub amount: f64,
}

/// Wallet known to the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

/// Single executed (or attempted) trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: String,
    pub side: String,
    pub route: String,
    pub in_amount: f64,
    pub out_amount: f64,
    pub expected_profit_pct: f64,
    pub profit: f64,
    pub status: String,
}

impl TradeRecord {
    /// Cell values in trade-table column order
    pub fn cells(&self) -> [String; 8] {
        [
            self.timestamp.clone(),
            self.side.clone(),
            self.route.clone(),
            format!("{:.6}", self.in_amount),
            format!("{:.6}", self.out_amount),
            format!("{:+.4}", self.expected_profit_pct),
            format!("{:+.6}", self.profit),
            self.status.clone(),
        ]
    }
}

/// Single captured log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

/// Point-in-time copy of the bot state consumed by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSnapshot {
    pub status: BotStatus,
    pub price: Option<f64>,
    pub price_inverted: Option<f64>,
    pub chart: ChartSeries,
    pub wallets: Vec<WalletInfo>,
    pub trade_history: Vec<TradeRecord>,
    /// Bot settings shown on the config screen (sorted for stable output)
    pub config: BTreeMap<String, String>,
    pub logs: VecDeque<LogEntry>,
    /// Bot-side timestamp of the last update, preformatted
    pub updated_at: Option<String>,
}

impl BusinessSnapshot {
    /// First wallet address, if any
    pub fn primary_wallet_address(&self) -> Option<&str> {
        self.wallets
            .first()
            .map(|w| w.address.as_str())
            .filter(|a| !a.trim().is_empty())
    }

    /// Most recent expected profit sample
    pub fn last_expected_profit(&self) -> Option<f64> {
        self.chart.expected_profit_percent.last().copied()
    }

    /// Price before the most recent sample
    pub fn previous_price(&self) -> Option<f64> {
        let values = &self.chart.price;
        values.len().checked_sub(2).map(|i| values[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_wallet_address() {
        let mut snapshot = BusinessSnapshot::default();
        assert_eq!(snapshot.primary_wallet_address(), None);

        snapshot.wallets.push(WalletInfo {
            address: "  ".into(),
            label: None,
            balances: vec![],
        });
        assert_eq!(snapshot.primary_wallet_address(), None);

        snapshot.wallets[0].address = "So1anaWa11et".into();
        assert_eq!(snapshot.primary_wallet_address(), Some("So1anaWa11et"));
    }

    #[test]
    fn test_previous_price() {
        let mut snapshot = BusinessSnapshot::default();
        assert_eq!(snapshot.previous_price(), None);
        snapshot.chart.price = vec![1.0];
        assert_eq!(snapshot.previous_price(), None);
        snapshot.chart.price = vec![1.0, 2.0, 3.0];
        assert_eq!(snapshot.previous_price(), Some(2.0));
    }

    #[test]
    fn test_bot_command_wire_names() {
        assert_eq!(BotCommand::Stop.to_string(), "bot:stop");
        assert_eq!(
            serde_json::to_string(&BotCommand::ExecuteRecentRoute).unwrap(),
            "\"execute:recentRoute\""
        );
    }

    #[test]
    fn test_snapshot_deserialize_partial_json() {
        let json = r#"{"status":"running","price":1.5,"chart":{"price":[1.4,1.5]}}"#;
        let snapshot: BusinessSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.status, BotStatus::Running);
        assert_eq!(snapshot.price, Some(1.5));
        assert!(snapshot.chart.expected_profit_percent.is_empty());
        assert!(snapshot.wallets.is_empty());
    }

    #[test]
    fn test_trade_record_cells_order() {
        let record = TradeRecord {
            timestamp: "12:00:00".into(),
            side: "buy".into(),
            route: "USDC>SOL>USDC".into(),
            in_amount: 1.0,
            out_amount: 1.01,
            expected_profit_pct: 1.0,
            profit: 0.01,
            status: "ok".into(),
        };
        let cells = record.cells();
        assert_eq!(cells[0], "12:00:00");
        assert_eq!(cells[2], "USDC>SOL>USDC");
        assert_eq!(cells[5], "+1.0000");
        assert_eq!(cells[7], "ok");
    }
}
