use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed asset categories tracked per client. Wire names follow the
/// advisory book's historical labels ("FD", "Others").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Equity,
    Bond,
    Gold,
    #[serde(rename = "FD", alias = "FixedDeposit")]
    FixedDeposit,
    #[serde(rename = "RealEstate", alias = "RealState")]
    RealEstate,
    #[serde(rename = "Other", alias = "Others")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Retirement,
    Education,
    Home,
    Car,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: String,
}

impl FinancialGoal {
    /// Fraction of the target achieved; 0 when the target is unset.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            0.0
        } else {
            self.current_amount / self.target_amount
        }
    }

    pub fn is_realized(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub category: AssetClass,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub name: String,
    pub age: u32,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub risk_score: u32,
    pub portfolio_value: f64,
    #[serde(default)]
    pub assets: Vec<Holding>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
}

impl ClientRecord {
    pub fn average_goal_progress(&self) -> f64 {
        if self.goals.is_empty() {
            return 0.0;
        }
        let total: f64 = self.goals.iter().map(FinancialGoal::progress).sum();
        total / self.goals.len() as f64
    }

    pub fn has_realized_goal(&self) -> bool {
        self.goals.iter().any(FinancialGoal::is_realized)
    }

    /// Combined value held in one asset class.
    pub fn asset_value(&self, class: AssetClass) -> f64 {
        self.assets
            .iter()
            .filter(|h| h.category == class)
            .map(|h| h.value)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    #[default]
    All,
    #[serde(alias = "onTrack")]
    OnTrack,
    Behind,
    Realized,
}

/// Segmentation filter for the advisor dashboard. Defaults match everything.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerFilter {
    /// Case-insensitive substring match on client name or email.
    pub search: Option<String>,
    pub min_risk: u32,
    pub max_risk: u32,
    pub min_aum: f64,
    pub max_aum: Option<f64>,
    pub status: GoalStatus,
}

impl Default for LedgerFilter {
    fn default() -> Self {
        Self {
            search: None,
            min_risk: 0,
            max_risk: 100,
            min_aum: 0.0,
            max_aum: None,
            status: GoalStatus::All,
        }
    }
}

impl LedgerFilter {
    pub fn matches(&self, client: &ClientRecord) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = client.name.to_lowercase().contains(&term)
                || client.email.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if client.risk_score < self.min_risk || client.risk_score > self.max_risk {
            return false;
        }

        if client.portfolio_value < self.min_aum {
            return false;
        }
        if let Some(max_aum) = self.max_aum {
            if client.portfolio_value > max_aum {
                return false;
            }
        }

        match self.status {
            GoalStatus::All => true,
            GoalStatus::OnTrack => client.average_goal_progress() > 0.5,
            GoalStatus::Behind => {
                !client.goals.is_empty() && client.average_goal_progress() <= 0.5
            }
            GoalStatus::Realized => client.has_realized_goal(),
        }
    }
}

pub fn filter_clients<'a>(
    clients: &'a [ClientRecord],
    filter: &LedgerFilter,
) -> Vec<&'a ClientRecord> {
    clients.iter().filter(|c| filter.matches(c)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMetrics {
    pub total_aum: f64,
    pub active_clients: usize,
    pub average_risk_score: f64,
}

pub fn ledger_metrics(clients: &[ClientRecord]) -> LedgerMetrics {
    let total_aum = clients.iter().map(|c| c.portfolio_value).sum();
    let average_risk_score = if clients.is_empty() {
        0.0
    } else {
        clients.iter().map(|c| f64::from(c.risk_score)).sum::<f64>() / clients.len() as f64
    };
    LedgerMetrics {
        total_aum,
        active_clients: clients.len(),
        average_risk_score,
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode ledger export: {0}")]
    Csv(#[from] csv::Error),
    #[error("ledger export was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub const EXPORT_HEADERS: [&str; 17] = [
    "Client Name",
    "Phone number",
    "Email id",
    "Risk Score",
    "Equity",
    "Bond",
    "Gold",
    "Fixed Deposit",
    "Real Estate",
    "Other",
    "Total",
    "Goal 1",
    "Amt 1",
    "Goal 2",
    "Amt 2",
    "Goal 3",
    "Amt 3",
];

fn export_row(client: &ClientRecord) -> Vec<String> {
    let goal_columns = (0..3).flat_map(|idx| match client.goals.get(idx) {
        Some(goal) => [goal.title.clone(), goal.target_amount.to_string()],
        None => ["-".to_string(), "0".to_string()],
    });

    let mut row = vec![
        client.name.clone(),
        client.phone.clone().unwrap_or_else(|| "N/A".to_string()),
        client.email.clone(),
        client.risk_score.to_string(),
        client.asset_value(AssetClass::Equity).to_string(),
        client.asset_value(AssetClass::Bond).to_string(),
        client.asset_value(AssetClass::Gold).to_string(),
        client.asset_value(AssetClass::FixedDeposit).to_string(),
        client.asset_value(AssetClass::RealEstate).to_string(),
        client.asset_value(AssetClass::Other).to_string(),
        client.portfolio_value.to_string(),
    ];
    row.extend(goal_columns);
    row
}

/// Renders the filtered book of clients as the dashboard's 17-column CSV
/// export: identity, per-asset-class values, total AUM, first three goals.
pub fn export_ledger_csv(clients: &[&ClientRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for client in clients {
        writer.write_record(export_row(client))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Sample book used when the server starts with an empty ledger, mirroring
/// the advisory's demo data.
pub fn seed_clients() -> Vec<ClientRecord> {
    vec![
        ClientRecord {
            name: "Amit Sharma".to_string(),
            age: 34,
            email: "amit@vision.com".to_string(),
            phone: Some("+91 98300 12345".to_string()),
            risk_score: 35,
            portfolio_value: 1_250_000.0,
            assets: vec![
                Holding { category: AssetClass::Equity, value: 750_000.0, remark: None },
                Holding { category: AssetClass::Bond, value: 300_000.0, remark: None },
                Holding { category: AssetClass::Gold, value: 100_000.0, remark: None },
                Holding { category: AssetClass::FixedDeposit, value: 100_000.0, remark: None },
            ],
            notes: Some("Planning for early retirement.".to_string()),
            goals: vec![
                FinancialGoal {
                    id: "1".to_string(),
                    title: "Child Education".to_string(),
                    kind: GoalKind::Education,
                    target_amount: 5_000_000.0,
                    current_amount: 1_200_000.0,
                    deadline: "2035-01-01".to_string(),
                },
                FinancialGoal {
                    id: "1b".to_string(),
                    title: "World Tour".to_string(),
                    kind: GoalKind::Other,
                    target_amount: 1_000_000.0,
                    current_amount: 500_000.0,
                    deadline: "2028-01-01".to_string(),
                },
            ],
        },
        ClientRecord {
            name: "Sneha Gupta".to_string(),
            age: 28,
            email: "sneha@growth.in".to_string(),
            phone: Some("+91 88200 55443".to_string()),
            risk_score: 52,
            portfolio_value: 4_500_000.0,
            assets: vec![
                Holding { category: AssetClass::Equity, value: 3_800_000.0, remark: None },
                Holding { category: AssetClass::Gold, value: 700_000.0, remark: None },
            ],
            notes: Some("Young professional seeking high alpha.".to_string()),
            goals: vec![FinancialGoal {
                id: "2".to_string(),
                title: "Dream Home".to_string(),
                kind: GoalKind::Home,
                target_amount: 20_000_000.0,
                current_amount: 18_000_000.0,
                deadline: "2030-06-15".to_string(),
            }],
        },
        ClientRecord {
            name: "Rajesh Kumar".to_string(),
            age: 62,
            email: "rajesh@retired.com".to_string(),
            phone: Some("+91 99033 88221".to_string()),
            risk_score: 12,
            portfolio_value: 8_500_000.0,
            assets: vec![
                Holding { category: AssetClass::Bond, value: 5_000_000.0, remark: None },
                Holding { category: AssetClass::FixedDeposit, value: 3_000_000.0, remark: None },
                Holding { category: AssetClass::Gold, value: 500_000.0, remark: None },
            ],
            notes: Some("Post-retirement income generation.".to_string()),
            goals: vec![FinancialGoal {
                id: "3".to_string(),
                title: "Health Reserve".to_string(),
                kind: GoalKind::Other,
                target_amount: 2_000_000.0,
                current_amount: 1_500_000.0,
                deadline: "2025-01-01".to_string(),
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_clients() -> Vec<ClientRecord> {
        seed_clients()
    }

    #[test]
    fn goal_progress_guards_zero_target() {
        let goal = FinancialGoal {
            id: "g".to_string(),
            title: "Unset".to_string(),
            kind: GoalKind::Other,
            target_amount: 0.0,
            current_amount: 100.0,
            deadline: "2030-01-01".to_string(),
        };
        assert_eq!(goal.progress(), 0.0);
        assert!(!goal.is_realized());
    }

    #[test]
    fn default_filter_matches_everyone() {
        let clients = sample_clients();
        let matched = filter_clients(&clients, &LedgerFilter::default());
        assert_eq!(matched.len(), clients.len());
    }

    #[test]
    fn search_matches_name_and_email_case_insensitively() {
        let clients = sample_clients();

        let filter = LedgerFilter {
            search: Some("SNEHA".to_string()),
            ..LedgerFilter::default()
        };
        let matched = filter_clients(&clients, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Sneha Gupta");

        let filter = LedgerFilter {
            search: Some("retired.com".to_string()),
            ..LedgerFilter::default()
        };
        let matched = filter_clients(&clients, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Rajesh Kumar");
    }

    #[test]
    fn risk_and_aum_ranges_bound_the_segment() {
        let clients = sample_clients();

        let filter = LedgerFilter {
            min_risk: 30,
            max_risk: 60,
            ..LedgerFilter::default()
        };
        assert_eq!(filter_clients(&clients, &filter).len(), 2);

        let filter = LedgerFilter {
            min_aum: 2_000_000.0,
            max_aum: Some(5_000_000.0),
            ..LedgerFilter::default()
        };
        let matched = filter_clients(&clients, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Sneha Gupta");
    }

    #[test]
    fn goal_status_segments_split_the_book() {
        let clients = sample_clients();

        // Amit: (0.24 + 0.5) / 2 = 0.37 -> behind. Sneha: 0.9 -> on track.
        // Rajesh: 0.75 -> on track. Nobody has a realized goal.
        let on_track = LedgerFilter {
            status: GoalStatus::OnTrack,
            ..LedgerFilter::default()
        };
        assert_eq!(filter_clients(&clients, &on_track).len(), 2);

        let behind = LedgerFilter {
            status: GoalStatus::Behind,
            ..LedgerFilter::default()
        };
        let matched = filter_clients(&clients, &behind);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Amit Sharma");

        let realized = LedgerFilter {
            status: GoalStatus::Realized,
            ..LedgerFilter::default()
        };
        assert!(filter_clients(&clients, &realized).is_empty());
    }

    #[test]
    fn metrics_aggregate_the_whole_book() {
        let clients = sample_clients();
        let metrics = ledger_metrics(&clients);
        assert_eq!(metrics.active_clients, 3);
        assert_eq!(metrics.total_aum, 14_250_000.0);
        assert!((metrics.average_risk_score - 33.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_on_empty_book_are_zero() {
        let metrics = ledger_metrics(&[]);
        assert_eq!(metrics.active_clients, 0);
        assert_eq!(metrics.total_aum, 0.0);
        assert_eq!(metrics.average_risk_score, 0.0);
    }

    #[test]
    fn csv_export_has_header_and_one_row_per_client() {
        let clients = sample_clients();
        let refs: Vec<&ClientRecord> = clients.iter().collect();
        let csv = export_ledger_csv(&refs).expect("export succeeds");

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Client Name,Phone number,Email id,Risk Score"));
        assert!(lines[1].contains("Amit Sharma"));
        assert!(lines[1].contains("750000"));
        assert!(lines[1].contains("Child Education"));
        // Missing third goal pads with the dash sentinel.
        assert!(lines[2].ends_with("-,0,-,0"));
    }

    #[test]
    fn asset_value_sums_holdings_per_class() {
        let clients = sample_clients();
        let amit = &clients[0];
        assert_eq!(amit.asset_value(AssetClass::Equity), 750_000.0);
        assert_eq!(amit.asset_value(AssetClass::RealEstate), 0.0);
    }
}
