//! Scenario files: the users, channels and transfers a `pcn run` replays.
//!
//! A scenario shares its TOML document with [`PcnConfig`], so one file can
//! carry `[engine]`, `[logging]` and `[driver]` settings next to the
//! `[[users]]`, `[[channels]]` and `[[transfers]]` tables.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use pcn_core::{PcnConfig, UserId};
use pcn_node::PaymentNetwork;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
    #[serde(default)]
    pub transfers: Vec<TransferSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSpec {
    pub id: u64,
    /// Defaults to `User<id>`.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub a: u64,
    pub b: u64,
    /// Funding from `a`. Negative values are rejected when the channel opens.
    pub initial: i64,
}

/// A transfer along an explicit `path`, or from `from` to `to` along the
/// shortest path at the time it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSpec {
    pub path: Option<Vec<u64>>,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub amount: i64,
}

/// A transfer ready to hand to the network. The amount stays signed until
/// it runs, so a negative one fails that transfer alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    Explicit { path: Vec<UserId>, amount: i128 },
    Routed { from: UserId, to: UserId, amount: i128 },
}

impl TransferRequest {
    pub fn amount(&self) -> i128 {
        match self {
            Self::Explicit { amount, .. } | Self::Routed { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { path, amount } => {
                let rendered: Vec<String> =
                    path.iter().map(|user| user.as_u64().to_string()).collect();
                write!(f, "{amount} along [{}]", rendered.join(", "))
            }
            Self::Routed { from, to, amount } => {
                write!(f, "{amount} from {} to {}", from.as_u64(), to.as_u64())
            }
        }
    }
}

/// Counts from replaying the setup part of a scenario.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SetupReport {
    pub users: usize,
    pub channels: usize,
    pub rejected: usize,
}

impl UserSpec {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("User{}", self.id))
    }
}

impl TransferSpec {
    pub fn request(&self) -> anyhow::Result<TransferRequest> {
        let amount = i128::from(self.amount);
        match (&self.path, self.from, self.to) {
            (Some(path), None, None) => Ok(TransferRequest::Explicit {
                path: path.iter().copied().map(UserId).collect(),
                amount,
            }),
            (None, Some(from), Some(to)) => Ok(TransferRequest::Routed {
                from: UserId(from),
                to: UserId(to),
                amount,
            }),
            _ => anyhow::bail!("a transfer needs either `path` or both `from` and `to`"),
        }
    }
}

impl Scenario {
    /// Parse a scenario file, returning its configuration alongside it.
    pub fn load(path: &Path) -> anyhow::Result<(PcnConfig, Scenario)> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<(PcnConfig, Scenario)> {
        let config = PcnConfig::from_toml(contents)?;
        let scenario: Scenario = toml::from_str(contents)?;
        Ok((config, scenario))
    }

    /// Every transfer in file order, checked for shape before anything runs.
    pub fn requests(&self) -> anyhow::Result<Vec<TransferRequest>> {
        self.transfers
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.request().with_context(|| format!("transfer #{}", index + 1)))
            .collect()
    }

    /// Register the users and open the channels. Rejected operations are
    /// logged and counted; the rest of the setup still runs.
    pub fn apply(&self, network: &PaymentNetwork) -> SetupReport {
        let mut report = SetupReport::default();
        for user in &self.users {
            match network.register(UserId(user.id), user.display_name()) {
                Ok(()) => report.users += 1,
                Err(err) => {
                    tracing::warn!(user = user.id, error = %err, "registration rejected");
                    report.rejected += 1;
                }
            }
        }
        for channel in &self.channels {
            let initial = i128::from(channel.initial);
            match network.open_channel(UserId(channel.a), UserId(channel.b), initial) {
                Ok(_) => report.channels += 1,
                Err(err) => {
                    tracing::warn!(a = channel.a, b = channel.b, error = %err, "channel rejected");
                    report.rejected += 1;
                }
            }
        }
        report
    }
}

/// The scenario written by `pcn init`.
pub const SAMPLE: &str = r#"# PCN scenario

[engine]
# Uncomment to cap the number of hops in a transfer.
# max_path_len = 20

[logging]
level = "info"
format = "text"

[driver]
report_every = 10
concurrency = 1

[[users]]
id = 1
name = "User1"

[[users]]
id = 2
name = "User2"

[[users]]
id = 3
name = "User3"

[[users]]
id = 4
name = "User4"

# `a` funds the channel; `b` starts at zero.
[[channels]]
a = 1
b = 2
initial = 10

[[channels]]
a = 2
b = 3
initial = 5

[[channels]]
a = 3
b = 4
initial = 8

[[transfers]]
path = [1, 2]
amount = 4

[[transfers]]
path = [1, 2]
amount = 20

[[transfers]]
path = [1, 2, 3]
amount = 5

[[transfers]]
from = 2
to = 4
amount = 3

[[transfers]]
path = [1, 3]
amount = 1
"#;
