//! Operator price tables and the ranking policies used to pick one operator.

use crate::errors::ProviderError;
use crate::types::OperatorName;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Price and historical success rate of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorPrice {
    /// Cost of one number in the account currency.
    pub cost: f64,
    /// Historical delivery success rate, in percent, when the provider
    /// reports one. Rate-based policies skip operators without it.
    pub success_rate: Option<f64>,
}

/// Snapshot of operator prices for one (country, service) pair.
///
/// Fetched fresh for every price query and never mutated afterwards. Entries
/// keep the order in which the adapter read them, which decides exact ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    entries: Vec<(OperatorName, OperatorPrice)>,
}

impl PriceTable {
    /// Build a table from entries in source order.
    pub fn new(entries: Vec<(OperatorName, OperatorPrice)>) -> Self {
        Self { entries }
    }

    /// Returns true when no operator is offered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of operators in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up one operator.
    pub fn get(&self, operator: &OperatorName) -> Option<&OperatorPrice> {
        self.entries
            .iter()
            .find(|(name, _)| name == operator)
            .map(|(_, price)| price)
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&OperatorName, &OperatorPrice)> {
        self.entries.iter().map(|(name, price)| (name, price))
    }
}

impl FromIterator<(OperatorName, OperatorPrice)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (OperatorName, OperatorPrice)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Rule used to pick the winning operator from a [`PriceTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RankingPolicy {
    /// Lowest cost wins.
    #[default]
    CheapestFirst,
    /// Highest cost wins. A zero-cost operator is never selected.
    MostExpensiveFirst,
    /// Highest success rate wins.
    HighestSuccessRateFirst,
    /// Lowest success rate wins.
    LowestSuccessRateFirst,
}

impl RankingPolicy {
    /// All policies.
    pub const ALL: [RankingPolicy; 4] = [
        Self::CheapestFirst,
        Self::MostExpensiveFirst,
        Self::HighestSuccessRateFirst,
        Self::LowestSuccessRateFirst,
    ];

    /// Short name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheapestFirst => "price_low",
            Self::MostExpensiveFirst => "price_high",
            Self::HighestSuccessRateFirst => "success_high",
            Self::LowestSuccessRateFirst => "success_low",
        }
    }

    fn sentinel(&self) -> f64 {
        match self {
            Self::CheapestFirst | Self::LowestSuccessRateFirst => f64::INFINITY,
            Self::MostExpensiveFirst | Self::HighestSuccessRateFirst => 0.0,
        }
    }

    fn metric(&self, price: &OperatorPrice) -> Option<f64> {
        match self {
            Self::CheapestFirst | Self::MostExpensiveFirst => Some(price.cost),
            Self::HighestSuccessRateFirst | Self::LowestSuccessRateFirst => price.success_rate,
        }
    }

    fn improves(&self, candidate: f64, best: f64) -> bool {
        match self {
            Self::CheapestFirst | Self::LowestSuccessRateFirst => candidate < best,
            Self::MostExpensiveFirst | Self::HighestSuccessRateFirst => candidate > best,
        }
    }
}

impl Display for RankingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RankingPolicy {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price_low" | "cheapest_first" => Ok(Self::CheapestFirst),
            "price_high" | "most_expensive_first" => Ok(Self::MostExpensiveFirst),
            "success_high" | "highest_success_rate_first" => Ok(Self::HighestSuccessRateFirst),
            "success_low" | "lowest_success_rate_first" => Ok(Self::LowestSuccessRateFirst),
            other => Err(ProviderError::Configuration {
                message: format!("invalid ranking policy '{other}'"),
            }),
        }
    }
}

/// The operator chosen by [`select_best_operator`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// Winning operator.
    pub operator: OperatorName,
    /// Its cost.
    pub price: f64,
    /// Its success rate, if reported.
    pub success_rate: Option<f64>,
}

/// Pick the best operator from `table` under `policy`.
///
/// Single pass; the first strictly better entry replaces the running best and
/// the first of several equal entries stands. Returns `None` for an empty
/// table, and also when no entry beats the policy's starting sentinel (for
/// instance a table of zero-cost operators under
/// [`RankingPolicy::MostExpensiveFirst`]). Entries without a success rate
/// never win under the rate-based policies.
pub fn select_best_operator(table: &PriceTable, policy: RankingPolicy) -> Option<PriceQuote> {
    let mut best_metric = policy.sentinel();
    let mut best: Option<(&OperatorName, &OperatorPrice)> = None;

    for (operator, price) in table.iter() {
        let Some(metric) = policy.metric(price) else {
            continue;
        };
        if policy.improves(metric, best_metric) {
            best_metric = metric;
            best = Some((operator, price));
        }
    }

    best.map(|(operator, price)| PriceQuote {
        operator: operator.clone(),
        price: price.cost,
        success_rate: price.success_rate,
    })
}
