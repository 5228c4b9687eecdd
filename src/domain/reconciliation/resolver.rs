use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::domain::invoice::{CustomerId, ValueObjectError};

use super::normalizer::fold;

/// Literal result text the upstream matcher writes for rows it could not place.
pub const UNMATCHED_SENTINEL: &str = "not matched";

const SHEET_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Largest unit rate a group may bill at.
pub const MAX_UNIT_RATE: u32 = 1_000_000;

/// How group keys relate to the text found in the result column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
  /// Keys are the literal values written into the result column.
  #[default]
  LiteralValue,
  /// Keys are source file paths; rows name the file they matched against.
  FileIdentity,
}

impl FromStr for ResolutionStrategy {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "literal_value" => Ok(ResolutionStrategy::LiteralValue),
      "file_identity" => Ok(ResolutionStrategy::FileIdentity),
      other => Err(ValueObjectError::InvalidStrategy(other.to_string())),
    }
  }
}

/// Unit rates by product class; unset rates bill at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rates {
  pub rate10: Decimal,
  pub rate20: Decimal,
}

/// Billing configuration for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
  #[serde(default, deserialize_with = "blank_as_none")]
  pub customer_id: Option<CustomerId>,
  #[serde(default, deserialize_with = "checked_rate")]
  pub rate10: Option<Decimal>,
  #[serde(default, deserialize_with = "checked_rate")]
  pub rate20: Option<Decimal>,
  #[serde(default)]
  pub display_name: Option<String>,
}

impl GroupConfig {
  pub fn for_customer(customer_id: CustomerId) -> Self {
    Self {
      customer_id: Some(customer_id),
      ..Self::default()
    }
  }

  pub fn with_rates(mut self, rate10: Option<Decimal>, rate20: Option<Decimal>) -> Self {
    self.rate10 = rate10;
    self.rate20 = rate20;
    self
  }

  pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = Some(display_name.into());
    self
  }

  pub fn rates(&self) -> Rates {
    Rates {
      rate10: self.rate10.unwrap_or_default(),
      rate20: self.rate20.unwrap_or_default(),
    }
  }

  pub fn is_complete(&self) -> bool {
    self.customer_id.is_some()
  }

  /// Checks both rates; configs built in code skip the deserializer checks.
  pub fn validate(&self) -> Result<(), ValueObjectError> {
    for rate in [self.rate10, self.rate20].into_iter().flatten() {
      validate_rate(rate)?;
    }
    Ok(())
  }
}

/// A unit rate is non-negative, at most [`MAX_UNIT_RATE`] and has at most 2 decimal places.
pub fn validate_rate(rate: Decimal) -> Result<Decimal, ValueObjectError> {
  if rate.is_sign_negative() && !rate.is_zero() {
    return Err(ValueObjectError::InvalidRate(format!(
      "Rate cannot be negative: {}",
      rate
    )));
  }
  if rate > Decimal::from(MAX_UNIT_RATE) {
    return Err(ValueObjectError::InvalidRate(format!(
      "Rate cannot exceed {}: {}",
      MAX_UNIT_RATE, rate
    )));
  }
  if rate.normalize().scale() > 2 {
    return Err(ValueObjectError::InvalidRate(format!(
      "Rate cannot have more than 2 decimal places: {}",
      rate
    )));
  }
  Ok(rate)
}

fn checked_rate<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<Decimal>::deserialize(deserializer)?
    .map(validate_rate)
    .transpose()
    .map_err(serde::de::Error::custom)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<CustomerId>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  match raw {
    Some(value) if !value.trim().is_empty() => CustomerId::new(value)
      .map(Some)
      .map_err(serde::de::Error::custom),
    _ => Ok(None),
  }
}

/// Group key → configuration, in registration order.
pub type GroupConfigurations = IndexMap<String, GroupConfig>;

/// True when at least one group can be billed.
pub fn has_assigned_customer(groups: &GroupConfigurations) -> bool {
  groups.values().any(GroupConfig::is_complete)
}

/// A row that resolved to a billable group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatch {
  pub group_key: String,
  pub customer_id: CustomerId,
  pub rates: Rates,
}

/// Raw outcome of looking a result text up in the label index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupLookup<'a> {
  /// Empty text or an explicit no-match marker.
  Unmatched,
  /// Text present but no label matched it.
  NotFound,
  Found {
    key: &'a str,
    config: &'a GroupConfig,
  },
}

#[derive(Debug, Clone)]
struct IndexedLabel<'a> {
  label: String,
  key: &'a str,
  config: &'a GroupConfig,
}

/// Maps result-column text onto configured groups.
///
/// Exact label matches win over containment; among containment matches the first
/// registered label wins.
#[derive(Debug, Clone)]
pub struct GroupResolver<'a> {
  labels: Vec<IndexedLabel<'a>>,
  no_match_label: Option<String>,
}

impl<'a> GroupResolver<'a> {
  pub fn new(
    groups: &'a GroupConfigurations,
    strategy: ResolutionStrategy,
    no_match_label: &str,
  ) -> Self {
    let mut labels: Vec<IndexedLabel<'a>> = Vec::new();

    for (key, config) in groups {
      for raw in label_sources(key, config, strategy) {
        let label = canonical_label(raw);
        if label.is_empty() {
          continue;
        }
        if labels.iter().any(|l| l.label == label && l.key == key.as_str()) {
          continue;
        }
        labels.push(IndexedLabel {
          label,
          key: key.as_str(),
          config,
        });
      }
    }

    tracing::debug!(labels = labels.len(), ?strategy, "Group label index built");

    let no_match_label = Some(fold(no_match_label)).filter(|label| !label.is_empty());
    Self {
      labels,
      no_match_label,
    }
  }

  pub fn lookup(&self, text: &str) -> GroupLookup<'a> {
    if self.is_unmatched(text) {
      return GroupLookup::Unmatched;
    }

    let canonical = canonical_label(text);
    let hit = self
      .labels
      .iter()
      .find(|entry| entry.label == canonical)
      .or_else(|| {
        self
          .labels
          .iter()
          .find(|entry| canonical.contains(entry.label.as_str()))
      });

    match hit {
      Some(entry) => GroupLookup::Found {
        key: entry.key,
        config: entry.config,
      },
      None => GroupLookup::NotFound,
    }
  }

  /// Resolves a row's result text to a billable group, or `None` when the row is dropped.
  pub fn resolve(&self, text: &str) -> Option<ResolvedMatch> {
    match self.lookup(text) {
      GroupLookup::Found { key, config } => {
        config.customer_id.as_ref().map(|customer_id| ResolvedMatch {
          group_key: key.to_string(),
          customer_id: customer_id.clone(),
          rates: config.rates(),
        })
      }
      GroupLookup::Unmatched | GroupLookup::NotFound => None,
    }
  }

  pub fn is_unmatched(&self, text: &str) -> bool {
    let folded = fold(text);
    folded.is_empty()
      || folded == UNMATCHED_SENTINEL
      || self.no_match_label.as_deref() == Some(folded.as_str())
  }
}

fn label_sources<'k>(
  key: &'k str,
  config: &'k GroupConfig,
  strategy: ResolutionStrategy,
) -> Vec<&'k str> {
  let display = config.display_name.as_deref();
  match strategy {
    ResolutionStrategy::LiteralValue => [Some(key), display].into_iter().flatten().collect(),
    ResolutionStrategy::FileIdentity => [display, Some(file_name(key)), Some(key)]
      .into_iter()
      .flatten()
      .collect(),
  }
}

fn file_name(path: &str) -> &str {
  path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Case-folded label with any spreadsheet extension removed.
pub fn canonical_label(text: &str) -> String {
  let folded = fold(text);
  SHEET_EXTENSIONS
    .iter()
    .find_map(|ext| folded.strip_suffix(ext))
    .map(|stem| stem.trim().to_string())
    .unwrap_or(folded)
}
