//! Bar granularity definitions.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::TickbarsError;

/// A fixed bar granularity, in whole seconds.
///
/// Windows are left-closed and left-labeled, aligned to the Unix epoch: a
/// window of `n` seconds starting at `t` covers `[t, t + n)`.
///
/// Rules parse from and render as the `"<N>s"` form (for example `"60s"`),
/// which is also the key of the per-granularity output map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rule {
    seconds: u32,
}

impl Rule {
    /// Creates a rule from a window length in seconds.
    ///
    /// Returns `None` for a zero-length window.
    #[must_use]
    pub const fn from_seconds(seconds: u32) -> Option<Self> {
        if seconds == 0 {
            None
        } else {
            Some(Self { seconds })
        }
    }

    /// Returns the window length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Returns the window length as a duration.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.seconds))
    }

    /// Returns the start of the window that contains `timestamp`.
    ///
    /// Computed as `floor(epoch_seconds / n) * n`.
    #[must_use]
    pub fn window_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let width = i64::from(self.seconds);
        let floored = timestamp.timestamp().div_euclid(width) * width;
        DateTime::from_timestamp(floored, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('s')
            .map(str::trim_end)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| RuleParseError(s.to_string()))?;

        digits
            .parse::<u32>()
            .ok()
            .and_then(Self::from_seconds)
            .ok_or_else(|| RuleParseError(s.to_string()))
    }
}

impl TryFrom<String> for Rule {
    type Error = RuleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

/// Error returned when parsing an invalid rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleParseError(String);

impl std::fmt::Display for RuleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid rule '{}', only positive whole-second rules like '60s' are supported",
            self.0
        )
    }
}

impl std::error::Error for RuleParseError {}

/// Human-facing timeframe labels mapped to bar granularities.
///
/// Entries are kept ascending by window length. Several labels may share a
/// rule; they then share a single buffer and output series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeMap {
    entries: Vec<(String, Rule)>,
}

impl TimeframeMap {
    /// The default timeframe menu, from one minute up to one day.
    pub const DEFAULT_MENU: &'static [(&'static str, &'static str)] = &[
        ("1m", "60s"),
        ("5m", "300s"),
        ("15m", "900s"),
        ("30m", "1800s"),
        ("1h", "3600s"),
        ("2h", "7200s"),
        ("4h", "14400s"),
        ("12h", "43200s"),
        ("1d", "86400s"),
    ];

    /// Builds a map from `(label, rule)` pairs.
    pub fn new<L: Into<String>>(entries: impl IntoIterator<Item = (L, Rule)>) -> Self {
        let mut entries: Vec<_> = entries
            .into_iter()
            .map(|(label, rule)| (label.into(), rule))
            .collect();
        entries.sort_by_key(|(_, rule)| *rule);
        Self { entries }
    }

    /// Builds a map from `(label, "<N>s")` pairs, validating every rule.
    ///
    /// # Errors
    ///
    /// Returns the first rule string that is not of the whole-second form.
    pub fn parse_pairs<L, R>(pairs: impl IntoIterator<Item = (L, R)>) -> Result<Self, RuleParseError>
    where
        L: Into<String>,
        R: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, rule)| Ok((label.into(), rule.as_ref().parse::<Rule>()?)))
            .collect::<Result<Vec<_>, RuleParseError>>()?;
        Ok(Self::new(entries))
    }

    /// Parses a JSON object of `label -> "<N>s"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any rule is invalid.
    pub fn from_json(json: &str) -> Result<Self, TickbarsError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::parse_pairs(raw)?)
    }

    /// Returns the distinct rules, ascending by window length.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules: Vec<_> = self.entries.iter().map(|(_, rule)| *rule).collect();
        rules.dedup();
        rules
    }

    /// Looks up the rule for a label.
    #[must_use]
    pub fn rule_for(&self, label: &str) -> Option<Rule> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, rule)| *rule)
    }

    /// Restricts the map to the given labels.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first label not present in the map.
    pub fn select<S: AsRef<str>>(&self, labels: &[S]) -> Result<Self, TickbarsError> {
        let entries = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.rule_for(label)
                    .map(|rule| (label.to_string(), rule))
                    .ok_or_else(|| TickbarsError::UnknownTimeframe(label.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    /// Iterates over `(label, rule)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rule)> + '_ {
        self.entries.iter().map(|(label, rule)| (label.as_str(), *rule))
    }

    /// Returns the number of labels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no labels are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TimeframeMap {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MENU.iter().filter_map(|(label, rule)| {
            rule.parse::<Rule>().ok().map(|rule| (*label, rule))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rule_parse() {
        assert_eq!("60s".parse::<Rule>().unwrap().seconds(), 60);
        assert_eq!(" 300 s ".parse::<Rule>().unwrap().seconds(), 300);
        assert!("0s".parse::<Rule>().is_err());
        assert!("1m".parse::<Rule>().is_err());
        assert!("s".parse::<Rule>().is_err());
        assert!("-5s".parse::<Rule>().is_err());
        assert!("1.5s".parse::<Rule>().is_err());
    }

    #[test]
    fn test_rule_display_round_trips_through_serde() {
        let rule: Rule = "900s".parse().unwrap();
        assert_eq!(rule.to_string(), "900s");
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, "\"900s\"");
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
        assert!(serde_json::from_str::<Rule>("\"15m\"").is_err());
    }

    #[test]
    fn test_window_start() {
        let rule = Rule::from_seconds(60).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 45).unwrap();
        assert_eq!(
            rule.window_start(ts),
            Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 0).unwrap()
        );

        let four_hours = Rule::from_seconds(14_400).unwrap();
        assert_eq!(
            four_hours.window_start(ts),
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_default_menu() {
        let map = TimeframeMap::default();
        assert_eq!(map.len(), 9);
        assert_eq!(map.rule_for("1h").unwrap().seconds(), 3600);
        assert_eq!(map.rules().first().unwrap().seconds(), 60);
        assert_eq!(map.rules().last().unwrap().seconds(), 86_400);
    }

    #[test]
    fn test_shared_rule_is_listed_once() {
        let map = TimeframeMap::parse_pairs([("1m", "60s"), ("minute", "60 s"), ("5m", "300s")])
            .unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.rules().len(), 2);
    }

    #[test]
    fn test_from_json() {
        let map = TimeframeMap::from_json(r#"{"5m": "300s", "1m": "60s"}"#).unwrap();
        let labels: Vec<_> = map.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["1m", "5m"]);

        let err = TimeframeMap::from_json(r#"{"1mo": "1M"}"#).unwrap_err();
        assert!(matches!(err, TickbarsError::InvalidRule(_)));
    }

    #[test]
    fn test_select_unknown_label() {
        let map = TimeframeMap::default();
        let selected = map.select(&["1d", "1m"]).unwrap();
        assert_eq!(selected.rules().len(), 2);
        assert!(matches!(
            map.select(&["3m"]),
            Err(TickbarsError::UnknownTimeframe(label)) if label == "3m"
        ));
    }
}
