//! Analytics value types and the bucketing function.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use restoboost_shared::types::VenueId;
use serde::{Deserialize, Serialize};

use super::error::AnalyticsError;
use crate::review::ScanEventKind;

/// Reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    /// Last 7 days.
    #[serde(rename = "7d")]
    Last7Days,
    /// Last 30 days.
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    /// Last 90 days.
    #[serde(rename = "90d")]
    Last90Days,
    /// Whole history.
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Canonical query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::All => "all",
        }
    }

    /// Window length in days, `None` for the whole history.
    #[must_use]
    pub const fn days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::All => None,
        }
    }

    /// Start of the window relative to `now`.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "all" => Ok(Self::All),
            other => Err(AnalyticsError::InvalidRange(other.to_string())),
        }
    }
}

/// Event totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    /// `scan` events.
    pub scans: u64,
    /// `positive_redirect` events.
    pub positive_redirects: u64,
    /// `negative_feedback` events.
    pub negative_feedback: u64,
}

impl EventCounts {
    /// Counts one event.
    pub fn record(&mut self, kind: ScanEventKind) {
        match kind {
            ScanEventKind::Scan => self.scans += 1,
            ScanEventKind::PositiveRedirect => self.positive_redirects += 1,
            ScanEventKind::NegativeFeedback => self.negative_feedback += 1,
        }
    }

    /// Adds another set of counts.
    pub fn merge(&mut self, other: &Self) {
        self.scans += other.scans;
        self.positive_redirects += other.positive_redirects;
        self.negative_feedback += other.negative_feedback;
    }

    /// Share of ratings that were positive, `None` before any rating.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn positive_rate(&self) -> Option<f64> {
        let rated = self.positive_redirects + self.negative_feedback;
        (rated > 0).then(|| self.positive_redirects as f64 / rated as f64)
    }
}

/// Basic statistics, available on every plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueStats {
    /// Venue.
    pub venue_id: VenueId,
    /// Scans since the last monthly reset.
    pub scans_this_month: u32,
    /// Totals over the venue's history.
    pub totals: EventCounts,
}

/// Events of one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// Day in the reporting timezone.
    pub date: NaiveDate,
    /// Counts for that day.
    #[serde(flatten)]
    pub counts: EventCounts,
}

/// Advanced analytics for a time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    /// Requested window.
    pub range: TimeRange,
    /// Totals over the window.
    pub totals: EventCounts,
    /// Positive share of ratings in the window.
    pub positive_rate: Option<f64>,
    /// Days with at least one event, oldest first.
    pub daily: Vec<DailyBucket>,
}

impl Analytics {
    /// Builds the window summary from per-day counts, oldest first.
    #[must_use]
    pub fn from_daily(range: TimeRange, daily: Vec<DailyBucket>) -> Self {
        let totals = daily.iter().fold(EventCounts::default(), |mut acc, day| {
            acc.merge(&day.counts);
            acc
        });
        Self {
            range,
            positive_rate: totals.positive_rate(),
            totals,
            daily,
        }
    }
}
