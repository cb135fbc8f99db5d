//! Subscription plans and the feature gates they unlock.
//!
//! Every plan threshold lives here. Scan intake, venue management, the notification
//! gate and analytics all ask `Plan` instead of comparing plan names themselves.

mod state;

pub use state::{PlanState, SubscriptionStatus};

use serde::{Deserialize, Serialize};

/// Monthly scan allowance of the free plan.
pub const FREE_MONTHLY_SCAN_CAP: u32 = 30;

/// Venues an enterprise account may own.
pub const ENTERPRISE_MAX_VENUES: u32 = 5;

/// Venues a free or pro account may own.
pub const STANDARD_MAX_VENUES: u32 = 1;

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// No subscription.
    #[default]
    Free,
    /// Paid single-venue tier.
    Pro,
    /// Paid multi-venue tier with branding.
    Enterprise,
}

/// Monthly scan allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "limit", rename_all = "snake_case")]
pub enum ScanCap {
    /// At most this many scans per month get the rating form.
    Limited(u32),
    /// No cap.
    Unlimited,
}

impl ScanCap {
    /// Returns true if `count` scans this month is past the cap.
    #[must_use]
    pub const fn is_exceeded_by(self, count: u32) -> bool {
        match self {
            Self::Limited(cap) => count > cap,
            Self::Unlimited => false,
        }
    }
}

impl Plan {
    /// All plans, cheapest first.
    pub const ALL: [Self; 3] = [Self::Free, Self::Pro, Self::Enterprise];

    /// Returns the stored name of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Returns true for pro and enterprise.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Maximum number of venues an account on this plan may own.
    #[must_use]
    pub const fn max_venues(self) -> u32 {
        match self {
            Self::Free | Self::Pro => STANDARD_MAX_VENUES,
            Self::Enterprise => ENTERPRISE_MAX_VENUES,
        }
    }

    /// Whether the owner is emailed when negative feedback is captured.
    #[must_use]
    pub const fn email_alerts_enabled(self) -> bool {
        self.is_paid()
    }

    /// Whether scans carrying a staff identifier are attributed.
    #[must_use]
    pub const fn staff_tracking_enabled(self) -> bool {
        self.is_paid()
    }

    /// Whether the "powered by" branding is shown on the rating form.
    #[must_use]
    pub const fn branding_visible(self) -> bool {
        !self.is_paid()
    }

    /// Monthly scan allowance before scans skip the rating form.
    #[must_use]
    pub const fn monthly_scan_cap(self) -> ScanCap {
        match self {
            Self::Free => ScanCap::Limited(FREE_MONTHLY_SCAN_CAP),
            Self::Pro | Self::Enterprise => ScanCap::Unlimited,
        }
    }

    /// Whether a custom logo can be uploaded.
    #[must_use]
    pub const fn logo_upload_enabled(self) -> bool {
        matches!(self, Self::Enterprise)
    }

    /// Whether time-ranged analytics are available.
    #[must_use]
    pub const fn analytics_enabled(self) -> bool {
        self.is_paid()
    }

    /// Snapshot of every gate, for clients rendering upsell states.
    #[must_use]
    pub const fn features(self) -> Features {
        Features {
            max_venues: self.max_venues(),
            email_alerts: self.email_alerts_enabled(),
            staff_tracking: self.staff_tracking_enabled(),
            branding_visible: self.branding_visible(),
            monthly_scan_cap: self.monthly_scan_cap(),
            logo_upload: self.logo_upload_enabled(),
            analytics: self.analytics_enabled(),
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

/// A plan name that is not free, pro or enterprise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}', expected free, pro or enterprise")]
pub struct UnknownPlan(pub String);

/// Feature gates of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    /// Venue limit.
    pub max_venues: u32,
    /// Negative feedback email alerts.
    pub email_alerts: bool,
    /// Per-staff QR attribution.
    pub staff_tracking: bool,
    /// "Powered by" footer on the rating form.
    pub branding_visible: bool,
    /// Monthly scan allowance.
    pub monthly_scan_cap: ScanCap,
    /// Custom logo.
    pub logo_upload: bool,
    /// Time-ranged analytics.
    pub analytics: bool,
}
