//! Review-flow types.

use chrono::{DateTime, Utc};
use restoboost_shared::types::{FeedbackId, StaffMemberId, VenueId};
use serde::{Deserialize, Serialize};

use super::error::ReviewError;

/// Lowest rating routed to the public review page.
pub const POSITIVE_THRESHOLD: u8 = 4;

/// Kind of an append-only scan log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEventKind {
    /// QR code opened.
    Scan,
    /// Positive rating sent to the maps page.
    PositiveRedirect,
    /// Negative rating captured privately.
    NegativeFeedback,
}

impl ScanEventKind {
    /// Stored name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::PositiveRedirect => "positive_redirect",
            Self::NegativeFeedback => "negative_feedback",
        }
    }
}

/// A star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validates a submitted rating.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidRating`] outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, ReviewError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(ReviewError::InvalidRating(value))
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Classifies the rating. The threshold is fixed for every venue.
    #[must_use]
    pub const fn sentiment(self) -> Sentiment {
        if self.0 >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }
}

/// Routing class of a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// Redirect to the public review page.
    Positive,
    /// Capture privately and notify the owner.
    Negative,
}

/// A rating submitted from the review form.
#[derive(Debug, Clone, Default)]
pub struct RatingSubmission {
    /// Venue being rated.
    pub venue_id: VenueId,
    /// Raw rating value.
    pub rating: i64,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Email the guest left for a reply.
    pub contact_email: Option<String>,
}

/// Insert payload for captured feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    /// Venue rated.
    pub venue_id: VenueId,
    /// Rating, always negative.
    pub rating: Rating,
    /// Comment, trimmed, `None` if blank.
    pub comment: Option<String>,
    /// Contact email, trimmed, `None` if blank.
    pub contact_email: Option<String>,
}

/// A captured negative review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    /// Feedback ID.
    pub id: FeedbackId,
    /// Venue rated.
    pub venue_id: VenueId,
    /// Rating.
    pub rating: Rating,
    /// Comment.
    pub comment: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// When the feedback was captured.
    pub created_at: DateTime<Utc>,
}

/// Result of submitting a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RatingOutcome {
    /// Send the guest to the maps page.
    Redirect {
        /// Destination.
        url: String,
    },
    /// Feedback stored privately.
    Captured {
        /// Stored feedback ID.
        feedback_id: FeedbackId,
    },
}

/// What the guest sees after a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingForm {
    /// Venue ID the form posts to.
    pub venue_id: VenueId,
    /// Venue name.
    pub name: String,
    /// Venue logo.
    pub logo_url: Option<String>,
    /// Whether the "powered by" footer is shown.
    pub show_branding: bool,
    /// Staff member the scan was attributed to.
    pub staff_id: Option<StaffMemberId>,
}

/// Terminal state of scan intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No venue has this slug.
    NotFound,
    /// Free plan over its monthly cap: straight to the maps page.
    RedirectedCapExceeded {
        /// Destination.
        url: String,
    },
    /// Render the rating form.
    FormServed(RatingForm),
}
