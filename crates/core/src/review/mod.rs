//! The anonymous review flow: scan intake, rating routing and feedback alerts.

mod error;
mod feedback;
mod notify;
mod scan;
mod store;
mod types;

pub use error::{MAX_COMMENT_CHARS, ReviewError};
pub use feedback::FeedbackService;
pub use notify::{FeedbackAlert, FeedbackNotifier, NotificationGate, NotificationOutcome};
pub use scan::ScanService;
pub use store::ReviewStore;
pub use types::{
    FeedbackRecord, NewFeedback, POSITIVE_THRESHOLD, Rating, RatingForm, RatingOutcome,
    RatingSubmission, ScanEventKind, ScanOutcome, Sentiment,
};
