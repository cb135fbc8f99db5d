//! Rating classification and private feedback capture.

use std::sync::Arc;

use validator::ValidateEmail;

use super::error::{MAX_COMMENT_CHARS, ReviewError};
use super::notify::{FeedbackNotifier, NotificationGate, NotificationOutcome};
use super::store::ReviewStore;
use super::types::{
    NewFeedback, Rating, RatingOutcome, RatingSubmission, ScanEventKind, Sentiment,
};
use crate::account::AccountStore;
use crate::plan::Plan;
use crate::task::{best_effort, critical};

/// Handles submitted ratings.
///
/// Submissions are not deduplicated: every call writes its own rows.
pub struct FeedbackService<S, N> {
    store: Arc<S>,
    gate: NotificationGate<N>,
}

impl<S, N> FeedbackService<S, N>
where
    S: ReviewStore + AccountStore,
    N: FeedbackNotifier,
{
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            gate: NotificationGate::new(notifier),
        }
    }

    /// Routes a rating.
    ///
    /// Ratings of 4 and 5 log a `positive_redirect` event and point the guest to the
    /// maps page. Lower ratings persist a feedback record, log a `negative_feedback`
    /// event and hand off to the notification gate, whose outcome never affects the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input, an unknown venue, a positive rating on a
    /// venue without maps URL, or when a must-succeed write fails.
    pub async fn submit(&self, submission: RatingSubmission) -> Result<RatingOutcome, ReviewError> {
        let rating = Rating::new(submission.rating)?;
        let comment = non_blank(submission.comment);
        let contact_email = non_blank(submission.contact_email);

        if comment
            .as_deref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(ReviewError::CommentTooLong);
        }
        if contact_email.as_deref().is_some_and(|e| !e.validate_email()) {
            return Err(ReviewError::InvalidContactEmail);
        }

        let venue = self
            .store
            .find_venue(submission.venue_id)
            .await?
            .ok_or(ReviewError::VenueNotFound)?;

        match rating.sentiment() {
            Sentiment::Positive => {
                critical(
                    "record_positive_redirect",
                    self.store.record_event(venue.id, ScanEventKind::PositiveRedirect),
                )
                .run()
                .await?;

                venue
                    .maps_url
                    .map(|url| RatingOutcome::Redirect { url })
                    .ok_or(ReviewError::MapsUrlMissing)
            }
            Sentiment::Negative => {
                let feedback = critical(
                    "insert_feedback",
                    self.store.insert_feedback(NewFeedback {
                        venue_id: venue.id,
                        rating,
                        comment,
                        contact_email,
                    }),
                )
                .run()
                .await?;

                critical(
                    "record_negative_feedback",
                    self.store.record_event(venue.id, ScanEventKind::NegativeFeedback),
                )
                .run()
                .await?;

                let owner = best_effort("resolve_owner", self.store.find_account(venue.account_id))
                    .run()
                    .await
                    .flatten();
                let plan = owner.as_ref().map_or(Plan::Free, |a| a.plan());
                let outcome = self
                    .gate
                    .dispatch(plan, owner.as_ref().map(|a| a.email.as_str()), &venue, &feedback)
                    .await;
                if outcome == NotificationOutcome::Failed {
                    tracing::warn!(feedback_id = %feedback.id, "feedback stored without alert");
                }

                Ok(RatingOutcome::Captured {
                    feedback_id: feedback.id,
                })
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, RecordingNotifier};
    use rstest::rstest;
    use restoboost_shared::types::VenueId;

    fn service(
        store: &Arc<MemoryStore>,
        notifier: &Arc<RecordingNotifier>,
    ) -> FeedbackService<MemoryStore, RecordingNotifier> {
        FeedbackService::new(Arc::clone(store), Arc::clone(notifier))
    }

    fn submission(venue_id: VenueId, rating: i64) -> RatingSubmission {
        RatingSubmission {
            venue_id,
            rating,
            comment: Some("Service trop lent".to_string()),
            contact_email: Some("guest@mail.fr".to_string()),
        }
    }

    #[rstest]
    #[case(4)]
    #[case(5)]
    #[tokio::test]
    async fn test_positive_rating_redirects_without_feedback(#[case] rating: i64) {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Pro, "le-bistrot", Some("https://maps.example/b"));

        let outcome = service(&store, &notifier)
            .submit(submission(venue.id, rating))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RatingOutcome::Redirect {
                url: "https://maps.example/b".to_string()
            }
        );
        assert!(store.feedback().is_empty());
        assert_eq!(store.events(), vec![(venue.id, ScanEventKind::PositiveRedirect)]);
        assert!(notifier.sent().is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[tokio::test]
    async fn test_negative_rating_is_captured(#[case] rating: i64) {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", Some("https://maps.example/b"));

        let outcome = service(&store, &notifier)
            .submit(submission(venue.id, rating))
            .await
            .unwrap();

        assert!(matches!(outcome, RatingOutcome::Captured { .. }));
        let feedback = store.feedback();
        assert_eq!(feedback.len(), 1);
        assert_eq!(i64::from(feedback[0].rating.value()), rating);
        assert_eq!(store.events(), vec![(venue.id, ScanEventKind::NegativeFeedback)]);
    }

    #[tokio::test]
    async fn test_positive_without_maps_url_errors_after_logging() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", None);

        let err = service(&store, &notifier)
            .submit(submission(venue.id, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewError::MapsUrlMissing));
        assert_eq!(store.events(), vec![(venue.id, ScanEventKind::PositiveRedirect)]);
    }

    #[tokio::test]
    async fn test_free_plan_sends_no_alert() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", None);

        service(&store, &notifier)
            .submit(submission(venue.id, 2))
            .await
            .unwrap();
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_paid_plan_alerts_owner_with_reply_to() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (account, venue) = store.seed(Plan::Pro, "le-bistrot", None);

        service(&store, &notifier)
            .submit(submission(venue.id, 1))
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, account.email);
        assert_eq!(sent[0].contact_email.as_deref(), Some("guest@mail.fr"));
        assert_eq!(sent[0].rating, 1);
    }

    #[tokio::test]
    async fn test_email_failure_never_fails_capture() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::failing());
        let (_, venue) = store.seed(Plan::Pro, "le-bistrot", None);

        let outcome = service(&store, &notifier)
            .submit(submission(venue.id, 3))
            .await
            .unwrap();

        assert!(matches!(outcome, RatingOutcome::Captured { .. }));
        assert_eq!(store.feedback().len(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_is_not_deduplicated() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", None);
        let service = service(&store, &notifier);

        service.submit(submission(venue.id, 2)).await.unwrap();
        service.submit(submission(venue.id, 2)).await.unwrap();

        assert_eq!(store.feedback().len(), 2);
        assert_eq!(store.events().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_fields_stored_as_none() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", None);

        service(&store, &notifier)
            .submit(RatingSubmission {
                venue_id: venue.id,
                rating: 1,
                comment: Some("   ".to_string()),
                contact_email: Some(String::new()),
            })
            .await
            .unwrap();

        let feedback = store.feedback();
        assert_eq!(feedback[0].comment, None);
        assert_eq!(feedback[0].contact_email, None);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Free, "le-bistrot", None);
        let service = service(&store, &notifier);

        let err = service.submit(submission(venue.id, 0)).await.unwrap_err();
        assert!(matches!(err, ReviewError::InvalidRating(0)));

        let mut bad_email = submission(venue.id, 2);
        bad_email.contact_email = Some("not-an-email".to_string());
        let err = service.submit(bad_email).await.unwrap_err();
        assert!(matches!(err, ReviewError::InvalidContactEmail));

        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_venue() {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let err = service(&store, &notifier)
            .submit(submission(VenueId::new(), 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::VenueNotFound));
    }

    #[rstest]
    #[case("a,b@mail.fr")]
    #[case("a\"b@mail.fr")]
    #[case("a(b@mail.fr")]
    #[case("<a@mail.fr")]
    #[case("@mail.fr")]
    #[case("guest mail@mail.fr")]
    #[tokio::test]
    async fn test_unaddressable_contact_email_rejected(#[case] contact: &str) {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, venue) = store.seed(Plan::Pro, "le-bistrot", None);

        let mut input = submission(venue.id, 2);
        input.contact_email = Some(contact.to_string());
        let err = service(&store, &notifier).submit(input).await.unwrap_err();

        assert!(matches!(err, ReviewError::InvalidContactEmail));
        assert!(store.feedback().is_empty());
        assert!(notifier.sent().is_empty());
    }
}
