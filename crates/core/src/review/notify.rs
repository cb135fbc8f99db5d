//! Negative-feedback email alerts.

use std::sync::Arc;

use restoboost_shared::{EmailError, EmailMessage, EmailService};

use super::types::FeedbackRecord;
use crate::plan::Plan;
use crate::task::best_effort;
use crate::venue::Venue;

/// An alert about newly captured feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackAlert {
    /// Owner address.
    pub to: String,
    /// Venue name.
    pub venue_name: String,
    /// Rating value.
    pub rating: u8,
    /// Guest comment.
    pub comment: Option<String>,
    /// Guest address, used as Reply-To.
    pub contact_email: Option<String>,
}

impl FeedbackAlert {
    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Nouveau feedback pour {}", self.venue_name)
    }

    /// HTML body. User-supplied text is escaped.
    #[must_use]
    pub fn html(&self) -> String {
        let mut html = format!(
            "<h2>Nouveau feedback reçu</h2>\
             <p><strong>Restaurant :</strong> {}</p>\
             <p><strong>Note :</strong> {}/5</p>",
            escape_html(&self.venue_name),
            self.rating
        );
        if let Some(comment) = &self.comment {
            html.push_str(&format!(
                "<p><strong>Commentaire :</strong> {}</p>",
                escape_html(comment)
            ));
        }
        if let Some(email) = &self.contact_email {
            html.push_str(&format!(
                "<p><strong>Email du client :</strong> {}</p>",
                escape_html(email)
            ));
        }
        html.push_str("<p>Connectez-vous à votre tableau de bord pour voir tous les détails.</p>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Delivers feedback alerts.
pub trait FeedbackNotifier: Send + Sync {
    /// Sends one alert.
    fn notify(
        &self,
        alert: &FeedbackAlert,
    ) -> impl std::future::Future<Output = Result<(), EmailError>> + Send;
}

impl FeedbackNotifier for EmailService {
    async fn notify(&self, alert: &FeedbackAlert) -> Result<(), EmailError> {
        self.send(&EmailMessage {
            to: alert.to.clone(),
            reply_to: alert.contact_email.clone(),
            subject: alert.subject(),
            html: alert.html(),
        })
        .await
    }
}

/// What the gate did with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Alert delivered to the transport.
    Sent,
    /// Plan has no email alerts.
    SkippedPlan,
    /// Owner email unknown.
    SkippedNoRecipient,
    /// Transport failed. Logged and swallowed.
    Failed,
}

/// Decides whether a feedback alert is sent. Never fails.
pub struct NotificationGate<N> {
    notifier: Arc<N>,
}

impl<N: FeedbackNotifier> NotificationGate<N> {
    /// Create a new gate.
    #[must_use]
    pub const fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }

    /// Emails the owner when the plan allows it and an address is known.
    pub async fn dispatch(
        &self,
        plan: Plan,
        owner_email: Option<&str>,
        venue: &Venue,
        feedback: &FeedbackRecord,
    ) -> NotificationOutcome {
        if !plan.email_alerts_enabled() {
            return NotificationOutcome::SkippedPlan;
        }
        let Some(to) = owner_email.filter(|e| !e.trim().is_empty()) else {
            tracing::warn!(venue_id = %venue.id, "no owner email for feedback alert");
            return NotificationOutcome::SkippedNoRecipient;
        };

        let alert = FeedbackAlert {
            to: to.to_string(),
            venue_name: venue.name.clone(),
            rating: feedback.rating.value(),
            comment: feedback.comment.clone(),
            contact_email: feedback.contact_email.clone(),
        };

        match best_effort("feedback_alert", self.notifier.notify(&alert))
            .run()
            .await
        {
            Some(()) => {
                tracing::info!(venue_id = %venue.id, feedback_id = %feedback.id, "feedback alert sent");
                NotificationOutcome::Sent
            }
            None => NotificationOutcome::Failed,
        }
    }
}
