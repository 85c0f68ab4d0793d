use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tera::Context;

use crate::config::MailConfig;
use crate::db::Submission;
use crate::error::DispatchError;
use crate::templates::{get_tera, MODERATION_EMAIL};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &Submission, approval_link: &str)
        -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn compose_moderation_message(
    submission: &Submission,
    approval_link: &str,
    from: &str,
    moderator: &str,
) -> Result<ModerationMessage, DispatchError> {
    let mut ctx = Context::new();
    ctx.insert("full_name", &submission.full_name);
    ctx.insert("email", &submission.email);
    ctx.insert("project_title", &submission.project_title);
    ctx.insert("project_description", &submission.project_description);
    ctx.insert("video_link", &submission.video_link);
    ctx.insert("approval_link", approval_link);

    let html = get_tera()
        .render(MODERATION_EMAIL, &ctx)
        .map_err(|e| DispatchError::Compose(e.to_string()))?;

    let text = format!(
        "New research defense submission awaiting approval\n\n\
         Name: {}\nEmail: {}\nProject title: {}\n\n{}\n\nApprove: {}\n",
        submission.full_name,
        submission.email,
        submission.project_title,
        submission.project_description,
        approval_link
    );

    Ok(ModerationMessage {
        from: from.to_string(),
        to: vec![moderator.to_string()],
        subject: format!("Approval needed: {}", submission.project_title),
        html,
        text,
    })
}

// Resend-compatible HTTP mail API.
pub struct MailApiNotifier {
    client: Client,
    config: MailConfig,
}

impl MailApiNotifier {
    pub fn new(config: MailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for MailApiNotifier {
    async fn notify(
        &self,
        submission: &Submission,
        approval_link: &str,
    ) -> Result<(), DispatchError> {
        let message = compose_moderation_message(
            submission,
            approval_link,
            &self.config.from,
            &self.config.moderator_email,
        )?;

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(submission_id = submission.id, "moderation email sent");
        Ok(())
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(i64, String)>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            submission: &Submission,
            approval_link: &str,
        ) -> Result<(), DispatchError> {
            self.sent
                .lock()
                .unwrap()
                .push((submission.id, approval_link.to_string()));
            if self.fail {
                return Err(DispatchError::Rejected {
                    status: 503,
                    body: "mailbox unavailable".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::SubmissionStatus;

    fn submission() -> Submission {
        Submission {
            id: 42,
            full_name: "Ada <Lovelace>".to_string(),
            email: "ada@gmail.com".to_string(),
            project_title: "Analytical Engines".to_string(),
            project_description: "Notes on the engine & its uses".to_string(),
            video_link: None,
            presentation_url: "/uploads/1-deck.pdf".to_string(),
            paper_url: None,
            logo_url: None,
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn message_carries_submission_details_and_link() {
        let link = "https://defense.example.edu/approve?studentId=42";
        let msg = compose_moderation_message(&submission(), link, "noreply@x", "mod@x").unwrap();

        assert_eq!(msg.to, vec!["mod@x".to_string()]);
        assert!(msg.subject.contains("Analytical Engines"));
        assert!(msg.html.contains("ada@gmail.com"));
        assert!(msg.html.contains("approve?studentId=42"));
        assert!(msg.text.contains(link));
    }

    #[test]
    fn submitter_text_is_escaped() {
        let msg = compose_moderation_message(&submission(), "http://l", "f", "m").unwrap();

        assert!(msg.html.contains("Ada &lt;Lovelace&gt;"));
        assert!(msg.html.contains("engine &amp; its uses"));
        assert!(!msg.html.contains("<Lovelace>"));
    }

    #[tokio::test]
    async fn unreachable_transport_is_a_dispatch_error() {
        let notifier = MailApiNotifier::new(MailConfig {
            api_url: "http://127.0.0.1:1/emails".to_string(),
            api_key: "test".to_string(),
            from: "noreply@x".to_string(),
            moderator_email: "mod@x".to_string(),
        })
        .unwrap();

        let err = notifier.notify(&submission(), "http://l").await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[tokio::test]
    async fn provider_refusal_is_rejected_with_status_and_body() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid `to` field"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = MailApiNotifier::new(MailConfig {
            api_url: format!("{}/emails", server.uri()),
            api_key: "test-key".to_string(),
            from: "noreply@x".to_string(),
            moderator_email: "mod@x".to_string(),
        })
        .unwrap();

        let link = "http://l/approve?studentId=42";
        let err = notifier.notify(&submission(), link).await.unwrap_err();
        match err {
            DispatchError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid `to` field");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["from"], "noreply@x");
        assert_eq!(sent["to"], serde_json::json!(["mod@x"]));
        assert_eq!(sent["subject"], "Approval needed: Analytical Engines");
        assert!(sent["html"].as_str().unwrap().contains("approve?studentId=42"));
        assert!(sent["text"].as_str().unwrap().contains(link));
    }

    #[tokio::test]
    async fn accepted_send_is_ok() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"abc"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = MailApiNotifier::new(MailConfig {
            api_url: format!("{}/emails", server.uri()),
            api_key: "test-key".to_string(),
            from: "noreply@x".to_string(),
            moderator_email: "mod@x".to_string(),
        })
        .unwrap();

        notifier.notify(&submission(), "http://l").await.unwrap();
    }
}
