mod classifier;

pub use classifier::classify;

use std::sync::Arc;

use axum::body::Bytes;
use tokio::task::JoinHandle;

use crate::db::{
    CalendarEntry, NewSubmission, Submission, SubmissionRepository, SubmissionStatus,
};
use crate::error::{DispatchError, RepositoryError, WorkflowError};
use crate::notify::Notifier;
use crate::storage::FileStager;

pub const APPROVED_MESSAGE: &str =
    "Submission received and approved. It will appear on the defense calendar.";
pub const PENDING_MESSAGE: &str =
    "Submission received. It will appear on the defense calendar once approved.";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub project_title: Option<String>,
    pub project_description: Option<String>,
    pub video_link: Option<String>,
    pub presentation: Option<UploadedFile>,
    pub paper: Option<UploadedFile>,
    pub logo: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct NotificationTask(JoinHandle<Result<(), DispatchError>>);

impl NotificationTask {
    // Send failures are logged on the task itself; only a panicked or
    // cancelled task is reported here.
    pub fn detach(self) {
        tokio::spawn(async move {
            if let Err(err @ DispatchError::Aborted(_)) = self.outcome().await {
                tracing::error!(error = %err, "moderation email task did not finish");
            }
        });
    }

    pub async fn outcome(self) -> Result<(), DispatchError> {
        match self.0.await {
            Ok(result) => result,
            Err(err) => Err(DispatchError::Aborted(err.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub submission: Submission,
    pub notification: Option<NotificationTask>,
}

impl SubmitOutcome {
    pub fn message(&self) -> &'static str {
        match self.submission.status {
            SubmissionStatus::Approved => APPROVED_MESSAGE,
            SubmissionStatus::Pending => PENDING_MESSAGE,
        }
    }
}

pub struct ModerationWorkflow {
    stager: Arc<dyn FileStager>,
    repository: Arc<dyn SubmissionRepository>,
    notifier: Arc<dyn Notifier>,
    public_base_url: String,
}

impl ModerationWorkflow {
    pub fn new(
        stager: Arc<dyn FileStager>,
        repository: Arc<dyn SubmissionRepository>,
        notifier: Arc<dyn Notifier>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            stager,
            repository,
            notifier,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn approval_link(&self, id: i64) -> String {
        format!("{}/approve?studentId={}", self.public_base_url, id)
    }

    pub async fn submit(&self, request: SubmissionRequest) -> Result<SubmitOutcome, WorkflowError> {
        let full_name = required(request.full_name, "fullName")?;
        let email = required(request.email, "email")?;
        let project_title = required(request.project_title, "projectTitle")?;
        let project_description = required(request.project_description, "projectDescription")?;
        let presentation = request
            .presentation
            .ok_or_else(|| WorkflowError::Validation("presentationFile is required".to_string()))?;

        // All staging finishes before anything is persisted.
        let presentation_url = self.stage("presentationFile", &presentation).await?;
        let paper_url = match &request.paper {
            Some(file) => Some(self.stage("paperFile", file).await?),
            None => None,
        };
        let logo_url = match &request.logo {
            Some(file) => Some(self.stage("logoFile", file).await?),
            None => None,
        };

        let status = classify(&email);

        let submission = self
            .repository
            .create(NewSubmission {
                full_name,
                email,
                project_title,
                project_description,
                video_link: request.video_link.filter(|v| !v.is_empty()),
                presentation_url,
                paper_url,
                logo_url,
                status,
            })
            .await
            .map_err(|err| {
                tracing::error!(?err, "failed to persist submission");
                err
            })?;

        tracing::info!(submission_id = submission.id, status = %status, "submission stored");

        let notification = match status {
            SubmissionStatus::Approved => None,
            SubmissionStatus::Pending => Some(self.spawn_notification(submission.clone())),
        };

        Ok(SubmitOutcome {
            submission,
            notification,
        })
    }

    pub async fn approve(&self, student_id: &str) -> Result<(), WorkflowError> {
        if student_id.is_empty() {
            return Err(WorkflowError::Validation("studentId is required".to_string()));
        }
        let id: i64 = student_id
            .parse()
            .map_err(|_| RepositoryError::NotFound(student_id.to_string()))?;

        self.repository.set_approved(id).await?;
        tracing::info!(submission_id = id, "submission approved");
        Ok(())
    }

    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Submission>, WorkflowError> {
        if status.is_empty() {
            return Err(RepositoryError::InvalidQuery("status is required".to_string()).into());
        }
        let status: SubmissionStatus = status
            .parse()
            .map_err(|_| RepositoryError::InvalidQuery(format!("unknown status `{}`", status)))?;

        Ok(self.repository.list_by_status(status).await?)
    }

    pub async fn calendar(&self) -> Result<Vec<CalendarEntry>, WorkflowError> {
        Ok(self.repository.list_approved_for_calendar().await?)
    }

    async fn stage(&self, field: &str, file: &UploadedFile) -> Result<String, WorkflowError> {
        self.stager
            .stage(field, &file.file_name, &file.bytes)
            .await
            .map_err(|err| {
                tracing::error!(?err, field, "failed to stage upload");
                WorkflowError::from(err)
            })
    }

    fn spawn_notification(&self, submission: Submission) -> NotificationTask {
        let notifier = self.notifier.clone();
        let link = self.approval_link(submission.id);
        NotificationTask(tokio::spawn(async move {
            let result = notifier.notify(&submission, &link).await;
            if let Err(err) = &result {
                tracing::warn!(
                    submission_id = submission.id,
                    error = %err,
                    "moderation email failed; submission stays pending"
                );
            }
            result
        }))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, WorkflowError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WorkflowError::Validation(format!("{} is required", field))),
    }
}
