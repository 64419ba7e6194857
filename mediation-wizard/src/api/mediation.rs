// Mediation backend client
// Posts mediation requests and fetches the organization app context.

use crate::error::{WizardError, WizardResult};
use crate::models::requests::{MediationRequestSubmission, ATTACHED_FILE_PART};
use crate::models::responses::{LocalizedText, OrganizationApp, SubmissionReceipt};
use crate::utils::logging::mask_field;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use url::Url;

pub const MEDIATION_REQUESTS_PATH: &str = "api/mediation-requests/";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Backend operations used by the wizard.
/// Production code uses `HttpMediationApi`; tests use stubs.
#[async_trait]
pub trait MediationApi: Send + Sync {
    /// Post one mediation request. Any non-2xx answer is an error; the body is ignored.
    async fn submit(
        &self,
        submission: &MediationRequestSubmission,
    ) -> WizardResult<SubmissionReceipt>;

    async fn fetch_organization_app(
        &self,
        organization_slug: &str,
        application_slug: &str,
    ) -> WizardResult<OrganizationApp>;
}

pub struct HttpMediationApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMediationApi {
    pub fn new(base_url: &str, timeout: Duration) -> WizardResult<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn submission_url(&self) -> WizardResult<Url> {
        Ok(self.base_url.join(MEDIATION_REQUESTS_PATH)?)
    }

    pub fn organization_app_url(
        &self,
        organization_slug: &str,
        application_slug: &str,
    ) -> WizardResult<Url> {
        let mut endpoint = self.base_url.join("api/organizations/")?;
        endpoint
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([organization_slug, "applications", application_slug, ""]);
        Ok(endpoint)
    }

    async fn build_form(submission: &MediationRequestSubmission) -> WizardResult<Form> {
        let file_part = match &submission.attached_file {
            Some(file) => Some(
                Part::bytes(tokio::fs::read(&file.path).await?).file_name(file.file_name()),
            ),
            None => None,
        };
        let (before, after) = submission
            .fields
            .split_at(submission.attached_file_at.min(submission.fields.len()));

        let mut form = Form::new();
        for (name, value) in before {
            form = form.text(*name, value.clone());
        }
        if let Some(part) = file_part {
            form = form.part(ATTACHED_FILE_PART, part);
        }
        for (name, value) in after {
            form = form.text(*name, value.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl MediationApi for HttpMediationApi {
    async fn submit(
        &self,
        submission: &MediationRequestSubmission,
    ) -> WizardResult<SubmissionReceipt> {
        let url = self.submission_url()?;
        let correlation_id = uuid::Uuid::new_v4().to_string();
        info!(
            "[PHASE: submit] [STEP: post] Posting mediation request {} ({} fields, attachment: {})",
            correlation_id,
            submission.fields.len(),
            submission.attached_file.is_some()
        );

        let form = Self::build_form(submission).await?;
        let resp = self
            .client
            .post(url)
            .header(REQUEST_ID_HEADER, &correlation_id)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(
                "[PHASE: submit] [STEP: post] Request {} rejected with HTTP {}",
                correlation_id, status
            );
            return Err(WizardError::Status(status.as_u16()));
        }

        info!(
            "[PHASE: submit] [STEP: post] Request {} accepted with HTTP {}",
            correlation_id, status
        );
        Ok(SubmissionReceipt {
            status: status.as_u16(),
            correlation_id,
        })
    }

    async fn fetch_organization_app(
        &self,
        organization_slug: &str,
        application_slug: &str,
    ) -> WizardResult<OrganizationApp> {
        let url = self.organization_app_url(organization_slug, application_slug)?;

        let attempt = || async {
            let resp = self.client.get(url.clone()).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(WizardError::Status(status.as_u16()));
            }
            Ok(resp.json::<OrganizationApp>().await?)
        };

        // at most 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(150)
            .factor(2)
            .max_delay(Duration::from_secs(2))
            .take(2)
            .map(jitter);

        RetryIf::start(retry_strategy, attempt, |e: &WizardError| {
            let transient = e.is_transient();
            if transient {
                warn!(
                    "[PHASE: startup] [STEP: organization_app] Retrying after transient error: {}",
                    e
                );
            }
            transient
        })
        .await
    }
}

fn log_dry_run_file(submission: &MediationRequestSubmission) {
    if let Some(file) = &submission.attached_file {
        info!(
            "[PHASE: submit] [STEP: dry_run] {} = {}",
            ATTACHED_FILE_PART,
            file.file_name()
        );
    }
}

/// Backend stand-in that logs the (masked) payload instead of sending it.
pub struct DryRunMediationApi;

#[async_trait]
impl MediationApi for DryRunMediationApi {
    async fn submit(
        &self,
        submission: &MediationRequestSubmission,
    ) -> WizardResult<SubmissionReceipt> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        for (i, (name, value)) in submission.fields.iter().enumerate() {
            if i == submission.attached_file_at {
                log_dry_run_file(submission);
            }
            info!(
                "[PHASE: submit] [STEP: dry_run] {} = {}",
                name,
                mask_field(name, value)
            );
        }
        if submission.attached_file_at >= submission.fields.len() {
            log_dry_run_file(submission);
        }
        Ok(SubmissionReceipt {
            status: 201,
            correlation_id,
        })
    }

    async fn fetch_organization_app(
        &self,
        organization_slug: &str,
        application_slug: &str,
    ) -> WizardResult<OrganizationApp> {
        let mut app = OrganizationApp::new(
            &format!("{}/{}", organization_slug, application_slug),
            application_slug,
        );
        app.name = LocalizedText {
            en: application_slug.to_string(),
            fr: application_slug.to_string(),
        };
        Ok(app)
    }
}
