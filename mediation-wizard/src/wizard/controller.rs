// Form container
// Ties the store, the router, step completion and the tab strip together. Every transition goes
// through here so the active step, the completed steps and the persisted state stay in sync.

use super::completion::{derive_completed, initial_redirect, Completed};
use super::navigation::{is_tab_enabled, NavKey, Orientation, TabKeyOutcome, TabNavigation};
use super::router::Router;
use super::steps::{PathPrefix, Step, StepLayout};
use super::store::{FormStore, StateStorage};
use super::validation::{validate, FieldErrors, ValidStep, ValidationMode};
use crate::api::mediation::MediationApi;
use crate::error::WizardResult;
use crate::models::requests::MediationRequestSubmission;
use crate::models::responses::{OrganizationApp, SubmissionReceipt};
use crate::models::state::{StepData, WizardState};
use log::{error, info, warn};

pub const SUBMIT_SUCCESS_TEXT: &str = "Your mediation request has been successfully sent !";
pub const SUBMIT_FAILURE_TEXT: &str =
    "There was a technical error and the submission failed, please try again later";

/// Who the request is filed for and where the wizard is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardContext {
    pub prefix: PathPrefix,
    pub organization_app: Option<OrganizationApp>,
    pub user_id: Option<String>,
}

impl WizardContext {
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn for_organization_app(
        organization_slug: &str,
        application_slug: &str,
        app: OrganizationApp,
    ) -> Self {
        Self {
            prefix: PathPrefix::organization_app(organization_slug, application_slug),
            organization_app: Some(app),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn layout(&self) -> StepLayout {
        if self.organization_app.is_some() {
            StepLayout::for_organization_app(self.prefix.clone())
        } else {
            StepLayout::standalone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text: &'static str,
}

pub struct FormContainer<S: StateStorage, R: Router> {
    store: FormStore<S>,
    router: R,
    context: WizardContext,
    layout: StepLayout,
    completed: Completed,
    active_step: usize,
    tabs: TabNavigation,
    field_errors: FieldErrors,
    notification: Option<Notification>,
    mounted: bool,
}

impl<S: StateStorage, R: Router> FormContainer<S, R> {
    pub fn new(store: FormStore<S>, router: R, context: WizardContext) -> Self {
        let layout = context.layout();
        let tabs = TabNavigation::new(layout.len(), Orientation::Horizontal);
        Self {
            store,
            router,
            context,
            layout,
            completed: Completed::new(),
            active_step: 0,
            tabs,
            field_errors: FieldErrors::default(),
            notification: None,
            mounted: false,
        }
    }

    /// First render: derive completion from the restored state, move away from a locked step
    /// and pick the active step from the path. Later calls only re-sync the active step.
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            let derived = derive_completed(self.store.state(), &self.layout);
            self.completed.merge(&derived);
            if let Some(path) =
                initial_redirect(self.router.current_path(), &self.completed, &self.layout)
            {
                info!(
                    "[PHASE: wizard] [STEP: mount] {} is locked, redirecting to {}",
                    self.router.current_path(),
                    path
                );
                self.router.replace(&path);
            }
        }
        self.sync_active_step();
        self.tabs.focus(self.active_step);
    }

    /// Mirror the router path into the active step. Unknown paths leave it unchanged.
    pub fn sync_active_step(&mut self) {
        if let Some(index) = self.layout.step_index_for_path(self.router.current_path()) {
            self.active_step = index;
        }
    }

    pub fn state(&self) -> &WizardState {
        self.store.state()
    }

    pub fn store(&self) -> &FormStore<S> {
        &self.store
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn layout(&self) -> &StepLayout {
        &self.layout
    }

    pub fn completed(&self) -> &Completed {
        &self.completed
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn active(&self) -> Step {
        self.layout.step(self.active_step).unwrap_or(Step::UserInfo)
    }

    pub fn is_recap(&self) -> bool {
        self.active_step == self.layout.recap_index()
    }

    pub fn tabs(&self) -> &TabNavigation {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabNavigation {
        &mut self.tabs
    }

    pub fn is_tab_enabled(&self, index: usize) -> bool {
        index < self.layout.len() && is_tab_enabled(index, &self.completed)
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.tabs.set_orientation(orientation);
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// "Next" button of a form step: forward validation, commit, mark the step complete and go
    /// to the following step.
    pub fn next(&mut self, data: StepData) -> Result<usize, FieldErrors> {
        let step = data.step();
        let valid = self.check(data, ValidationMode::Forward)?;
        self.commit(valid);
        let Some(index) = self.layout.index_of(step) else {
            return Ok(self.active_step);
        };
        self.completed.mark(index);
        let target = (index + 1).min(self.layout.recap_index());
        self.navigate_to(target);
        Ok(target)
    }

    /// "Previous" button of a form step: backward validation, commit, go to the step before.
    pub fn previous(&mut self, data: StepData) -> Result<usize, FieldErrors> {
        let step = data.step();
        let valid = self.check(data, ValidationMode::Backward)?;
        self.commit(valid);
        let Some(index) = self.layout.index_of(step) else {
            return Ok(self.active_step);
        };
        let target = index.saturating_sub(1);
        self.navigate_to(target);
        Ok(target)
    }

    /// "Previous" button of the summary.
    pub fn recap_previous(&mut self) -> usize {
        let target = self.layout.recap_index().saturating_sub(1);
        self.navigate_to(target);
        target
    }

    /// Whether the active step can be left. Form steps validate backward and commit on success;
    /// the summary (no data) can always be left.
    pub async fn leave_current(&mut self, data: Option<StepData>) -> bool {
        let Some(data) = data else {
            return true;
        };
        match self.check(data, ValidationMode::Backward) {
            Ok(valid) => {
                self.commit(valid);
                true
            }
            Err(_) => false,
        }
    }

    /// Tab activation (click, Enter, Space). Disabled tabs do nothing; otherwise the active step
    /// must agree to be left first.
    pub async fn change_tab(&mut self, target: usize, data: Option<StepData>) -> bool {
        if !self.is_tab_enabled(target) {
            return false;
        }
        if !self.leave_current(data).await {
            return false;
        }
        self.navigate_to(target);
        self.tabs.focus(target);
        true
    }

    /// Key pressed while the tab strip has focus.
    pub async fn handle_tab_key(&mut self, key: NavKey, data: Option<StepData>) -> TabKeyOutcome {
        let outcome = self.tabs.handle_key(key, &self.completed);
        if let TabKeyOutcome::Activate(index) = outcome {
            if !self.change_tab(index, data).await {
                return TabKeyOutcome::Ignored;
            }
        }
        outcome
    }

    /// "Modify" links of the summary.
    pub fn jump_to(&mut self, step: Step) -> bool {
        match self.layout.index_of(step) {
            Some(index) if self.is_tab_enabled(index) => {
                self.navigate_to(index);
                true
            }
            _ => false,
        }
    }

    /// Empty the form, forget completed steps and go back to the first step.
    pub fn reset_all(&mut self) {
        if let Err(e) = self.store.reset() {
            warn!(
                "[PHASE: wizard] [STEP: reset] Failed to clear persisted form state: {}",
                e
            );
        }
        self.completed.clear();
        self.field_errors = FieldErrors::default();
        if let Some(root) = self.layout.path_for_step(0) {
            self.router.push(&root);
        }
        self.sync_active_step();
        self.tabs.focus(self.active_step);
    }

    pub fn prepare_submission(&self) -> MediationRequestSubmission {
        MediationRequestSubmission::from_state(
            self.store.state(),
            self.context.organization_app.as_ref(),
            self.context.user_id.as_deref(),
        )
    }

    /// Apply the outcome of a submission. Success resets the wizard; failure keeps everything
    /// and only shows the error.
    pub fn finish_submission(&mut self, result: WizardResult<SubmissionReceipt>) -> bool {
        match result {
            Ok(receipt) => {
                info!(
                    "[PHASE: submit] [STEP: done] Mediation request {} sent (HTTP {})",
                    receipt.correlation_id, receipt.status
                );
                self.notification = Some(Notification {
                    severity: Severity::Success,
                    text: SUBMIT_SUCCESS_TEXT,
                });
                self.reset_all();
                true
            }
            Err(e) => {
                error!("[PHASE: submit] [STEP: done] Mediation request failed: {}", e);
                self.notification = Some(Notification {
                    severity: Severity::Error,
                    text: SUBMIT_FAILURE_TEXT,
                });
                false
            }
        }
    }

    pub async fn submit<A: MediationApi + ?Sized>(&mut self, api: &A) -> bool {
        let submission = self.prepare_submission();
        let result = api.submit(&submission).await;
        self.finish_submission(result)
    }

    fn check(&mut self, data: StepData, mode: ValidationMode) -> Result<ValidStep, FieldErrors> {
        match validate(data, mode) {
            Ok(valid) => {
                self.field_errors = FieldErrors::default();
                Ok(valid)
            }
            Err(errors) => {
                if let Some(first) = errors.first_error() {
                    info!(
                        "[PHASE: wizard] [STEP: validate] {} invalid field(s), first: {}",
                        errors.len(),
                        first.field
                    );
                }
                self.field_errors = errors.clone();
                Err(errors)
            }
        }
    }

    fn commit(&mut self, valid: ValidStep) {
        // the in-memory state is updated even when the write-through fails
        if let Err(e) = self.store.commit(valid) {
            warn!(
                "[PHASE: wizard] [STEP: commit] Failed to persist form state: {}",
                e
            );
        }
    }

    fn navigate_to(&mut self, index: usize) {
        if let Some(path) = self.layout.path_for_step(index) {
            self.router.push(&path);
        }
        self.sync_active_step();
        self.tabs.request_focus();
    }
}
