// API request models
// The multipart payload posted to `/api/mediation-requests/`.

use super::responses::OrganizationApp;
use super::state::{choice_id, AttachedFile, WizardState};

/// Status every request submitted from the public wizard starts in.
pub const INITIAL_STATUS: &str = "WAITING_MEDIATOR_VALIDATION";

/// Multipart name of the file part.
pub const ATTACHED_FILE_PART: &str = "attached_file";

/// Flattened submission: ordered text parts plus an optional file part.
///
/// Field names follow the backend contract, including its mixed snake/camel casing.
/// The file part goes right before `fields[attached_file_at]` (or last when that is the end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediationRequestSubmission {
    pub fields: Vec<(&'static str, String)>,
    pub attached_file: Option<AttachedFile>,
    pub attached_file_at: usize,
}

impl MediationRequestSubmission {
    /// Assemble the payload from the form state.
    ///
    /// With an organization app context the request is attached to that application and the
    /// organization-related answers are left out.
    pub fn from_state(
        state: &WizardState,
        organization_app: Option<&OrganizationApp>,
        user_id: Option<&str>,
    ) -> Self {
        let user = &state.user_info;
        let problem = &state.problem_description;
        let organization = &state.organization_info;

        let mut fields: Vec<(&'static str, String)> = vec![
            ("complainant", user_id.unwrap_or_default().to_string()),
            (
                "application",
                organization_app
                    .map(|app| app.id.clone())
                    .unwrap_or_default(),
            ),
            ("status", INITIAL_STATUS.to_string()),
            ("first_name", user.first_name.clone()),
            ("last_name", user.last_name.clone()),
            ("email", user.email.clone()),
            ("phone_number", user.phone_number.clone()),
        ];
        for technology in &user.assistive_technology_used {
            fields.push((
                "assistive_technology_used",
                crate::models::state::Choice::as_id(technology).to_string(),
            ));
        }
        fields.extend([
            ("technology_name", user.technology_name.clone()),
            ("technology_version", user.technology_version.clone()),
            ("urgency", choice_id(problem.urgency).to_string()),
            ("issue_description", problem.issue_description.clone()),
            ("step_description", problem.step_description.clone()),
            (
                "inaccessibility_level",
                choice_id(problem.inaccessibility_level).to_string(),
            ),
            ("browser_used", choice_id(problem.browser_used).to_string()),
            ("url", problem.url.clone()),
            ("browser", choice_id(problem.browser).to_string()),
            ("browser_version", problem.browser_version.clone()),
            ("mobileAppUsed", choice_id(problem.mobile_app_used).to_string()),
            (
                "mobileAppPlatform",
                choice_id(problem.mobile_app_platform).to_string(),
            ),
            ("mobileAppName", problem.mobile_app_name.clone()),
            ("otherUsedSoftware", problem.other_used_software.clone()),
        ]);

        if organization_app.is_none() {
            fields.extend([
                (
                    "did_tell_organization",
                    choice_id(problem.did_tell_organization).to_string(),
                ),
                (
                    "did_organization_reply",
                    choice_id(problem.did_organization_reply).to_string(),
                ),
                ("organization_reply", problem.organization_reply.clone()),
            ]);
        }

        fields.push(("further_info", problem.further_info.clone()));
        let attached_file_at = fields.len();

        if organization_app.is_none() {
            fields.extend([
                ("organization_name", organization.name.clone()),
                ("organization_address", organization.mailing_address.clone()),
                ("organization_email", organization.email.clone()),
                ("organization_phone_number", organization.phone_number.clone()),
                ("organization_contact", organization.contact.clone()),
            ]);
        }

        Self {
            fields,
            attached_file: problem.attached_file.clone(),
            attached_file_at,
        }
    }

    /// Part names in the order they are sent.
    pub fn part_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.fields.iter().map(|(k, _)| *k).collect();
        if self.attached_file.is_some() {
            names.insert(self.attached_file_at.min(names.len()), ATTACHED_FILE_PART);
        }
        names
    }

    /// First value for a field name (test and dry-run helper).
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}
