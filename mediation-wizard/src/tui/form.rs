// Editable copy of the step records plus the field list the terminal shows for each step.

use crate::models::state::{
    choice_label, cycle_choice, AssistiveTechnology, AttachedFile, Choice, OrganizationInfo,
    ProblemDescription, StepData, UserInfo, WizardState, YesNo,
};
use crate::i18n::Language;
use crate::wizard::steps::Step;
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldId {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    AssistiveTechnologyUsed,
    TechnologyName,
    TechnologyVersion,
    IssueDescription,
    StepDescription,
    InaccessibilityLevel,
    Urgency,
    BrowserUsed,
    Url,
    Browser,
    BrowserVersion,
    MobileAppUsed,
    MobileAppPlatform,
    MobileAppName,
    OtherUsedSoftware,
    DidTellOrganization,
    DidOrganizationReply,
    OrganizationReply,
    FurtherInfo,
    AttachedFile,
    OrganizationName,
    OrganizationMailingAddress,
    OrganizationEmail,
    OrganizationPhoneNumber,
    OrganizationContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Choice,
    MultiSelect,
}

impl FieldId {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            FieldId::FirstName => "First name / username",
            FieldId::LastName => "Last name",
            FieldId::Email => "E-mail",
            FieldId::PhoneNumber => "Phone number",
            FieldId::AssistiveTechnologyUsed => "Assistive technologies used",
            FieldId::TechnologyName => "Technology name",
            FieldId::TechnologyVersion => "Technology version",
            FieldId::IssueDescription => "What was the issue?",
            FieldId::StepDescription => "Steps you took",
            FieldId::InaccessibilityLevel => "Inaccessibility level",
            FieldId::Urgency => "Is it urgent?",
            FieldId::BrowserUsed => "Did you use a web browser?",
            FieldId::Url => "URL where the problem happened",
            FieldId::Browser => "Web browser",
            FieldId::BrowserVersion => "Web browser version",
            FieldId::MobileAppUsed => "Was it a mobile app?",
            FieldId::MobileAppPlatform => "Kind of app",
            FieldId::MobileAppName => "Name of the app",
            FieldId::OtherUsedSoftware => "Software used",
            FieldId::DidTellOrganization => "Did you tell the organization?",
            FieldId::DidOrganizationReply => "Did they reply?",
            FieldId::OrganizationReply => "Their reply",
            FieldId::FurtherInfo => "Anything else?",
            FieldId::AttachedFile => "Attached file (path)",
            FieldId::OrganizationName => "Organization name",
            FieldId::OrganizationMailingAddress => "Mailing address",
            FieldId::OrganizationEmail => "E-mail",
            FieldId::OrganizationPhoneNumber => "Phone number",
            FieldId::OrganizationContact => "Contact person",
        }
    }

    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            FieldId::AssistiveTechnologyUsed => FieldKind::MultiSelect,
            FieldId::InaccessibilityLevel
            | FieldId::Urgency
            | FieldId::BrowserUsed
            | FieldId::Browser
            | FieldId::MobileAppUsed
            | FieldId::MobileAppPlatform
            | FieldId::DidTellOrganization
            | FieldId::DidOrganizationReply => FieldKind::Choice,
            _ => FieldKind::Text,
        }
    }

    pub(crate) fn required(&self) -> bool {
        matches!(
            self,
            FieldId::FirstName | FieldId::Email | FieldId::IssueDescription
        )
    }

    /// Name used by the validation errors for this field.
    pub(crate) fn error_key(&self) -> &'static str {
        match self {
            FieldId::FirstName => "first_name",
            FieldId::Email | FieldId::OrganizationEmail => "email",
            FieldId::PhoneNumber | FieldId::OrganizationPhoneNumber => "phone_number",
            FieldId::IssueDescription => "issue_description",
            FieldId::Url => "url",
            _ => "",
        }
    }
}

/// Cursor over a text value, counted in chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TextCursor {
    pos: usize,
}

impl TextCursor {
    pub(crate) fn at_end(value: &str) -> Self {
        Self {
            pos: value.chars().count(),
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    fn byte_index(value: &str, pos: usize) -> usize {
        value
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(value.len())
    }

    /// Edit `value` for one key. Returns false when the key is not an editing key.
    pub(crate) fn handle_key(&mut self, value: &mut String, code: KeyCode) -> bool {
        let len = value.chars().count();
        self.pos = self.pos.min(len);
        match code {
            KeyCode::Char(c) => {
                value.insert(Self::byte_index(value, self.pos), c);
                self.pos += 1;
                true
            }
            KeyCode::Backspace => {
                if self.pos > 0 {
                    self.pos -= 1;
                    value.remove(Self::byte_index(value, self.pos));
                }
                true
            }
            KeyCode::Delete => {
                if self.pos < len {
                    value.remove(Self::byte_index(value, self.pos));
                }
                true
            }
            KeyCode::Left => {
                self.pos = self.pos.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.pos = (self.pos + 1).min(len);
                true
            }
            KeyCode::Home => {
                self.pos = 0;
                true
            }
            KeyCode::End => {
                self.pos = len;
                true
            }
            _ => false,
        }
    }
}

/// The records being edited. Reloaded from the store whenever the active step changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormDraft {
    pub(crate) user_info: UserInfo,
    pub(crate) problem_description: ProblemDescription,
    pub(crate) organization_info: OrganizationInfo,
    /// Text of the attachment path, kept apart so a half-typed path is not lost.
    pub(crate) attached_file_path: String,
}

impl FormDraft {
    pub(crate) fn from_state(state: &WizardState) -> Self {
        Self {
            user_info: state.user_info.clone(),
            problem_description: state.problem_description.clone(),
            organization_info: state.organization_info.clone(),
            attached_file_path: state
                .problem_description
                .attached_file
                .as_ref()
                .map(|f| f.path.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Record handed to the controller when leaving `step`. The summary has none.
    pub(crate) fn step_data(&self, step: Step) -> Option<StepData> {
        match step {
            Step::UserInfo => Some(StepData::UserInfo(self.user_info.clone())),
            Step::ProblemDescription => {
                let mut problem = self.problem_description.clone();
                let path = self.attached_file_path.trim();
                problem.attached_file = if path.is_empty() {
                    None
                } else {
                    Some(AttachedFile::new(path))
                };
                Some(StepData::ProblemDescription(problem))
            }
            Step::OrganizationInfo => {
                Some(StepData::OrganizationInfo(self.organization_info.clone()))
            }
            Step::Recap => None,
        }
    }

    pub(crate) fn text(&self, field: FieldId) -> Option<&str> {
        let u = &self.user_info;
        let p = &self.problem_description;
        let o = &self.organization_info;
        let value = match field {
            FieldId::FirstName => &u.first_name,
            FieldId::LastName => &u.last_name,
            FieldId::Email => &u.email,
            FieldId::PhoneNumber => &u.phone_number,
            FieldId::TechnologyName => &u.technology_name,
            FieldId::TechnologyVersion => &u.technology_version,
            FieldId::IssueDescription => &p.issue_description,
            FieldId::StepDescription => &p.step_description,
            FieldId::Url => &p.url,
            FieldId::BrowserVersion => &p.browser_version,
            FieldId::MobileAppName => &p.mobile_app_name,
            FieldId::OtherUsedSoftware => &p.other_used_software,
            FieldId::OrganizationReply => &p.organization_reply,
            FieldId::FurtherInfo => &p.further_info,
            FieldId::AttachedFile => &self.attached_file_path,
            FieldId::OrganizationName => &o.name,
            FieldId::OrganizationMailingAddress => &o.mailing_address,
            FieldId::OrganizationEmail => &o.email,
            FieldId::OrganizationPhoneNumber => &o.phone_number,
            FieldId::OrganizationContact => &o.contact,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub(crate) fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        let u = &mut self.user_info;
        let p = &mut self.problem_description;
        let o = &mut self.organization_info;
        let value = match field {
            FieldId::FirstName => &mut u.first_name,
            FieldId::LastName => &mut u.last_name,
            FieldId::Email => &mut u.email,
            FieldId::PhoneNumber => &mut u.phone_number,
            FieldId::TechnologyName => &mut u.technology_name,
            FieldId::TechnologyVersion => &mut u.technology_version,
            FieldId::IssueDescription => &mut p.issue_description,
            FieldId::StepDescription => &mut p.step_description,
            FieldId::Url => &mut p.url,
            FieldId::BrowserVersion => &mut p.browser_version,
            FieldId::MobileAppName => &mut p.mobile_app_name,
            FieldId::OtherUsedSoftware => &mut p.other_used_software,
            FieldId::OrganizationReply => &mut p.organization_reply,
            FieldId::FurtherInfo => &mut p.further_info,
            FieldId::AttachedFile => &mut self.attached_file_path,
            FieldId::OrganizationName => &mut o.name,
            FieldId::OrganizationMailingAddress => &mut o.mailing_address,
            FieldId::OrganizationEmail => &mut o.email,
            FieldId::OrganizationPhoneNumber => &mut o.phone_number,
            FieldId::OrganizationContact => &mut o.contact,
            _ => return None,
        };
        Some(value)
    }

    /// Label of the current answer of a choice field.
    pub(crate) fn choice_text(&self, field: FieldId) -> &'static str {
        let p = &self.problem_description;
        match field {
            FieldId::InaccessibilityLevel => choice_label(p.inaccessibility_level),
            FieldId::Urgency => choice_label(p.urgency),
            FieldId::BrowserUsed => choice_label(p.browser_used),
            FieldId::Browser => choice_label(p.browser),
            FieldId::MobileAppUsed => choice_label(p.mobile_app_used),
            FieldId::MobileAppPlatform => choice_label(p.mobile_app_platform),
            FieldId::DidTellOrganization => choice_label(p.did_tell_organization),
            FieldId::DidOrganizationReply => choice_label(p.did_organization_reply),
            _ => "",
        }
    }

    pub(crate) fn cycle(&mut self, field: FieldId, forward: bool) {
        let p = &mut self.problem_description;
        match field {
            FieldId::InaccessibilityLevel => {
                p.inaccessibility_level = cycle_choice(p.inaccessibility_level, forward)
            }
            FieldId::Urgency => p.urgency = cycle_choice(p.urgency, forward),
            FieldId::BrowserUsed => p.browser_used = cycle_choice(p.browser_used, forward),
            FieldId::Browser => p.browser = cycle_choice(p.browser, forward),
            FieldId::MobileAppUsed => p.mobile_app_used = cycle_choice(p.mobile_app_used, forward),
            FieldId::MobileAppPlatform => {
                p.mobile_app_platform = cycle_choice(p.mobile_app_platform, forward)
            }
            FieldId::DidTellOrganization => {
                p.did_tell_organization = cycle_choice(p.did_tell_organization, forward)
            }
            FieldId::DidOrganizationReply => {
                p.did_organization_reply = cycle_choice(p.did_organization_reply, forward)
            }
            _ => {}
        }
    }

    pub(crate) fn toggle_technology(&mut self, index: usize) {
        if let Some(technology) = AssistiveTechnology::ALL.get(index) {
            self.user_info.toggle_technology(*technology);
        }
    }

    pub(crate) fn uses_technology(&self, index: usize) -> bool {
        AssistiveTechnology::ALL
            .get(index)
            .map(|t| self.user_info.assistive_technology_used.contains(t))
            .unwrap_or(false)
    }
}

fn not_no(value: Option<YesNo>) -> bool {
    value != Some(YesNo::No)
}

/// Fields shown for `step`, in screen order. Follow-up questions only appear when the
/// answer they depend on allows them.
pub(crate) fn visible_fields(
    step: Step,
    draft: &FormDraft,
    has_organization_app: bool,
) -> Vec<FieldId> {
    match step {
        Step::UserInfo => vec![
            FieldId::FirstName,
            FieldId::LastName,
            FieldId::Email,
            FieldId::PhoneNumber,
            FieldId::AssistiveTechnologyUsed,
            FieldId::TechnologyName,
            FieldId::TechnologyVersion,
        ],
        Step::ProblemDescription => {
            let p = &draft.problem_description;
            let mut fields = vec![
                FieldId::IssueDescription,
                FieldId::StepDescription,
                FieldId::InaccessibilityLevel,
                FieldId::Urgency,
                FieldId::BrowserUsed,
            ];
            if not_no(p.browser_used) {
                fields.extend([FieldId::Url, FieldId::Browser, FieldId::BrowserVersion]);
            } else {
                fields.push(FieldId::MobileAppUsed);
                if not_no(p.mobile_app_used) {
                    fields.extend([FieldId::MobileAppPlatform, FieldId::MobileAppName]);
                } else {
                    fields.push(FieldId::OtherUsedSoftware);
                }
            }
            if !has_organization_app {
                fields.push(FieldId::DidTellOrganization);
                if not_no(p.did_tell_organization) {
                    fields.push(FieldId::DidOrganizationReply);
                    if not_no(p.did_organization_reply) {
                        fields.push(FieldId::OrganizationReply);
                    }
                }
            }
            fields.extend([FieldId::FurtherInfo, FieldId::AttachedFile]);
            fields
        }
        Step::OrganizationInfo => vec![
            FieldId::OrganizationName,
            FieldId::OrganizationMailingAddress,
            FieldId::OrganizationEmail,
            FieldId::OrganizationPhoneNumber,
            FieldId::OrganizationContact,
        ],
        Step::Recap => Vec::new(),
    }
}

/// Field of `step` a validation error points at.
pub(crate) fn field_for_error(step: Step, error_key: &str) -> Option<FieldId> {
    let candidates: &[FieldId] = match step {
        Step::UserInfo => &[FieldId::FirstName, FieldId::Email, FieldId::PhoneNumber],
        Step::ProblemDescription => &[FieldId::IssueDescription, FieldId::Url],
        Step::OrganizationInfo => &[FieldId::OrganizationEmail, FieldId::OrganizationPhoneNumber],
        Step::Recap => &[],
    };
    candidates.iter().copied().find(|f| f.error_key() == error_key)
}

/// Summary lines of one step for the recap page.
pub(crate) fn recap_lines(
    step: Step,
    state: &WizardState,
    has_organization_app: bool,
    language: Language,
) -> Vec<(&'static str, String)> {
    let draft = FormDraft::from_state(state);
    visible_fields(step, &draft, has_organization_app)
        .into_iter()
        .map(|field| {
            let value = match field.kind() {
                FieldKind::Text => draft.text(field).unwrap_or_default().to_string(),
                FieldKind::Choice => language.tr(draft.choice_text(field)).to_string(),
                FieldKind::MultiSelect => state
                    .user_info
                    .assistive_technology_used
                    .iter()
                    .map(|t| language.tr(t.as_str()))
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            (language.tr(field.label()), value)
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::{Browser, InaccessibilityLevel, MobileAppPlatform, Urgency};

    #[test]
    fn cursor_edits_multibyte_text() {
        let mut value = "Zoé".to_string();
        let mut cursor = TextCursor::at_end(&value);
        cursor.handle_key(&mut value, KeyCode::Backspace);
        assert_eq!(value, "Zo");
        cursor.handle_key(&mut value, KeyCode::Home);
        cursor.handle_key(&mut value, KeyCode::Char('É'));
        assert_eq!(value, "ÉZo");
        assert_eq!(cursor.pos(), 1);
        cursor.handle_key(&mut value, KeyCode::Delete);
        assert_eq!(value, "Éo");
        assert!(!cursor.handle_key(&mut value, KeyCode::Tab));
    }

    #[test]
    fn browser_answer_switches_follow_up_questions() {
        let mut draft = FormDraft::default();
        let fields = visible_fields(Step::ProblemDescription, &draft, false);
        assert!(fields.contains(&FieldId::Url));
        assert!(!fields.contains(&FieldId::MobileAppUsed));

        draft.problem_description.browser_used = Some(YesNo::No);
        let fields = visible_fields(Step::ProblemDescription, &draft, false);
        assert!(!fields.contains(&FieldId::Url));
        assert!(fields.contains(&FieldId::MobileAppPlatform));

        draft.problem_description.mobile_app_used = Some(YesNo::No);
        let fields = visible_fields(Step::ProblemDescription, &draft, false);
        assert!(fields.contains(&FieldId::OtherUsedSoftware));
        assert!(!fields.contains(&FieldId::MobileAppName));
    }

    #[test]
    fn organization_answer_is_hidden_for_organization_apps() {
        let draft = FormDraft::default();
        assert!(visible_fields(Step::ProblemDescription, &draft, false)
            .contains(&FieldId::DidTellOrganization));
        assert!(!visible_fields(Step::ProblemDescription, &draft, true)
            .contains(&FieldId::DidTellOrganization));
    }

    #[test]
    fn attachment_path_becomes_attached_file() {
        let mut draft = FormDraft::default();
        draft.attached_file_path = " /tmp/screenshot.png ".to_string();
        match draft.step_data(Step::ProblemDescription) {
            Some(StepData::ProblemDescription(p)) => {
                assert_eq!(
                    p.attached_file.map(|f| f.file_name()).as_deref(),
                    Some("screenshot.png")
                )
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(draft.step_data(Step::Recap), None);
    }

    #[test]
    fn choice_fields_cycle_and_render_labels() {
        let mut draft = FormDraft::default();
        assert_eq!(draft.choice_text(FieldId::Browser), "Not specified");
        draft.cycle(FieldId::Browser, true);
        assert_eq!(draft.problem_description.browser, Some(Browser::Firefox));
        assert_eq!(draft.choice_text(FieldId::Browser), "Firefox");
        draft.cycle(FieldId::Browser, false);
        assert_eq!(draft.problem_description.browser, None);
    }

    #[test]
    fn errors_map_back_to_fields() {
        assert_eq!(
            field_for_error(Step::OrganizationInfo, "email"),
            Some(FieldId::OrganizationEmail)
        );
        assert_eq!(field_for_error(Step::UserInfo, "email"), Some(FieldId::Email));
        assert_eq!(field_for_error(Step::Recap, "email"), None);
    }

    #[test]
    fn recap_skips_empty_answers() {
        let mut state = WizardState::default();
        state.user_info.first_name = "Bill".to_string();
        state.user_info.toggle_technology(AssistiveTechnology::Keyboard);
        let lines = recap_lines(Step::UserInfo, &state, false, Language::En);
        assert_eq!(
            lines,
            vec![
                ("First name / username", "Bill".to_string()),
                ("Assistive technologies used", "Keyboard".to_string()),
            ]
        );
    }

    #[test]
    fn recap_is_translated() {
        let mut state = WizardState::default();
        state.user_info.first_name = "Bill".to_string();
        state.user_info.toggle_technology(AssistiveTechnology::Keyboard);
        state.problem_description.issue_description = "Cannot log in".to_string();
        state.problem_description.browser_used = Some(YesNo::No);

        let lines = recap_lines(Step::UserInfo, &state, false, Language::Fr);
        assert_eq!(lines[0], ("Prénom / pseudo", "Bill".to_string()));
        assert_eq!(
            lines[1],
            ("Technologies d'assistance utilisées", "Clavier".to_string())
        );

        let lines = recap_lines(Step::ProblemDescription, &state, false, Language::Fr);
        assert!(lines.contains(&("Avez-vous utilisé un navigateur web ?", "Non".to_string())));
    }

    #[test]
    fn every_label_and_answer_has_a_french_text() {
        for step in [Step::UserInfo, Step::ProblemDescription, Step::OrganizationInfo] {
            let mut draft = FormDraft::default();
            draft.problem_description.browser_used = Some(YesNo::Yes);
            draft.problem_description.did_tell_organization = Some(YesNo::Yes);
            draft.problem_description.did_organization_reply = Some(YesNo::Yes);
            for field in visible_fields(step, &draft, false) {
                assert!(Language::Fr.has(field.label()), "{}", field.label());
            }
        }
        for label in [
            FieldId::MobileAppUsed.label(),
            FieldId::MobileAppPlatform.label(),
            FieldId::MobileAppName.label(),
            FieldId::OtherUsedSoftware.label(),
            choice_label::<YesNo>(None),
        ] {
            assert!(Language::Fr.has(label), "{}", label);
        }
        assert_choices_translated::<AssistiveTechnology>();
        assert_choices_translated::<YesNo>();
        assert_choices_translated::<Urgency>();
        assert_choices_translated::<InaccessibilityLevel>();
        assert_choices_translated::<Browser>();
        assert_choices_translated::<MobileAppPlatform>();
    }

    fn assert_choices_translated<T: Choice>() {
        for choice in T::ALL {
            assert!(Language::Fr.has(choice.as_str()), "{}", choice.as_str());
        }
    }
}
