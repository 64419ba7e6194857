// Mediation form state
//
// One typed record per wizard step. The whole `WizardState` is what gets persisted for the
// session and, once merged, what gets posted to the backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A closed set of answers with a backend wire id and a human label.
pub trait Choice: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    /// Value sent to the backend (`VERY_URGENT`, `FIREFOX`, ...).
    fn as_id(&self) -> &'static str;

    /// Label shown to the user.
    fn as_str(&self) -> &'static str;
}

/// Cycle an optional answer: not specified -> first -> ... -> last -> not specified.
pub fn cycle_choice<T: Choice>(current: Option<T>, forward: bool) -> Option<T> {
    let all = T::ALL;
    if all.is_empty() {
        return None;
    }
    let pos = current.and_then(|c| all.iter().position(|v| *v == c));
    if forward {
        match pos {
            None => Some(all[0]),
            Some(i) if i + 1 < all.len() => Some(all[i + 1]),
            Some(_) => None,
        }
    } else {
        match pos {
            None => Some(all[all.len() - 1]),
            Some(0) => None,
            Some(i) => Some(all[i - 1]),
        }
    }
}

/// Label for an optional answer (`None` is rendered as "Not specified").
pub fn choice_label<T: Choice>(value: Option<T>) -> &'static str {
    value.map(|v| v.as_str()).unwrap_or("Not specified")
}

/// Wire id for an optional answer (`None` is sent as an empty string).
pub fn choice_id<T: Choice>(value: Option<T>) -> &'static str {
    value.map(|v| v.as_id()).unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YesNo {
    Yes,
    No,
}

impl Choice for YesNo {
    const ALL: &'static [Self] = &[YesNo::Yes, YesNo::No];

    fn as_id(&self) -> &'static str {
        match self {
            YesNo::Yes => "YES",
            YesNo::No => "NO",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    VeryUrgent,
    ModeratelyUrgent,
    NotUrgent,
}

impl Choice for Urgency {
    const ALL: &'static [Self] = &[
        Urgency::VeryUrgent,
        Urgency::ModeratelyUrgent,
        Urgency::NotUrgent,
    ];

    fn as_id(&self) -> &'static str {
        match self {
            Urgency::VeryUrgent => "VERY_URGENT",
            Urgency::ModeratelyUrgent => "MODERATELY_URGENT",
            Urgency::NotUrgent => "NOT_URGENT",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Urgency::VeryUrgent => "Yes, very urgent: need a quick answer",
            Urgency::ModeratelyUrgent => "Moderately, I can wait, but not too long",
            Urgency::NotUrgent => {
                "Not urgent at all, but would like a solution as soon as possible"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InaccessibilityLevel {
    ImpossibleAccess,
    AccessDifficult,
    RandomAccess,
}

impl Choice for InaccessibilityLevel {
    const ALL: &'static [Self] = &[
        InaccessibilityLevel::ImpossibleAccess,
        InaccessibilityLevel::AccessDifficult,
        InaccessibilityLevel::RandomAccess,
    ];

    fn as_id(&self) -> &'static str {
        match self {
            InaccessibilityLevel::ImpossibleAccess => "IMPOSSIBLE_ACCESS",
            InaccessibilityLevel::AccessDifficult => "ACCESS_DIFFICULT",
            InaccessibilityLevel::RandomAccess => "RANDOM_ACCESS",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            InaccessibilityLevel::ImpossibleAccess => "Impossible access",
            InaccessibilityLevel::AccessDifficult => "Access possible by bypass but difficult",
            InaccessibilityLevel::RandomAccess => {
                "Random access, sometimes it works and sometimes it does not"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Browser {
    Firefox,
    Chrome,
    InternetExplorer,
    MicrosoftEdge,
    Other,
    DontKnow,
}

impl Choice for Browser {
    const ALL: &'static [Self] = &[
        Browser::Firefox,
        Browser::Chrome,
        Browser::InternetExplorer,
        Browser::MicrosoftEdge,
        Browser::Other,
        Browser::DontKnow,
    ];

    fn as_id(&self) -> &'static str {
        match self {
            Browser::Firefox => "FIREFOX",
            Browser::Chrome => "CHROME",
            Browser::InternetExplorer => "INTERNET_EXPLORER",
            Browser::MicrosoftEdge => "MICROSOFT_EDGE",
            Browser::Other => "OTHER",
            Browser::DontKnow => "DONT_KNOW",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::InternetExplorer => "Internet Explorer",
            Browser::MicrosoftEdge => "Microsoft Edge",
            Browser::Other => "Other",
            Browser::DontKnow => "Don't know",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MobileAppPlatform {
    Ios,
    Android,
    WindowsPhone,
    Other,
}

impl Choice for MobileAppPlatform {
    const ALL: &'static [Self] = &[
        MobileAppPlatform::Ios,
        MobileAppPlatform::Android,
        MobileAppPlatform::WindowsPhone,
        MobileAppPlatform::Other,
    ];

    fn as_id(&self) -> &'static str {
        match self {
            MobileAppPlatform::Ios => "IOS",
            MobileAppPlatform::Android => "ANDROID",
            MobileAppPlatform::WindowsPhone => "WINDOWS_PHONE",
            MobileAppPlatform::Other => "OTHER",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            MobileAppPlatform::Ios => "iOS",
            MobileAppPlatform::Android => "Android",
            MobileAppPlatform::WindowsPhone => "Windows phone",
            MobileAppPlatform::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssistiveTechnology {
    Keyboard,
    ScreenReaderVocalSynthesis,
    BrailleDisplay,
    ZoomSoftware,
    VocalCommandSoftware,
    DysDisorderSoftware,
    VirtualKeyboard,
    AdaptedNavigationDispositive,
    ExclusiveKeyboardNavigation,
    Other,
}

impl Choice for AssistiveTechnology {
    const ALL: &'static [Self] = &[
        AssistiveTechnology::Keyboard,
        AssistiveTechnology::ScreenReaderVocalSynthesis,
        AssistiveTechnology::BrailleDisplay,
        AssistiveTechnology::ZoomSoftware,
        AssistiveTechnology::VocalCommandSoftware,
        AssistiveTechnology::DysDisorderSoftware,
        AssistiveTechnology::VirtualKeyboard,
        AssistiveTechnology::AdaptedNavigationDispositive,
        AssistiveTechnology::ExclusiveKeyboardNavigation,
        AssistiveTechnology::Other,
    ];

    fn as_id(&self) -> &'static str {
        match self {
            AssistiveTechnology::Keyboard => "KEYBOARD",
            AssistiveTechnology::ScreenReaderVocalSynthesis => "SCREEN_READER_VOCAL_SYNTHESIS",
            AssistiveTechnology::BrailleDisplay => "BRAILLE_DISPLAY",
            AssistiveTechnology::ZoomSoftware => "ZOOM_SOFTWARE",
            AssistiveTechnology::VocalCommandSoftware => "VOCAL_COMMAND_SOFTWARE",
            AssistiveTechnology::DysDisorderSoftware => "DYS_DISORDER_SOFTWARE",
            AssistiveTechnology::VirtualKeyboard => "VIRTUAL_KEYBOARD",
            AssistiveTechnology::AdaptedNavigationDispositive => "ADAPTED_NAVIGATION_DISPOSITIVE",
            AssistiveTechnology::ExclusiveKeyboardNavigation => "EXCLUSIVE_KEYBOARD_NAVIGATION",
            AssistiveTechnology::Other => "OTHER",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            AssistiveTechnology::Keyboard => "Keyboard",
            AssistiveTechnology::ScreenReaderVocalSynthesis => {
                "Screen reader with vocal synthesis"
            }
            AssistiveTechnology::BrailleDisplay => "Braille display",
            AssistiveTechnology::ZoomSoftware => "Zoom software",
            AssistiveTechnology::VocalCommandSoftware => "Vocal command software",
            AssistiveTechnology::DysDisorderSoftware => "DYS Disorder software",
            AssistiveTechnology::VirtualKeyboard => "Virtual keyboard",
            AssistiveTechnology::AdaptedNavigationDispositive => "Adapted navigation dispositive",
            AssistiveTechnology::ExclusiveKeyboardNavigation => "Exclusive keyboard navigation",
            AssistiveTechnology::Other => "Other",
        }
    }
}

/// File picked by the user to go along with the request. Only the path is persisted; the
/// content is read when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub path: PathBuf,
}

impl AttachedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub assistive_technology_used: Vec<AssistiveTechnology>,
    pub technology_name: String,
    pub technology_version: String,
}

impl UserInfo {
    /// Add or remove a technology, keeping the canonical order of `AssistiveTechnology::ALL`.
    pub fn toggle_technology(&mut self, technology: AssistiveTechnology) {
        if let Some(pos) = self
            .assistive_technology_used
            .iter()
            .position(|t| *t == technology)
        {
            self.assistive_technology_used.remove(pos);
        } else {
            self.assistive_technology_used.push(technology);
            self.assistive_technology_used.sort_by_key(|t| {
                AssistiveTechnology::ALL
                    .iter()
                    .position(|v| v == t)
                    .unwrap_or(usize::MAX)
            });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemDescription {
    pub urgency: Option<Urgency>,
    pub step_description: String,
    pub issue_description: String,
    pub inaccessibility_level: Option<InaccessibilityLevel>,
    pub browser_used: Option<YesNo>,
    pub url: String,
    pub browser: Option<Browser>,
    pub browser_version: String,
    pub mobile_app_used: Option<YesNo>,
    pub mobile_app_platform: Option<MobileAppPlatform>,
    pub mobile_app_name: String,
    pub other_used_software: String,
    pub did_tell_organization: Option<YesNo>,
    pub did_organization_reply: Option<YesNo>,
    pub organization_reply: String,
    pub further_info: String,
    pub attached_file: Option<AttachedFile>,
}

impl ProblemDescription {
    pub fn browser_used_is_no(&self) -> bool {
        self.browser_used == Some(YesNo::No)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizationInfo {
    pub name: String,
    pub mailing_address: String,
    pub email: String,
    pub phone_number: String,
    pub contact: String,
}

/// The three step records, as persisted for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardState {
    pub user_info: UserInfo,
    pub problem_description: ProblemDescription,
    pub organization_info: OrganizationInfo,
}

/// Data carried by an update action: exactly one step record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepData {
    UserInfo(UserInfo),
    ProblemDescription(ProblemDescription),
    OrganizationInfo(OrganizationInfo),
}

impl WizardState {
    pub fn is_empty(&self) -> bool {
        *self == WizardState::default()
    }

    /// Replace the record targeted by `data`.
    pub fn apply(&mut self, data: StepData) {
        match data {
            StepData::UserInfo(v) => self.user_info = v,
            StepData::ProblemDescription(v) => self.problem_description = v,
            StepData::OrganizationInfo(v) => self.organization_info = v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_serialize_to_backend_ids() {
        assert_eq!(
            serde_json::to_string(&Urgency::ModeratelyUrgent).unwrap(),
            "\"MODERATELY_URGENT\""
        );
        assert_eq!(
            serde_json::to_string(&MobileAppPlatform::WindowsPhone).unwrap(),
            "\"WINDOWS_PHONE\""
        );
        assert_eq!(
            serde_json::to_string(&AssistiveTechnology::ScreenReaderVocalSynthesis).unwrap(),
            "\"SCREEN_READER_VOCAL_SYNTHESIS\""
        );
        // serde and as_id must agree
        for b in Browser::ALL {
            assert_eq!(
                serde_json::to_string(b).unwrap(),
                format!("\"{}\"", b.as_id())
            );
        }
    }

    #[test]
    fn cycle_choice_wraps_through_not_specified() {
        let mut v: Option<YesNo> = None;
        v = cycle_choice(v, true);
        assert_eq!(v, Some(YesNo::Yes));
        v = cycle_choice(v, true);
        assert_eq!(v, Some(YesNo::No));
        v = cycle_choice(v, true);
        assert_eq!(v, None);
        v = cycle_choice(v, false);
        assert_eq!(v, Some(YesNo::No));
    }

    #[test]
    fn toggle_technology_keeps_canonical_order() {
        let mut info = UserInfo::default();
        info.toggle_technology(AssistiveTechnology::BrailleDisplay);
        info.toggle_technology(AssistiveTechnology::Keyboard);
        assert_eq!(
            info.assistive_technology_used,
            vec![
                AssistiveTechnology::Keyboard,
                AssistiveTechnology::BrailleDisplay
            ]
        );
        info.toggle_technology(AssistiveTechnology::Keyboard);
        assert_eq!(
            info.assistive_technology_used,
            vec![AssistiveTechnology::BrailleDisplay]
        );
    }

    #[test]
    fn partial_persisted_json_fills_defaults() {
        let json = r#"{"userInfo":{"firstName":"Bill"}}"#;
        let state: WizardState = serde_json::from_str(json).unwrap();
        assert_eq!(state.user_info.first_name, "Bill");
        assert!(state.user_info.email.is_empty());
        assert_eq!(state.problem_description, ProblemDescription::default());
    }

    #[test]
    fn apply_replaces_only_the_targeted_record() {
        let mut state = WizardState::default();
        state.organization_info.name = "Koena".to_string();
        state.apply(StepData::UserInfo(UserInfo {
            first_name: "Bill".to_string(),
            ..UserInfo::default()
        }));
        assert_eq!(state.user_info.first_name, "Bill");
        assert_eq!(state.organization_info.name, "Koena");
        assert!(!state.is_empty());
    }
}
