// Wizard steps and the paths they live at.

use crate::models::state::StepData;

pub const ROOT_PATH: &str = "/";
pub const PROBLEM_DESCRIPTION_PATH: &str = "/problem-description";
pub const ORGANIZATION_INFO_PATH: &str = "/organization-info";
pub const RECAP_PATH: &str = "/recap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    UserInfo,
    ProblemDescription,
    OrganizationInfo,
    Recap,
}

impl Step {
    /// Short label used in the tab strip.
    pub fn label(&self) -> &'static str {
        match self {
            Step::UserInfo => "About you",
            Step::ProblemDescription => "Your problem",
            Step::OrganizationInfo => "The organization",
            Step::Recap => "Summary",
        }
    }

    /// Heading fragment, rendered as "Step N: <heading>".
    pub fn heading(&self) -> &'static str {
        match self {
            Step::UserInfo => "About yourself",
            Step::ProblemDescription => "Your problem",
            Step::OrganizationInfo => "The organization",
            Step::Recap => "Summary",
        }
    }

    pub fn page_title(&self) -> &'static str {
        match self {
            Step::UserInfo => "Submit a mediation request: your details",
            Step::ProblemDescription => "Submit a mediation request: your problem",
            Step::OrganizationInfo => "Submit a mediation request: the organization",
            Step::Recap => "Submit a mediation request: summary",
        }
    }

    /// Unprefixed path of the step.
    pub fn base_path(&self) -> &'static str {
        match self {
            Step::UserInfo => ROOT_PATH,
            Step::ProblemDescription => PROBLEM_DESCRIPTION_PATH,
            Step::OrganizationInfo => ORGANIZATION_INFO_PATH,
            Step::Recap => RECAP_PATH,
        }
    }
}

impl StepData {
    pub fn step(&self) -> Step {
        match self {
            StepData::UserInfo(_) => Step::UserInfo,
            StepData::ProblemDescription(_) => Step::ProblemDescription,
            StepData::OrganizationInfo(_) => Step::OrganizationInfo,
        }
    }
}

/// Path prefix for an organization app context (`/{organization}/{application}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrefix {
    slugs: Option<(String, String)>,
}

impl PathPrefix {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn organization_app(organization_slug: &str, application_slug: &str) -> Self {
        Self {
            slugs: Some((
                organization_slug.trim_matches('/').to_string(),
                application_slug.trim_matches('/').to_string(),
            )),
        }
    }

    pub fn is_prefixed(&self) -> bool {
        self.slugs.is_some()
    }

    pub fn slugs(&self) -> Option<(&str, &str)> {
        self.slugs.as_ref().map(|(o, a)| (o.as_str(), a.as_str()))
    }

    /// Prefix an unprefixed path. The prefixed root has no trailing slash.
    pub fn generate(&self, path: &str) -> String {
        match &self.slugs {
            None => path.to_string(),
            Some((org, app)) if path == ROOT_PATH => format!("/{}/{}", org, app),
            Some((org, app)) => format!("/{}/{}{}", org, app, path),
        }
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    }
}

/// Ordered steps of one wizard instance: four steps standalone, three with an organization app
/// context (no organization step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLayout {
    steps: Vec<Step>,
    prefix: PathPrefix,
}

impl StepLayout {
    pub fn standalone() -> Self {
        Self {
            steps: vec![
                Step::UserInfo,
                Step::ProblemDescription,
                Step::OrganizationInfo,
                Step::Recap,
            ],
            prefix: PathPrefix::none(),
        }
    }

    pub fn for_organization_app(prefix: PathPrefix) -> Self {
        Self {
            steps: vec![Step::UserInfo, Step::ProblemDescription, Step::Recap],
            prefix,
        }
    }

    pub fn has_organization_app(&self) -> bool {
        !self.steps.contains(&Step::OrganizationInfo)
    }

    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    pub fn index_of(&self, step: Step) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    pub fn recap_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// "Step N: <heading>" for the step at `index`.
    pub fn title(&self, index: usize) -> Option<String> {
        self.step(index)
            .map(|s| format!("Step {}: {}", index + 1, s.heading()))
    }

    pub fn path_for(&self, step: Step) -> String {
        self.prefix.generate(step.base_path())
    }

    pub fn path_for_step(&self, index: usize) -> Option<String> {
        self.step(index).map(|s| self.path_for(s))
    }

    /// Step index whose (prefixed) path matches `path`. Query strings, fragments and a trailing
    /// slash are ignored.
    pub fn step_index_for_path(&self, path: &str) -> Option<usize> {
        let wanted = normalize(path);
        self.steps
            .iter()
            .position(|s| normalize(&self.path_for(*s)) == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_layout_has_four_steps() {
        let layout = StepLayout::standalone();
        assert_eq!(layout.len(), 4);
        assert!(!layout.has_organization_app());
        assert_eq!(layout.recap_index(), 3);
        let labels: Vec<_> = layout.steps().iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["About you", "Your problem", "The organization", "Summary"]
        );
        assert_eq!(layout.title(3).as_deref(), Some("Step 4: Summary"));
    }

    #[test]
    fn organization_app_layout_skips_organization_step() {
        let layout = StepLayout::for_organization_app(PathPrefix::organization_app(
            "koena",
            "koena-connect",
        ));
        assert_eq!(layout.len(), 3);
        assert!(layout.has_organization_app());
        assert_eq!(layout.recap_index(), 2);
        assert_eq!(layout.index_of(Step::OrganizationInfo), None);
        assert_eq!(layout.title(2).as_deref(), Some("Step 3: Summary"));
    }

    #[test]
    fn paths_are_prefixed_with_organization_slugs() {
        let layout = StepLayout::for_organization_app(PathPrefix::organization_app(
            "koena",
            "koena-connect",
        ));
        assert_eq!(
            layout.path_for_step(0).as_deref(),
            Some("/koena/koena-connect")
        );
        assert_eq!(
            layout.path_for_step(1).as_deref(),
            Some("/koena/koena-connect/problem-description")
        );
        assert_eq!(
            layout.path_for_step(2).as_deref(),
            Some("/koena/koena-connect/recap")
        );
        assert_eq!(layout.path_for_step(3), None);
    }

    #[test]
    fn path_lookup_normalizes_input() {
        let layout = StepLayout::standalone();
        assert_eq!(layout.step_index_for_path("/"), Some(0));
        assert_eq!(layout.step_index_for_path("/problem-description/"), Some(1));
        assert_eq!(layout.step_index_for_path("/organization-info?x=1"), Some(2));
        assert_eq!(layout.step_index_for_path("/recap#top"), Some(3));
        assert_eq!(layout.step_index_for_path("/unknown"), None);

        let prefixed = StepLayout::for_organization_app(PathPrefix::organization_app(
            "koena",
            "koena-connect",
        ));
        assert_eq!(prefixed.step_index_for_path("/koena/koena-connect/"), Some(0));
        assert_eq!(prefixed.step_index_for_path("/recap"), None);
    }
}
