// Step completion derivation and the initial-load redirect.

use super::steps::{Step, StepLayout};
use crate::models::state::{OrganizationInfo, ProblemDescription, UserInfo, WizardState};
use std::collections::BTreeSet;

pub fn user_info_step_complete(info: &UserInfo) -> bool {
    !info.first_name.is_empty() && !info.email.is_empty()
}

pub fn problem_description_step_complete(problem: &ProblemDescription) -> bool {
    !problem.issue_description.is_empty()
}

/// No organization field is required.
pub fn organization_info_step_complete(_info: &OrganizationInfo) -> bool {
    true
}

/// Set of completed step indices. Missing entries mean "not completed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completed {
    steps: BTreeSet<usize>,
}

impl Completed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.steps.contains(&index)
    }

    /// Whether the step right before `index` is completed. Always false for step 0.
    pub fn predecessor_completed(&self, index: usize) -> bool {
        index > 0 && self.is_completed(index - 1)
    }

    pub fn mark(&mut self, index: usize) {
        self.steps.insert(index);
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Keep already-completed steps and add the ones from `other`.
    pub fn merge(&mut self, other: &Completed) {
        self.steps.extend(other.steps.iter().copied());
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<usize> for Completed {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Completion implied by the persisted state.
///
/// Each step only counts when every step before it counts too; the organization step never
/// counts with an organization app context, where the step does not exist.
pub fn derive_completed(state: &WizardState, layout: &StepLayout) -> Completed {
    let mut completed = Completed::new();
    if !user_info_step_complete(&state.user_info) {
        return completed;
    }
    completed.mark(0);

    if !problem_description_step_complete(&state.problem_description) {
        return completed;
    }
    completed.mark(1);

    if let Some(index) = layout.index_of(Step::OrganizationInfo) {
        if organization_info_step_complete(&state.organization_info) {
            completed.mark(index);
        }
    }
    completed
}

/// Path to redirect to when the step asked at load time is still locked.
///
/// Unknown paths count as step 0 and never redirect.
pub fn initial_redirect(
    requested_path: &str,
    completed: &Completed,
    layout: &StepLayout,
) -> Option<String> {
    let asked = layout.step_index_for_path(requested_path).unwrap_or(0);
    if asked == 0 || completed.predecessor_completed(asked) {
        return None;
    }
    (0..asked)
        .rev()
        .find(|&i| i == 0 || completed.is_completed(i - 1))
        .and_then(|i| layout.path_for_step(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::steps::PathPrefix;

    fn state_with(first_name: &str, email: &str, issue: &str) -> WizardState {
        let mut state = WizardState::default();
        state.user_info.first_name = first_name.to_string();
        state.user_info.email = email.to_string();
        state.problem_description.issue_description = issue.to_string();
        state
    }

    #[test]
    fn empty_state_completes_nothing() {
        let completed = derive_completed(&WizardState::default(), &StepLayout::standalone());
        assert!(completed.is_empty());
    }

    #[test]
    fn completion_is_nested() {
        // problem filled but user info missing email: nothing counts
        let state = state_with("Bill", "", "Cannot log in");
        assert!(derive_completed(&state, &StepLayout::standalone()).is_empty());

        let state = state_with("Bill", "bluebill@koena.net", "");
        let completed = derive_completed(&state, &StepLayout::standalone());
        assert_eq!(completed.iter().collect::<Vec<_>>(), vec![0]);

        let state = state_with("Bill", "bluebill@koena.net", "Cannot log in");
        let completed = derive_completed(&state, &StepLayout::standalone());
        assert_eq!(completed.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn organization_step_never_counts_with_organization_app() {
        let layout = StepLayout::for_organization_app(PathPrefix::organization_app(
            "koena",
            "koena-connect",
        ));
        let state = state_with("Bill", "bluebill@koena.net", "Cannot log in");
        let completed = derive_completed(&state, &layout);
        assert_eq!(completed.iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn locked_step_redirects_to_nearest_unlocked_one() {
        let layout = StepLayout::standalone();
        let none = Completed::new();
        assert_eq!(
            initial_redirect("/problem-description", &none, &layout).as_deref(),
            Some("/")
        );
        assert_eq!(initial_redirect("/recap", &none, &layout).as_deref(), Some("/"));

        let first: Completed = [0].into_iter().collect();
        assert_eq!(
            initial_redirect("/recap", &first, &layout).as_deref(),
            Some("/problem-description")
        );
        assert_eq!(initial_redirect("/problem-description", &first, &layout), None);
    }

    #[test]
    fn root_and_unknown_paths_never_redirect() {
        let layout = StepLayout::standalone();
        let none = Completed::new();
        assert_eq!(initial_redirect("/", &none, &layout), None);
        assert_eq!(initial_redirect("/nowhere", &none, &layout), None);
    }

    #[test]
    fn redirect_uses_prefixed_paths() {
        let layout = StepLayout::for_organization_app(PathPrefix::organization_app(
            "koena",
            "koena-connect",
        ));
        assert_eq!(
            initial_redirect("/koena/koena-connect/recap", &Completed::new(), &layout).as_deref(),
            Some("/koena/koena-connect")
        );
    }

    #[test]
    fn merge_keeps_existing_marks() {
        let mut completed: Completed = [2].into_iter().collect();
        completed.merge(&[0].into_iter().collect());
        assert!(completed.is_completed(0));
        assert!(completed.is_completed(2));
        assert!(!completed.predecessor_completed(0));
        assert!(completed.predecessor_completed(1));
    }
}
