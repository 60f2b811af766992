use crate::git::BranchCandidate;

pub struct BranchItem {
    pub candidate: BranchCandidate,
    pub selected: bool,
}

/// State of the built-in checkbox selector. Items keep the order they were
/// listed in.
pub struct App {
    branches: Vec<BranchItem>,
    cursor: usize,
    should_quit: bool,
    confirmed: bool,
    /// Message id of a transient notice shown in the status box.
    message: Option<&'static str>,
}

impl App {
    pub fn new(candidates: &[BranchCandidate]) -> Self {
        let branches = candidates
            .iter()
            .cloned()
            .map(|candidate| BranchItem {
                candidate,
                selected: false,
            })
            .collect();

        Self {
            branches,
            cursor: 0,
            should_quit: false,
            confirmed: false,
            message: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn move_down(&mut self) {
        if self.branches.is_empty() {
            return;
        }
        self.clear_message();
        self.cursor = (self.cursor + 1).min(self.branches.len() - 1);
    }

    pub fn move_up(&mut self) {
        if self.branches.is_empty() {
            return;
        }
        self.clear_message();
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn toggle_current(&mut self) {
        if let Some(current) = self.branches.get_mut(self.cursor) {
            current.selected = !current.selected;
        }
        self.clear_message();
    }

    pub fn toggle_all(&mut self) {
        let all_selected = self.branches.iter().all(|branch| branch.selected);
        for branch in &mut self.branches {
            branch.selected = !all_selected;
        }
        self.clear_message();
    }

    pub fn cancel(&mut self) {
        self.should_quit = true;
    }

    pub fn confirm(&mut self) {
        if self.selected_count() == 0 {
            self.message = Some("CheckboxSelectAtLeastOne");
            return;
        }
        self.confirmed = true;
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[BranchItem] {
        &self.branches
    }

    pub fn selected_count(&self) -> usize {
        self.branches
            .iter()
            .filter(|branch| branch.selected)
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.branches.len()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    pub fn selected_candidates(&self) -> Vec<BranchCandidate> {
        self.branches
            .iter()
            .filter(|branch| branch.selected)
            .map(|branch| branch.candidate.clone())
            .collect()
    }
}
