//! In-memory services for tests
//!
//! Both fakes serve `ITEMS_PER_PAGE` items per page, record every call and can
//! be told to fail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::repository::RepositoryRef;
use crate::service::{
    LabelPage, LabelRequest, LabelService, MilestonePage, MilestoneRequest, MilestoneService,
    MilestoneState, RemoteLabel, RemoteMilestone,
};

pub(crate) const ITEMS_PER_PAGE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListLabels(String, u32),
    CreateLabel(String, LabelRequest),
    EditLabel(String, String, LabelRequest),
    ListMilestones(String, u32),
    CreateMilestone(String, MilestoneRequest),
    EditMilestone(String, u64, MilestoneRequest),
}

impl Call {
    pub(crate) fn is_mutation(&self) -> bool {
        !matches!(self, Call::ListLabels(..) | Call::ListMilestones(..))
    }

    pub(crate) fn repository(&self) -> &str {
        match self {
            Call::ListLabels(repo, ..)
            | Call::CreateLabel(repo, ..)
            | Call::EditLabel(repo, ..)
            | Call::ListMilestones(repo, ..)
            | Call::CreateMilestone(repo, ..)
            | Call::EditMilestone(repo, ..) => repo,
        }
    }
}

struct State<T> {
    items: Vec<T>,
    calls: Vec<Call>,
    failing_repo: Option<String>,
    failing_mutations: bool,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            calls: Vec::new(),
            failing_repo: None,
            failing_mutations: false,
        }
    }
}

impl<T: Clone> State<T> {
    fn record(&mut self, call: Call) -> Result<()> {
        let fail = self.failing_repo.as_deref() == Some(call.repository())
            || (self.failing_mutations && call.is_mutation());
        self.calls.push(call);
        if fail {
            return Err(Error::remote("injected failure"));
        }
        Ok(())
    }

    fn page(&self, page: u32) -> (Vec<T>, Option<u32>) {
        let start = (page as usize * ITEMS_PER_PAGE).min(self.items.len());
        let end = (start + ITEMS_PER_PAGE).min(self.items.len());
        let next_page = if end == self.items.len() {
            None
        } else {
            Some(page + 1)
        };
        (self.items[start..end].to_vec(), next_page)
    }
}

/// Paginated in-memory label store
#[derive(Clone, Default)]
pub(crate) struct FakeLabelService {
    state: Arc<Mutex<State<RemoteLabel>>>,
}

impl FakeLabelService {
    pub(crate) fn with_labels(labels: &[(&str, &str)]) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().items = labels
            .iter()
            .map(|(name, color)| RemoteLabel {
                name: name.to_string(),
                color: color.to_string(),
            })
            .collect();
        service
    }

    pub(crate) fn fail_on_repository(self, repo: &str) -> Self {
        self.state.lock().unwrap().failing_repo = Some(repo.to_string());
        self
    }

    pub(crate) fn fail_mutations(self) -> Self {
        self.state.lock().unwrap().failing_mutations = true;
        self
    }

    pub(crate) fn labels(&self) -> Vec<RemoteLabel> {
        self.state.lock().unwrap().items.clone()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl LabelService for FakeLabelService {
    async fn list_labels(&self, repo: &RepositoryRef, page: u32) -> Result<LabelPage> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::ListLabels(repo.to_string(), page))?;
        let (labels, next_page) = state.page(page);
        Ok(LabelPage { labels, next_page })
    }

    async fn create_label(
        &self,
        repo: &RepositoryRef,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::CreateLabel(repo.to_string(), label.clone()))?;
        let created = RemoteLabel {
            name: label.name.clone(),
            color: label.color.clone(),
        };
        state.items.push(created.clone());
        Ok(created)
    }

    async fn edit_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::EditLabel(
            repo.to_string(),
            name.to_string(),
            label.clone(),
        ))?;
        for existing in state.items.iter_mut().filter(|l| l.name == name) {
            existing.name = label.name.clone();
            existing.color = label.color.clone();
        }
        Ok(RemoteLabel {
            name: label.name.clone(),
            color: label.color.clone(),
        })
    }
}

/// Paginated in-memory milestone store
#[derive(Clone, Default)]
pub(crate) struct FakeMilestoneService {
    state: Arc<Mutex<State<RemoteMilestone>>>,
}

impl FakeMilestoneService {
    pub(crate) fn with_milestones(milestones: Vec<RemoteMilestone>) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().items = milestones;
        service
    }

    /// Open milestones without description or due date, numbered from 1
    pub(crate) fn with_titles(titles: &[&str]) -> Self {
        Self::with_milestones(
            titles
                .iter()
                .enumerate()
                .map(|(i, title)| remote_milestone(i as u64 + 1, title))
                .collect(),
        )
    }

    pub(crate) fn fail_on_repository(self, repo: &str) -> Self {
        self.state.lock().unwrap().failing_repo = Some(repo.to_string());
        self
    }

    pub(crate) fn fail_mutations(self) -> Self {
        self.state.lock().unwrap().failing_mutations = true;
        self
    }

    pub(crate) fn milestones(&self) -> Vec<RemoteMilestone> {
        self.state.lock().unwrap().items.clone()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }
}

#[async_trait]
impl MilestoneService for FakeMilestoneService {
    async fn list_milestones(&self, repo: &RepositoryRef, page: u32) -> Result<MilestonePage> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::ListMilestones(repo.to_string(), page))?;
        let (milestones, next_page) = state.page(page);
        Ok(MilestonePage {
            milestones,
            next_page,
        })
    }

    async fn create_milestone(
        &self,
        repo: &RepositoryRef,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::CreateMilestone(repo.to_string(), milestone.clone()))?;
        let number = state.items.iter().map(|m| m.number).max().unwrap_or(0) + 1;
        let created = RemoteMilestone {
            number,
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            state: milestone.state,
            due_on: Some(milestone.due_on),
        };
        state.items.push(created.clone());
        Ok(created)
    }

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        let mut state = self.state.lock().unwrap();
        state.record(Call::EditMilestone(
            repo.to_string(),
            number,
            milestone.clone(),
        ))?;
        let edited = RemoteMilestone {
            number,
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            state: milestone.state,
            due_on: Some(milestone.due_on),
        };
        for existing in state.items.iter_mut().filter(|m| m.number == number) {
            *existing = edited.clone();
        }
        Ok(edited)
    }
}

pub(crate) fn remote_milestone(number: u64, title: &str) -> RemoteMilestone {
    RemoteMilestone {
        number,
        title: title.to_string(),
        description: String::new(),
        state: MilestoneState::Open,
        due_on: None,
    }
}

pub(crate) fn repo(text: &str) -> RepositoryRef {
    RepositoryRef::parse(text).unwrap()
}
