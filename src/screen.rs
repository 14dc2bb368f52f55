use serde::Serialize;

use crate::descriptor::{FieldErrors, ResourceDescriptor};
use crate::errors;
use crate::metrics::{MetricCache, MetricValue};
use crate::services::{AdminError, Record, ServiceResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalState {
    Closed,
    Detail { id: String },
    Create { draft: Record, errors: FieldErrors },
    Edit { id: String, draft: Record, errors: FieldErrors },
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            ModalState::Detail { id } | ModalState::Edit { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Issued when a list request starts; the result is applied only if the
/// ticket is still current when it comes back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoadTicket {
    generation: u64,
    epoch: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadOutcome {
    Applied,
    Stale,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Create { record: Record },
    Update { id: String, record: Record },
    Patch { id: String, changes: Record },
    Delete { id: String },
    Action { path: String, body: serde_json::Value, label: String },
}

impl Operation {
    pub fn label(&self) -> &str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Update { .. } => "update",
            Operation::Patch { .. } => "update",
            Operation::Delete { .. } => "delete",
            Operation::Action { label, .. } => label,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            Operation::Update { id, .. } | Operation::Patch { id, .. } | Operation::Delete { id } => {
                Some(id)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionTicket {
    pub operation: Operation,
}

/// What a successful write does to the local list.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Created(Record),
    Updated(Record),
    Removed(String),
    Replaced(Vec<Record>),
    /// The write was saved but the follow-up list failed; the inner change
    /// (if any) is applied locally.
    Unsynced(Option<Box<Change>>),
}

#[derive(Clone, Debug, Serialize)]
pub struct TabView {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

/// Local view-state of one mounted screen.
#[derive(Clone, Debug)]
pub struct ScreenState {
    items: Vec<Record>,
    revision: u64,
    phase: Phase,
    mounted: bool,
    unmounted: bool,
    loaded_once: bool,
    generation: u64,
    epoch: u64,
    pending: usize,
    tab: String,
    filter: String,
    modal: ModalState,
    notice: Option<Notice>,
    cache: MetricCache,
}

impl ScreenState {
    pub fn new(descriptor: &ResourceDescriptor) -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
            phase: Phase::Idle,
            mounted: false,
            unmounted: false,
            loaded_once: false,
            generation: 0,
            epoch: 0,
            pending: 0,
            tab: descriptor.default_tab(),
            filter: String::new(),
            modal: ModalState::Closed,
            notice: None,
            cache: MetricCache::default(),
        }
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn pending_actions(&self) -> usize {
        self.pending
    }

    pub fn active_tab(&self) -> &str {
        &self.tab
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Actions stay disabled until the first load has finished.
    pub fn can_act(&self) -> bool {
        self.loaded_once && !self.unmounted
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.items.iter().find(|r| r.id().as_deref() == Some(id))
    }

    /// Starts the mount-time load. Returns `None` on every call after the first.
    pub fn begin_mount(&mut self) -> Option<LoadTicket> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(self.begin_load())
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        LoadTicket {
            generation: self.generation,
            epoch: self.epoch,
        }
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: ServiceResult<Vec<Record>>) -> LoadOutcome {
        if self.unmounted || ticket.generation != self.generation {
            return LoadOutcome::Stale;
        }
        self.loaded_once = true;
        match result {
            Ok(_) if ticket.epoch != self.epoch => {
                // a write landed while this list was in flight; its result is newer
                self.phase = Phase::Ready;
                LoadOutcome::Stale
            }
            Ok(items) => {
                self.items = items;
                self.revision += 1;
                self.phase = Phase::Ready;
                LoadOutcome::Applied
            }
            Err(error) => {
                self.phase = Phase::Failed;
                self.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: errors::user_message("load", &error),
                });
                LoadOutcome::Failed
            }
        }
    }

    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.modal = ModalState::Closed;
    }

    pub fn select_tab(&mut self, descriptor: &ResourceDescriptor, key: &str) -> bool {
        if descriptor.tab(key).is_none() || self.tab == key {
            return false;
        }
        self.tab = key.to_string();
        true
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    pub fn visible_items<'a>(&'a self, descriptor: &ResourceDescriptor) -> Vec<&'a Record> {
        let tab = descriptor.tab(&self.tab);
        self.items
            .iter()
            .filter(|record| tab.map(|t| t.matches(record)).unwrap_or(true))
            .filter(|record| descriptor.matches_search(record, &self.filter))
            .collect()
    }

    pub fn tab_views(&self, descriptor: &ResourceDescriptor) -> Vec<TabView> {
        descriptor
            .tabs
            .iter()
            .map(|tab| TabView {
                key: tab.key.clone(),
                label: tab.label.clone(),
                count: self.items.iter().filter(|r| tab.matches(r)).count(),
                active: tab.key == self.tab,
            })
            .collect()
    }

    /// Aggregates over every loaded item, recomputed only when items change.
    pub fn metrics(&mut self, descriptor: &ResourceDescriptor) -> &[MetricValue] {
        self.cache
            .get_or_compute(self.revision, &self.items, &descriptor.metrics)
    }

    pub fn metric_computations(&self) -> u64 {
        self.cache.computations()
    }

    pub fn open_detail(&mut self, id: &str) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.modal = ModalState::Detail { id: id.to_string() };
        true
    }

    pub fn open_create(&mut self, descriptor: &ResourceDescriptor) {
        self.modal = ModalState::Create {
            draft: descriptor.blank_draft(),
            errors: FieldErrors::new(),
        };
    }

    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.find(id).cloned() else {
            return false;
        };
        self.modal = ModalState::Edit {
            id: id.to_string(),
            draft: record,
            errors: FieldErrors::new(),
        };
        true
    }

    pub fn edit_draft<T: Serialize>(&mut self, key: &str, value: T) {
        match &mut self.modal {
            ModalState::Create { draft, errors } | ModalState::Edit { draft, errors, .. } => {
                draft.set(key, value);
                errors.remove(key);
            }
            _ => {}
        }
    }

    pub fn set_field_errors(&mut self, field_errors: FieldErrors) {
        match &mut self.modal {
            ModalState::Create { errors, .. } | ModalState::Edit { errors, .. } => {
                *errors = field_errors;
            }
            _ => {}
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    pub fn selected(&self) -> Option<&Record> {
        self.modal.record_id().and_then(|id| self.find(id))
    }

    pub fn begin_action(&mut self, operation: Operation) -> ActionTicket {
        self.pending += 1;
        ActionTicket { operation }
    }

    /// Applies a finished write. Failures only raise a notice; items stay as
    /// they were before the request.
    pub fn finish_action(&mut self, ticket: ActionTicket, result: ServiceResult<Change>) -> bool {
        self.pending = self.pending.saturating_sub(1);
        if self.unmounted {
            return false;
        }
        match result {
            Ok(change) => {
                let synced = !matches!(change, Change::Unsynced(_));
                self.apply(change);
                // any list still in flight predates this write
                self.epoch += 1;
                self.settle_modal(&ticket.operation);
                let action = crate::format::title_case(ticket.operation.label());
                self.notice = Some(if synced {
                    Notice {
                        level: NoticeLevel::Success,
                        message: format!("{action} succeeded"),
                    }
                } else {
                    Notice {
                        level: NoticeLevel::Warning,
                        message: format!("{action} saved, but the list could not be refreshed"),
                    }
                });
                true
            }
            Err(error) => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: errors::user_message(ticket.operation.label(), &error),
                });
                false
            }
        }
    }

    fn apply(&mut self, change: Change) {
        match change {
            // a refresh that overtook the write may already hold the row
            Change::Created(record) => self.upsert(record),
            Change::Updated(record) => {
                if record.id().is_some() {
                    self.upsert(record);
                }
            }
            Change::Removed(id) => self.items.retain(|r| r.id().as_deref() != Some(id.as_str())),
            Change::Replaced(items) => self.items = items,
            Change::Unsynced(Some(inner)) => return self.apply(*inner),
            Change::Unsynced(None) => {}
        }
        self.revision += 1;
    }

    fn upsert(&mut self, record: Record) {
        let id = record.id();
        let slot = id
            .as_deref()
            .and_then(|id| self.items.iter_mut().find(|r| r.id().as_deref() == Some(id)));
        match slot {
            Some(slot) => *slot = record,
            None => self.items.push(record),
        }
    }

    fn settle_modal(&mut self, operation: &Operation) {
        let close = match (&self.modal, operation) {
            (ModalState::Create { .. }, Operation::Create { .. }) => true,
            (ModalState::Edit { id, .. }, Operation::Update { id: target, .. }) => id == target,
            (modal, Operation::Delete { id }) => modal.record_id() == Some(id.as_str()),
            _ => false,
        };
        if close {
            self.modal = ModalState::Closed;
        }
    }

    pub fn record_failure(&mut self, action: &str, error: &AdminError) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            message: errors::user_message(action, error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Column, FieldDescriptor, InputKind, TabSpec};
    use crate::metrics::{self, Aggregate, MetricFormat, MetricSpec};
    use crate::services::rows;
    use serde_json::json;

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("sms", "SMS Campaigns", "campaigns/sms")
            .columns(vec![Column::text("name", "Name")])
            .tabs(vec![TabSpec::status("active"), TabSpec::status("paused")])
            .metrics(vec![
                MetricSpec::new("total", "Campaigns", Aggregate::Count, MetricFormat::Integer),
                MetricSpec::new("revenue", "Revenue", Aggregate::sum("revenue"), MetricFormat::Currency),
                MetricSpec::new("ctr", "CTR", Aggregate::rate("clicks", "reach"), MetricFormat::Percent),
            ])
            .fields(vec![FieldDescriptor::new("name", "Name", InputKind::Text).required()])
    }

    fn sample() -> Vec<Record> {
        rows(vec![
            json!({"id": "c1", "name": "Spring glow", "status": "active", "revenue": 400.0, "clicks": 40, "reach": 800}),
            json!({"id": "c2", "name": "Night serum", "status": "paused", "revenue": 100.0, "clicks": 10, "reach": 200}),
        ])
    }

    fn loaded() -> (ResourceDescriptor, ScreenState) {
        let descriptor = descriptor();
        let mut state = ScreenState::new(&descriptor);
        let ticket = state.begin_mount().unwrap();
        assert_eq!(state.finish_load(ticket, Ok(sample())), LoadOutcome::Applied);
        (descriptor, state)
    }

    #[test]
    fn mount_hands_out_one_ticket() {
        let descriptor = descriptor();
        let mut state = ScreenState::new(&descriptor);
        assert!(!state.can_act());
        assert!(state.begin_mount().is_some());
        assert!(state.begin_mount().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn metrics_match_recomputation() {
        let (descriptor, mut state) = loaded();
        let shown = state.metrics(&descriptor).to_vec();
        assert_eq!(shown, metrics::compute(state.items(), &descriptor.metrics));
        assert_eq!(shown[1].display, "$500.00");
        assert_eq!(shown[2].display, "5.0%");
    }

    #[test]
    fn empty_load_renders_identity_metrics() {
        let descriptor = descriptor();
        let mut state = ScreenState::new(&descriptor);
        let ticket = state.begin_mount().unwrap();
        state.finish_load(ticket, Ok(Vec::new()));
        let shown = state.metrics(&descriptor);
        assert!(shown.iter().all(|m| m.value == 0.0));
        assert_eq!(shown[2].display, "0.0%");
    }

    #[test]
    fn tab_and_filter_changes_reuse_cached_metrics() {
        let (descriptor, mut state) = loaded();
        state.metrics(&descriptor);
        assert!(state.select_tab(&descriptor, "paused"));
        assert!(!state.select_tab(&descriptor, "unknown"));
        state.set_filter("night");
        state.metrics(&descriptor);
        assert_eq!(state.metric_computations(), 1);
        let visible = state.visible_items(&descriptor);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id().as_deref(), Some("c2"));
        let tabs = state.tab_views(&descriptor);
        assert_eq!(tabs.iter().map(|t| t.count).collect::<Vec<_>>(), vec![2, 1, 1]);
    }

    #[test]
    fn cancelling_detail_restores_previous_state() {
        let (_, mut state) = loaded();
        let before = state.items().to_vec();
        assert!(state.open_detail("c1"));
        assert_eq!(state.selected().and_then(|r| r.text("name")).as_deref(), Some("Spring glow"));
        state.close_modal();
        assert_eq!(state.modal(), &ModalState::Closed);
        assert_eq!(state.items(), before.as_slice());
        assert!(!state.open_detail("missing"));
    }

    #[test]
    fn failed_actions_leave_items_untouched() {
        let (descriptor, mut state) = loaded();
        let before = state.metrics(&descriptor).to_vec();
        let ticket = state.begin_action(Operation::Delete { id: "c1".into() });
        let applied = state.finish_action(
            ticket,
            Err(AdminError::Status { status: 500, body: "boom".into() }),
        );
        assert!(!applied);
        assert_eq!(state.items().len(), 2);
        assert_eq!(state.metrics(&descriptor), before.as_slice());
        assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn slow_refresh_cannot_overwrite_a_newer_write() {
        let (_, mut state) = loaded();
        let refresh = state.begin_load();
        let mut created = Record::new();
        created.set("id", "c3");
        let action = state.begin_action(Operation::Create { record: created.clone() });
        assert!(state.finish_action(action, Ok(Change::Created(created))));
        let outcome = state.finish_load(refresh, Ok(sample()));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn refresh_finishing_before_a_create_does_not_duplicate_it() {
        let (descriptor, mut state) = loaded();
        let mut created = Record::new();
        created.set("id", "c3");
        created.set("name", "Vitamin C");
        created.set("status", "active");
        created.set("revenue", 50.0);
        let action = state.begin_action(Operation::Create { record: created.clone() });
        let refresh = state.begin_load();
        let mut server_rows = sample();
        server_rows.push(created.clone());
        assert_eq!(state.finish_load(refresh, Ok(server_rows)), LoadOutcome::Applied);
        assert!(state.finish_action(action, Ok(Change::Created(created))));

        assert_eq!(state.items().len(), 3);
        let shown = state.metrics(&descriptor).to_vec();
        assert_eq!(shown[0].value, 3.0);
        assert_eq!(shown[1].display, "$550.00");
    }

    #[test]
    fn unsynced_writes_apply_locally_with_a_warning() {
        let (descriptor, mut state) = loaded();
        state.open_create(&descriptor);
        let mut created = Record::new();
        created.set("id", "c4");
        let action = state.begin_action(Operation::Create { record: created.clone() });
        let change = Change::Unsynced(Some(Box::new(Change::Created(created))));
        assert!(state.finish_action(action, Ok(change)));
        assert!(state.find("c4").is_some());
        assert!(!state.modal().is_open());
        let notice = state.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Create saved, but the list could not be refreshed");
    }

    #[test]
    fn superseded_loads_are_ignored() {
        let (_, mut state) = loaded();
        let first = state.begin_load();
        let second = state.begin_load();
        assert_eq!(state.finish_load(first, Ok(Vec::new())), LoadOutcome::Stale);
        assert_eq!(state.finish_load(second, Ok(sample())), LoadOutcome::Applied);
        assert_eq!(state.items().len(), 2);
    }

    #[test]
    fn successful_submit_closes_modal() {
        let (descriptor, mut state) = loaded();
        state.open_create(&descriptor);
        state.edit_draft("name", "Summer SPF");
        let mut record = Record::new();
        record.set("id", "c9");
        record.set("name", "Summer SPF");
        let ticket = state.begin_action(Operation::Create { record: record.clone() });
        state.finish_action(ticket, Ok(Change::Created(record)));
        assert!(!state.modal().is_open());
        assert!(state.find("c9").is_some());
    }

    #[test]
    fn results_after_unmount_are_dropped() {
        let descriptor = descriptor();
        let mut state = ScreenState::new(&descriptor);
        let ticket = state.begin_mount().unwrap();
        state.unmount();
        assert_eq!(state.finish_load(ticket, Ok(sample())), LoadOutcome::Stale);
        assert!(state.items().is_empty());
    }
}
