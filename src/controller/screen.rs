use serde_json::{json, Value};

use crate::descriptor::{validate_draft, FieldErrors, ResourceDescriptor, SyncStrategy};
use crate::logging::log_failure;
use crate::screen::{Change, LoadOutcome, ModalState, Operation, ScreenState};
use crate::services::{
    AdminError, DashboardContext, FileUpload, Record, ResourceService, ServiceResult, UploadReceipt,
};

#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Applied,
    Failed,
    /// Draft failed validation; no request was sent.
    Invalid(FieldErrors),
    /// Actions are disabled until the first load finishes.
    Blocked,
}

/// Drives one descriptor-configured screen against a backend.
pub struct ScreenController<S: ResourceService> {
    service: S,
    descriptor: ResourceDescriptor,
}

impl<S: ResourceService> ScreenController<S> {
    pub fn new(service: S, descriptor: ResourceDescriptor) -> Self {
        Self {
            service,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn fetch(&self) -> ServiceResult<Vec<Record>> {
        let result = self.service.list(&self.descriptor.endpoint).await;
        if let Err(error) = &result {
            log_failure(&self.descriptor.endpoint, "list", error);
        }
        result
    }

    /// Performs the mount-time load; repeated mounts return `None` without a request.
    pub async fn mount(&self, state: &mut ScreenState) -> Option<LoadOutcome> {
        let ticket = state.begin_mount()?;
        let result = self.fetch().await;
        Some(state.finish_load(ticket, result))
    }

    pub async fn refresh(&self, state: &mut ScreenState) -> LoadOutcome {
        let ticket = state.begin_load();
        let result = self.fetch().await;
        state.finish_load(ticket, result)
    }

    /// Turns the open create/edit modal into an operation, or reports field errors.
    pub fn prepare_submit(&self, state: &mut ScreenState) -> Result<Operation, FieldErrors> {
        let (operation, draft) = match state.modal() {
            ModalState::Create { draft, .. } => (
                Operation::Create {
                    record: draft.clone(),
                },
                draft,
            ),
            ModalState::Edit { id, draft, .. } => (
                Operation::Update {
                    id: id.clone(),
                    record: draft.clone(),
                },
                draft,
            ),
            _ => {
                let mut errors = FieldErrors::new();
                errors.insert("form".into(), "Nothing to submit".into());
                return Err(errors);
            }
        };
        let errors = validate_draft(&self.descriptor.fields, draft);
        if errors.is_empty() {
            Ok(operation)
        } else {
            state.set_field_errors(errors.clone());
            Err(errors)
        }
    }

    /// Sends one write and works out how the local list changes.
    pub async fn execute(&self, operation: &Operation) -> ServiceResult<Change> {
        let endpoint = &self.descriptor.endpoint;
        let refetch = self.descriptor.sync == SyncStrategy::Refetch;
        let change = match operation {
            Operation::Create { record } => {
                Some(Change::Created(self.service.create(endpoint, record.clone()).await?))
            }
            Operation::Update { id, record } => {
                Some(Change::Updated(self.service.update(endpoint, id, record.clone()).await?))
            }
            Operation::Patch { id, changes } => {
                Some(Change::Updated(self.service.patch(endpoint, id, changes.clone()).await?))
            }
            Operation::Delete { id } => {
                self.service.delete(endpoint, id).await?;
                Some(Change::Removed(id.clone()))
            }
            Operation::Action { path, body, .. } => {
                let response = self.service.action(path, body.clone()).await?;
                match Record::from_value(response) {
                    Ok(record) if record.id().is_some() => Some(Change::Updated(record)),
                    // the refetch below picks up whatever the action changed
                    _ if refetch => None,
                    _ => {
                        return Err(AdminError::Decode(format!(
                            "{path}: expected the updated record"
                        )))
                    }
                }
            }
        };
        if !refetch {
            return change.ok_or_else(|| AdminError::Internal(format!("{endpoint}: no change")));
        }
        // the write is committed at this point; a failed list must not report it as failed
        match self.service.list(endpoint).await {
            Ok(items) => Ok(Change::Replaced(items)),
            Err(error) => {
                log_failure(endpoint, "list", &error);
                Ok(Change::Unsynced(change.map(Box::new)))
            }
        }
    }

    /// Runs an operation against `state`: failures leave items as they were.
    pub async fn apply(&self, state: &mut ScreenState, operation: Operation) -> ActionOutcome {
        if !state.can_act() {
            return ActionOutcome::Blocked;
        }
        let ticket = state.begin_action(operation);
        let result = self.execute(&ticket.operation).await;
        if let Err(error) = &result {
            log_failure(&self.descriptor.endpoint, ticket.operation.label(), error);
        }
        if state.finish_action(ticket, result) {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Failed
        }
    }

    pub async fn submit(&self, state: &mut ScreenState) -> ActionOutcome {
        if !state.can_act() {
            return ActionOutcome::Blocked;
        }
        match self.prepare_submit(state) {
            Ok(operation) => self.apply(state, operation).await,
            Err(errors) => ActionOutcome::Invalid(errors),
        }
    }

    pub async fn delete(&self, state: &mut ScreenState, id: &str) -> ActionOutcome {
        self.apply(state, Operation::Delete { id: id.to_string() })
            .await
    }

    /// PATCH that flips the descriptor's toggle field on one loaded row.
    pub fn toggle_operation(&self, state: &ScreenState, id: &str) -> ServiceResult<Operation> {
        let toggle = self.descriptor.toggle.as_ref().ok_or_else(|| {
            AdminError::Validation(format!("{} has no status toggle", self.descriptor.title))
        })?;
        let record = state
            .find(id)
            .ok_or_else(|| AdminError::NotFound(id.to_string()))?;
        let mut changes = Record::new();
        changes.set(&toggle.field, toggle.next_value(record));
        Ok(Operation::Patch {
            id: id.to_string(),
            changes,
        })
    }

    pub async fn toggle_status(&self, state: &mut ScreenState, id: &str) -> ActionOutcome {
        match self.toggle_operation(state, id) {
            Ok(operation) => self.apply(state, operation).await,
            Err(error) => {
                state.record_failure("update", &error);
                ActionOutcome::Failed
            }
        }
    }

    pub async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
        let result = self.service.upload(upload).await;
        if let Err(error) = &result {
            log_failure("upload", "upload", error);
        }
        result
    }

    /// Writes the screen's view model into `ctx.context`.
    pub fn render(&self, state: &mut ScreenState, ctx: &mut DashboardContext) {
        let descriptor = &self.descriptor;
        ctx.context.set("title", &descriptor.title);
        ctx.context.set("subtitle", &descriptor.subtitle);
        ctx.context.set("loading", state.is_loading());
        ctx.context.set("phase", state.phase());
        ctx.context.set("can_act", state.can_act());
        ctx.context.set("filter", state.filter());
        ctx.context.set("tabs", state.tab_views(descriptor));
        ctx.context.set("columns", &descriptor.columns);
        ctx.context.set("fields", &descriptor.fields);
        ctx.context.set("has_toggle", descriptor.toggle.is_some());
        let rows = state
            .visible_items(descriptor)
            .into_iter()
            .map(|record| row_to_json(descriptor, record))
            .collect::<Vec<_>>();
        ctx.context.set("rows", rows);
        ctx.context.set("modal", modal_to_json(descriptor, state));
        match state.notice() {
            Some(notice) => ctx.context.set("notice", notice),
            None => ctx.context.remove("notice"),
        }
        let metrics = state.metrics(descriptor).to_vec();
        ctx.context.set("metrics", metrics);
    }
}

fn row_to_json(descriptor: &ResourceDescriptor, record: &Record) -> Value {
    json!({
        "id": record.id(),
        "title": descriptor.record_title(record),
        "tone": descriptor.tone_for(record).css_class(),
        "cells": descriptor
            .columns
            .iter()
            .map(|column| column.render(record))
            .collect::<Vec<_>>(),
    })
}

fn detail_fields(descriptor: &ResourceDescriptor, record: &Record) -> Vec<Value> {
    descriptor
        .detail_pairs(record)
        .into_iter()
        .map(|(label, value)| json!({"label": label, "value": value}))
        .collect()
}

fn modal_to_json(descriptor: &ResourceDescriptor, state: &ScreenState) -> Value {
    match state.modal() {
        ModalState::Closed => Value::Null,
        ModalState::Detail { id } => match state.find(id) {
            Some(record) => json!({
                "kind": "detail",
                "id": id,
                "title": descriptor.record_title(record),
                "fields": detail_fields(descriptor, record),
            }),
            None => Value::Null,
        },
        ModalState::Create { draft, errors } => json!({
            "kind": "create",
            "draft": draft,
            "errors": errors,
        }),
        ModalState::Edit { id, draft, errors } => json!({
            "kind": "edit",
            "id": id,
            "draft": draft,
            "errors": errors,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Column, ColumnKind, FieldDescriptor, InputKind, StatusToggle, TabSpec};
    use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
    use crate::screen::NoticeLevel;
    use crate::services::{rows, InMemoryService};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn campaigns() -> Vec<Record> {
        rows(vec![
            json!({"id": "sms-1", "name": "Retinol launch", "status": "active", "revenue": 1200.0, "api_key": "sk_live_998877"}),
            json!({"id": "sms-2", "name": "Winter hydration", "status": "paused", "revenue": 300.0}),
        ])
    }

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("sms", "SMS Campaigns", "campaigns/sms")
            .columns(vec![
                Column::text("name", "Name"),
                Column::new("revenue", "Revenue", ColumnKind::Currency),
            ])
            .tabs(vec![TabSpec::status("active"), TabSpec::status("paused")])
            .metrics(vec![MetricSpec::new(
                "revenue",
                "Revenue",
                Aggregate::sum("revenue"),
                MetricFormat::Currency,
            )])
            .fields(vec![
                FieldDescriptor::new("name", "Name", InputKind::Text).required(),
                FieldDescriptor::new("api_key", "API key", InputKind::Password).sensitive(),
            ])
            .toggle(StatusToggle::new("status", "active", "paused"))
    }

    fn controller() -> (InMemoryService, ScreenController<InMemoryService>) {
        let service = InMemoryService::new();
        service.seed("campaigns/sms", campaigns()).unwrap();
        (service.clone(), ScreenController::new(service, descriptor()))
    }

    /// Writes go through to the in-memory store; lists can be switched off
    /// and custom actions answer with a bare acknowledgement.
    #[derive(Clone)]
    struct FlakyBackend {
        inner: InMemoryService,
        lists_down: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ResourceService for FlakyBackend {
        async fn list(&self, resource: &str) -> ServiceResult<Vec<Record>> {
            if self.lists_down.load(Ordering::SeqCst) {
                return Err(AdminError::Network("connection reset".into()));
            }
            self.inner.list(resource).await
        }

        async fn create(&self, resource: &str, record: Record) -> ServiceResult<Record> {
            self.inner.create(resource, record).await
        }

        async fn update(&self, resource: &str, id: &str, record: Record) -> ServiceResult<Record> {
            self.inner.update(resource, id, record).await
        }

        async fn patch(&self, resource: &str, id: &str, changes: Record) -> ServiceResult<Record> {
            self.inner.patch(resource, id, changes).await
        }

        async fn delete(&self, resource: &str, id: &str) -> ServiceResult<()> {
            self.inner.delete(resource, id).await
        }

        async fn action(&self, _path: &str, _body: Value) -> ServiceResult<Value> {
            Ok(json!({"status": "queued"}))
        }

        async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
            self.inner.upload(upload).await
        }
    }

    fn flaky(descriptor: ResourceDescriptor) -> (FlakyBackend, ScreenController<FlakyBackend>) {
        let inner = InMemoryService::new();
        inner.seed("campaigns/sms", campaigns()).unwrap();
        let backend = FlakyBackend {
            inner,
            lists_down: Arc::new(AtomicBool::new(false)),
        };
        (backend.clone(), ScreenController::new(backend, descriptor))
    }

    #[tokio::test]
    async fn failed_refetch_after_create_keeps_the_saved_row() {
        let (backend, controller) = flaky(descriptor().refetch());
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        backend.lists_down.store(true, Ordering::SeqCst);

        state.open_create(controller.descriptor());
        state.edit_draft("name", "Summer SPF");
        assert_eq!(controller.submit(&mut state).await, ActionOutcome::Applied);

        assert_eq!(backend.inner.list_records("campaigns/sms").unwrap().len(), 3);
        assert_eq!(state.items().len(), 3);
        assert!(!state.modal().is_open());
        assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[tokio::test]
    async fn refetch_resources_reload_after_bare_action_replies() {
        let (_, controller) = flaky(descriptor().refetch());
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let operation = Operation::Action {
            path: "campaigns/sms/sms-1/boost".into(),
            body: json!({}),
            label: "boost".into(),
        };
        assert_eq!(controller.apply(&mut state, operation).await, ActionOutcome::Applied);
        assert_eq!(state.items().len(), 2);
    }

    #[tokio::test]
    async fn bare_action_reply_on_patch_resource_is_rejected() {
        let (_, controller) = flaky(descriptor());
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let before = state.items().to_vec();
        let operation = Operation::Action {
            path: "campaigns/sms/sms-1/boost".into(),
            body: json!({}),
            label: "boost".into(),
        };
        assert_eq!(controller.apply(&mut state, operation).await, ActionOutcome::Failed);
        assert_eq!(state.items(), before.as_slice());
        assert_eq!(
            state.notice().map(|n| n.message.as_str()),
            Some("Failed to boost: the server sent an unexpected response")
        );
    }

    #[tokio::test]
    async fn mount_loads_once() {
        let (service, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        assert_eq!(controller.mount(&mut state).await, Some(LoadOutcome::Applied));
        assert_eq!(controller.mount(&mut state).await, None);
        assert_eq!(service.request_count(), 1);
        assert_eq!(state.items().len(), 2);
    }

    #[tokio::test]
    async fn actions_are_blocked_before_first_load() {
        let (service, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        let outcome = controller.delete(&mut state, "sms-1").await;
        assert_eq!(outcome, ActionOutcome::Blocked);
        assert_eq!(service.request_count(), 0);
    }

    #[tokio::test]
    async fn invalid_drafts_send_nothing() {
        let (service, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        state.open_create(controller.descriptor());
        let outcome = controller.submit(&mut state).await;
        assert!(matches!(outcome, ActionOutcome::Invalid(ref errors) if errors.contains_key("name")));
        assert_eq!(service.request_count(), 1);
        match state.modal() {
            ModalState::Create { errors, .. } => assert_eq!(errors["name"], "Name is required"),
            other => panic!("unexpected modal {other:?}"),
        }
    }

    #[tokio::test]
    async fn toggle_patches_status() {
        let (_, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let outcome = controller.toggle_status(&mut state, "sms-1").await;
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(state.find("sms-1").and_then(|r| r.status()).as_deref(), Some("paused"));
    }

    #[tokio::test]
    async fn failed_delete_keeps_rows_and_sets_notice() {
        let (service, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        service.fail_resource("campaigns/sms");
        let outcome = controller.delete(&mut state, "sms-2").await;
        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(state.items().len(), 2);
        let notice = state.notice().unwrap();
        assert_eq!(notice.message, "Failed to delete: the server answered 503");
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_items() {
        let (service, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        service.fail_resource("campaigns/sms");
        assert_eq!(controller.refresh(&mut state).await, LoadOutcome::Failed);
        assert_eq!(state.items().len(), 2);
        assert!(state.notice().is_some());
    }

    #[tokio::test]
    async fn render_masks_sensitive_fields() {
        let (_, controller) = controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        state.open_detail("sms-1");
        let mut ctx = DashboardContext::default();
        controller.render(&mut state, &mut ctx);
        let modal = ctx.context.get("modal").unwrap();
        assert_eq!(modal["kind"], "detail");
        assert_eq!(modal["fields"][1]["value"], "••••••••8877");
        let metrics = ctx.context.get("metrics").unwrap();
        assert_eq!(metrics[0]["display"], "$1,500.00");
        assert_eq!(ctx.context.get("rows").unwrap().as_array().unwrap().len(), 2);
    }
}
