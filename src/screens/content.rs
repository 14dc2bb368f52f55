use serde_json::json;

use crate::controller::{ActionOutcome, ScreenController};
use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::screen::{Operation, ScreenState};
use crate::services::{rows, FileUpload, Record, ResourceService, UploadReceipt};
use crate::status::{StatusPalette, Tone};

pub fn videos() -> ResourceDescriptor {
    ResourceDescriptor::new("videos", "Videos", "videos")
        .subtitle("Tutorials and product videos")
        .sample(video_rows)
        .refetch()
        .title_field("title")
        .search(&["title", "category", "tags"])
        .palette(StatusPalette::new(&[
            ("published", Tone::Success),
            ("processing", Tone::Info),
            ("draft", Tone::Neutral),
            ("unlisted", Tone::Warning),
        ]))
        .columns(vec![
            Column::text("title", "Title"),
            Column::text("category", "Category"),
            Column::text("duration", "Length"),
            Column::new("views", "Views", ColumnKind::Integer),
            Column::new("watch_time_pct", "Avg watched", ColumnKind::Percent),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::status("published"),
            TabSpec::status("processing"),
            TabSpec::status("draft"),
        ])
        .metrics(vec![
            MetricSpec::new("videos", "Videos", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("views", "Total views", Aggregate::sum("views"), MetricFormat::Compact),
            MetricSpec::new(
                "watch_time",
                "Average watched",
                Aggregate::average("watch_time_pct"),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "published",
                "Published",
                Aggregate::count_where("status", &["published"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("title", "Title", InputKind::Text).required(),
            FieldDescriptor::select("category", "Category", &["tutorial", "product", "routine", "ingredients"])
                .default_value("tutorial"),
            FieldDescriptor::new("description", "Description", InputKind::TextArea),
            FieldDescriptor::select("status", "Status", &["draft", "published", "unlisted", "processing"])
                .default_value("draft"),
        ])
        .toggle(StatusToggle::new("status", "published", "unlisted"))
}

fn video_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "vid-1", "title": "Layering serums the right way", "category": "tutorial", "duration": "6:42", "views": 18400, "watch_time_pct": 64.0, "status": "published", "filename": "1714980000000-layering.mp4", "tags": ["serum", "routine"]}),
        json!({"id": "vid-2", "title": "Retinol 101", "category": "ingredients", "duration": "4:15", "views": 26100, "watch_time_pct": 71.5, "status": "published", "filename": "1714990000000-retinol-101.mp4", "tags": ["retinol"]}),
        json!({"id": "vid-3", "title": "Night routine with Maya", "category": "routine", "duration": "9:03", "views": 0, "watch_time_pct": 0.0, "status": "processing", "filename": "1715300000000-night-routine.mp4"}),
    ])
}

/// Uploads the file, then creates the video record pointing at the stored name.
pub async fn publish_video<S: ResourceService>(
    controller: &ScreenController<S>,
    state: &mut ScreenState,
    upload: FileUpload,
    title: &str,
) -> ActionOutcome {
    if !state.can_act() {
        return ActionOutcome::Blocked;
    }
    let size = upload.bytes.len();
    let receipt = match controller.upload(upload).await {
        Ok(receipt) => receipt,
        Err(error) => {
            state.record_failure("upload", &error);
            return ActionOutcome::Failed;
        }
    };
    controller
        .apply(state, video_record(&receipt, title, size))
        .await
}

/// Create operation for an uploaded file; new videos start out processing.
pub fn video_record(receipt: &UploadReceipt, title: &str, size: usize) -> Operation {
    let mut record = Record::new();
    record.set("title", title);
    record.set("filename", &receipt.filename);
    record.set("size_bytes", size);
    record.set("status", "processing");
    record.set("views", 0);
    Operation::Create { record }
}

pub fn forms() -> ResourceDescriptor {
    ResourceDescriptor::new("forms", "Forms", "forms")
        .subtitle("Sign-up, quiz and feedback forms")
        .mock(form_rows)
        .search(&["name", "kind"])
        .columns(vec![
            Column::text("name", "Form"),
            Column::text("kind", "Type"),
            Column::new("fields_count", "Fields", ColumnKind::Integer),
            Column::new("views", "Views", ColumnKind::Integer),
            Column::new("submissions", "Submissions", ColumnKind::Integer),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("active"), TabSpec::status("draft")])
        .metrics(vec![
            MetricSpec::new("forms", "Forms", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "submissions",
                "Submissions",
                Aggregate::sum("submissions"),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "completion",
                "Completion rate",
                Aggregate::rate("submissions", "views"),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select("kind", "Type", &["signup", "quiz", "survey", "contact"]).required(),
            FieldDescriptor::new("redirect_url", "Redirect after submit", InputKind::Url),
            FieldDescriptor::new("double_opt_in", "Double opt-in", InputKind::Toggle).default_value(false),
        ])
        .toggle(StatusToggle::new("status", "active", "draft"))
}

fn form_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "frm-1", "name": "Newsletter pop-up", "kind": "signup", "fields_count": 2, "views": 15200, "submissions": 1064, "status": "active", "double_opt_in": true}),
        json!({"id": "frm-2", "name": "Skin type quiz", "kind": "quiz", "fields_count": 8, "views": 6400, "submissions": 2176, "status": "active", "double_opt_in": false}),
        json!({"id": "frm-3", "name": "Post-purchase survey", "kind": "survey", "fields_count": 5, "views": 0, "submissions": 0, "status": "draft", "double_opt_in": false}),
    ])
}

pub fn live_chat() -> ResourceDescriptor {
    ResourceDescriptor::new("live-chat", "Live Chat", "chat/sessions")
        .subtitle("Open conversations with shoppers")
        .mock(chat_rows)
        .title_field("visitor.name")
        .search(&["visitor.name", "visitor.email", "topic", "agent"])
        .palette(StatusPalette::lifecycle())
        .columns(vec![
            Column::text("visitor.name", "Visitor"),
            Column::text("topic", "Topic"),
            Column::new("priority", "Priority", ColumnKind::Status),
            Column::text("agent", "Agent"),
            Column::new("messages", "Messages", ColumnKind::Integer),
            Column::text("waiting", "Waiting"),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::status("open"),
            TabSpec::status("waiting"),
            TabSpec::status("closed"),
            TabSpec::field_in("urgent", "Urgent", "priority", &["urgent", "high"]),
        ])
        .metrics(vec![
            MetricSpec::new(
                "open",
                "Open chats",
                Aggregate::count_where("status", &["open", "waiting"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "response",
                "Avg first response (s)",
                Aggregate::average("first_response_secs"),
                MetricFormat::Decimal,
            ),
            MetricSpec::new(
                "satisfaction",
                "Satisfaction",
                Aggregate::average("csat"),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "urgent",
                "Urgent",
                Aggregate::count_where("priority", &["urgent"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("agent", "Assign to", InputKind::Text),
            FieldDescriptor::select("priority", "Priority", &["low", "medium", "high", "urgent"])
                .default_value("medium"),
            FieldDescriptor::new("note", "Internal note", InputKind::TextArea),
        ])
        .toggle(StatusToggle::new("status", "open", "closed"))
}

fn chat_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "cht-1", "visitor": {"name": "Lena Park", "email": "lena.park@example.com"}, "topic": "Where is my order?", "priority": "high", "agent": "Jess", "messages": 7, "waiting": "2m", "first_response_secs": 42, "csat": 92, "status": "open"}),
        json!({"id": "cht-2", "visitor": {"name": "Guest 51f2"}, "topic": "Is the serum safe in pregnancy?", "priority": "urgent", "messages": 2, "waiting": "6m", "first_response_secs": 310, "status": "waiting"}),
        json!({"id": "cht-3", "visitor": {"name": "Marco Bianchi", "email": "marco@example.com"}, "topic": "Failed delivery", "priority": "medium", "agent": "Omar", "messages": 12, "first_response_secs": 58, "csat": 80, "status": "closed"}),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SyncStrategy;
    use crate::services::InMemoryService;

    fn video_controller() -> (InMemoryService, ScreenController<InMemoryService>) {
        let service = InMemoryService::new();
        service.seed("videos", video_rows()).unwrap();
        (service.clone(), ScreenController::new(service, videos()))
    }

    fn clip() -> FileUpload {
        FileUpload {
            filename: "spf tips.mp4".into(),
            content_type: "video/mp4".into(),
            bytes: vec![0, 1, 2, 3],
        }
    }

    #[tokio::test]
    async fn publishing_uploads_then_refetches() {
        let (service, controller) = video_controller();
        assert_eq!(controller.descriptor().sync, SyncStrategy::Refetch);
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let outcome = publish_video(&controller, &mut state, clip(), "SPF tips").await;
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(state.items().len(), 4);
        let created = state
            .items()
            .iter()
            .find(|r| r.text("title").as_deref() == Some("SPF tips"))
            .unwrap();
        assert!(created.text("filename").unwrap().ends_with("spf_tips.mp4"));
        // list, upload, create, list
        assert_eq!(service.request_count(), 4);
    }

    #[tokio::test]
    async fn failed_upload_creates_nothing() {
        let (service, controller) = video_controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        service.fail_resource("upload");
        let outcome = publish_video(&controller, &mut state, clip(), "SPF tips").await;
        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(state.items().len(), 3);
        assert!(state.notice().unwrap().message.starts_with("Failed to upload"));
        assert!(matches!(
            service.list_records("videos").map(|r| r.len()),
            Ok(3)
        ));
    }
}
