//! Named-event subscription over the backend's realtime channel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::format::{self, PLACEHOLDER};
use crate::logging::log_capability_failure;
use crate::services::{AdminError, ServiceResult};

#[cfg(feature = "server")]
pub mod socket;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RealtimeEvent {
    OrderCreated,
    OrderUpdated,
    OrdersCreated,
    OrdersUpdated,
    UserProfileUpdated,
    UsersCreated,
    ProductsCreated,
    ProductsUpdated,
    ProductsDeleted,
    DeliveryStatusUpdated,
}

impl RealtimeEvent {
    pub const ALL: [RealtimeEvent; 10] = [
        RealtimeEvent::OrderCreated,
        RealtimeEvent::OrderUpdated,
        RealtimeEvent::OrdersCreated,
        RealtimeEvent::OrdersUpdated,
        RealtimeEvent::UserProfileUpdated,
        RealtimeEvent::UsersCreated,
        RealtimeEvent::ProductsCreated,
        RealtimeEvent::ProductsUpdated,
        RealtimeEvent::ProductsDeleted,
        RealtimeEvent::DeliveryStatusUpdated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RealtimeEvent::OrderCreated => "order_created",
            RealtimeEvent::OrderUpdated => "order_updated",
            RealtimeEvent::OrdersCreated => "orders_created",
            RealtimeEvent::OrdersUpdated => "orders_updated",
            RealtimeEvent::UserProfileUpdated => "user_profile_updated",
            RealtimeEvent::UsersCreated => "users_created",
            RealtimeEvent::ProductsCreated => "products_created",
            RealtimeEvent::ProductsUpdated => "products_updated",
            RealtimeEvent::ProductsDeleted => "products_deleted",
            RealtimeEvent::DeliveryStatusUpdated => "delivery_status_updated",
        }
    }

    pub fn from_name(name: &str) -> Option<RealtimeEvent> {
        RealtimeEvent::ALL.into_iter().find(|event| event.name() == name)
    }
}

/// Wire shape of one realtime message: `{"event": "...", "data": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl EventFrame {
    pub fn new(event: RealtimeEvent, data: Value) -> Self {
        Self {
            event: event.name().to_string(),
            data,
        }
    }

    pub fn parse(text: &str) -> ServiceResult<Self> {
        serde_json::from_str(text).map_err(|err| AdminError::Decode(err.to_string()))
    }

    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub type HandlerResult = Result<(), String>;
type Handler = Arc<dyn Fn(&Value) -> HandlerResult + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct HandlerId(u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub event: String,
    pub delivered: usize,
    pub failures: Vec<String>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    handlers: Vec<(String, HandlerId, Handler)>,
}

/// Event name to handlers. Handlers for one name run in registration order.
#[derive(Clone, Default)]
pub struct EventHub {
    state: Arc<Mutex<HubState>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
    {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.next_id += 1;
        let id = HandlerId(state.next_id);
        state
            .handlers
            .push((event.to_string(), id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = state.handlers.len();
        state.handlers.retain(|(_, handler_id, _)| *handler_id != id);
        state.handlers.len() != before
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers_for(event).len()
    }

    fn handlers_for(&self, event: &str) -> Vec<Handler> {
        let state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state
            .handlers
            .iter()
            .filter(|(name, _, _)| name == event)
            .map(|(_, _, handler)| handler.clone())
            .collect()
    }

    /// Runs every handler for `event`. A handler that errors or panics is
    /// logged and skipped; the rest still run. Unknown event names are dropped.
    pub fn dispatch(&self, event: &str, data: &Value) -> DispatchReport {
        let mut report = DispatchReport {
            event: event.to_string(),
            ..DispatchReport::default()
        };
        if RealtimeEvent::from_name(event).is_none() {
            tracing::warn!(event, "dropping unknown realtime event");
            return report;
        }
        for handler in self.handlers_for(event) {
            match catch_unwind(AssertUnwindSafe(|| handler(data))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(reason)) => {
                    tracing::warn!(event, %reason, "realtime handler failed");
                    report.failures.push(reason);
                }
                Err(_) => {
                    tracing::warn!(event, "realtime handler panicked");
                    report.failures.push("handler panicked".into());
                }
            }
        }
        report
    }

    pub fn dispatch_frame(&self, frame: &EventFrame) -> DispatchReport {
        self.dispatch(&frame.event, &frame.data)
    }

    /// Parses and dispatches one text message. Malformed frames are dropped.
    pub fn dispatch_text(&self, text: &str) -> Option<DispatchReport> {
        match EventFrame::parse(text) {
            Ok(frame) => Some(self.dispatch_frame(&frame)),
            Err(error) => {
                tracing::warn!(%error, "dropping malformed realtime frame");
                None
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DesktopNotice {
    pub title: String,
    pub body: String,
}

fn field(data: &Value, key: &str) -> String {
    let value = match data.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    };
    format::or_placeholder(value.as_deref())
}

fn first_present(data: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| field(data, key))
        .find(|value| value != PLACEHOLDER)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Notices shown as desktop notifications; other events only feed the activity log.
pub fn notice_for(event: &str, data: &Value) -> Option<DesktopNotice> {
    let notice = match RealtimeEvent::from_name(event)? {
        RealtimeEvent::OrderCreated => DesktopNotice {
            title: "New order".into(),
            body: format!("New order #{}", field(data, "order_number")),
        },
        RealtimeEvent::OrderUpdated => DesktopNotice {
            title: "Order updated".into(),
            body: format!(
                "Order #{} is now {}",
                field(data, "order_number"),
                field(data, "status")
            ),
        },
        RealtimeEvent::DeliveryStatusUpdated => DesktopNotice {
            title: "Delivery update".into(),
            body: format!(
                "Delivery {} is {}",
                first_present(data, &["tracking_number", "order_number"]),
                field(data, "status")
            ),
        },
        RealtimeEvent::UserProfileUpdated => DesktopNotice {
            title: "Profile updated".into(),
            body: format!(
                "{} updated their profile",
                first_present(data, &["name", "email"])
            ),
        },
        _ => return None,
    };
    Some(notice)
}

fn batch_size(data: &Value) -> usize {
    match data {
        Value::Array(items) => items.len(),
        Value::Object(map) => map
            .get("count")
            .and_then(Value::as_u64)
            .map(|count| count as usize)
            .or_else(|| {
                ["items", "ids"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_array).map(Vec::len))
            })
            .unwrap_or(1),
        _ => 1,
    }
}

/// One-line summary for the activity log.
pub fn summary_for(event: &str, data: &Value) -> String {
    if let Some(notice) = notice_for(event, data) {
        return notice.body;
    }
    let count = batch_size(data);
    match RealtimeEvent::from_name(event) {
        Some(RealtimeEvent::OrdersCreated) => format!("{count} orders created"),
        Some(RealtimeEvent::OrdersUpdated) => format!("{count} orders updated"),
        Some(RealtimeEvent::UsersCreated) => format!("{count} customers signed up"),
        Some(RealtimeEvent::ProductsCreated) => format!("{count} products added"),
        Some(RealtimeEvent::ProductsUpdated) => format!("{count} products updated"),
        Some(RealtimeEvent::ProductsDeleted) => format!("{count} products removed"),
        _ => format::title_case(event),
    }
}

/// Desktop notification sink. Failures never reach the caller's data flow.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &DesktopNotice) -> Result<(), String>;
}

/// Writes notices to the log; used where no OS notification API exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &DesktopNotice) -> Result<(), String> {
        tracing::info!(title = %notice.title, body = %notice.body, "notification");
        Ok(())
    }
}

pub const ACTIVITY_LIMIT: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub event: String,
    pub summary: String,
    pub at: DateTime<Utc>,
}

/// Most recent realtime events, newest first.
#[derive(Clone, Default)]
pub struct ActivityFeed {
    entries: Arc<Mutex<VecDeque<ActivityEntry>>>,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: &str, data: &Value) {
        let entry = ActivityEntry {
            event: event.to_string(),
            summary: summary_for(event, data),
            at: Utc::now(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_front(entry);
            entries.truncate(ACTIVITY_LIMIT);
        }
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registers the shell's handlers: every event feeds the activity log and the
/// notice-worthy ones go to `notifier`.
pub fn install_default_handlers(
    hub: &EventHub,
    feed: &ActivityFeed,
    notifier: Arc<dyn Notifier>,
) -> Vec<HandlerId> {
    RealtimeEvent::ALL
        .into_iter()
        .map(|event| {
            let feed = feed.clone();
            let notifier = notifier.clone();
            hub.subscribe(event.name(), move |data| {
                feed.push(event.name(), data);
                if let Some(notice) = notice_for(event.name(), data) {
                    if let Err(reason) = notifier.notify(&notice) {
                        log_capability_failure("notification", &reason);
                    }
                }
                Ok(())
            })
        })
        .collect()
}

/// A live connection that feeds frames into an `EventHub`.
pub trait RealtimeConnection {
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RealtimeTransport {
    type Connection: RealtimeConnection;

    async fn open(&self, url: &str, hub: EventHub) -> ServiceResult<Self::Connection>;
}

/// Owns the single realtime connection of the app.
pub struct RealtimeSubscriber<T: RealtimeTransport> {
    transport: T,
    hub: EventHub,
    url: String,
    connection: Option<T::Connection>,
}

impl<T: RealtimeTransport> RealtimeSubscriber<T> {
    pub fn new(transport: T, hub: EventHub, url: &str) -> Self {
        Self {
            transport,
            hub,
            url: url.to_string(),
            connection: None,
        }
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .map(|connection| connection.is_open())
            .unwrap_or(false)
    }

    /// Opens the channel unless one is already open. Returns whether a new
    /// connection was made.
    pub async fn connect(&mut self) -> ServiceResult<bool> {
        if self.is_connected() {
            return Ok(false);
        }
        let connection = self.transport.open(&self.url, self.hub.clone()).await?;
        Ok(self.attach(connection))
    }

    /// Installs a connection opened elsewhere. A second live connection is
    /// closed straight away so only one ever feeds the hub.
    pub fn attach(&mut self, mut connection: T::Connection) -> bool {
        if self.is_connected() {
            connection.close();
            return false;
        }
        tracing::info!(url = %self.url, "realtime connected");
        self.connection = Some(connection);
        true
    }

    pub fn disconnect(&mut self) -> bool {
        match self.connection.take() {
            Some(mut connection) => {
                connection.close();
                tracing::info!(url = %self.url, "realtime disconnected");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handlers_run_in_registration_order() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = seen.clone();
            hub.subscribe("order_created", move |_| {
                seen.lock().unwrap().push(tag);
                Ok(())
            });
        }
        let report = hub.dispatch("order_created", &json!({}));
        assert_eq!(report.delivered, 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn failing_and_panicking_handlers_are_isolated() {
        let hub = EventHub::new();
        let calls = Arc::new(AtomicUsize::new(0));
        hub.subscribe("products_updated", |_| Err("bad payload".into()));
        hub.subscribe("products_updated", |_| panic!("boom"));
        let counter = calls.clone();
        hub.subscribe("products_updated", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let report = hub.dispatch("products_updated", &json!([]));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_one_handler() {
        let hub = EventHub::new();
        let id = hub.subscribe("users_created", |_| Ok(()));
        hub.subscribe("users_created", |_| Ok(()));
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        assert_eq!(hub.handler_count("users_created"), 1);
    }

    #[test]
    fn order_notice_falls_back_to_placeholder() {
        let notice = notice_for("order_created", &json!({"total": 12})).unwrap();
        assert_eq!(notice.body, "New order #N/A");
        let notice = notice_for("order_created", &json!({"order_number": "LUM-2001"})).unwrap();
        assert_eq!(notice.body, "New order #LUM-2001");
        let notice = notice_for("user_profile_updated", &json!({"email": "a@b.co"})).unwrap();
        assert_eq!(notice.body, "a@b.co updated their profile");
        assert!(notice_for("products_deleted", &json!({})).is_none());
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let hub = EventHub::new();
        hub.subscribe("order_updated", |_| Ok(()));
        assert!(hub.dispatch_text("not json").is_none());
        let report = hub
            .dispatch_text(r#"{"event":"order_updated","data":{"status":"shipped"}}"#)
            .unwrap();
        assert_eq!(report.delivered, 1);
        let frame = EventFrame::parse(r#"{"event":"orders_created"}"#).unwrap();
        assert_eq!(frame.data, Value::Null);
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _: &DesktopNotice) -> Result<(), String> {
            Err("permission denied".into())
        }
    }

    #[test]
    fn notifier_failures_do_not_stop_the_feed() {
        let hub = EventHub::new();
        let feed = ActivityFeed::new();
        install_default_handlers(&hub, &feed, Arc::new(FailingNotifier));
        let report = hub.dispatch("order_created", &json!({"order_number": "LUM-7"}));
        assert!(report.is_clean());
        hub.dispatch("orders_created", &json!([{}, {}, {}]));
        let entries = feed.entries();
        assert_eq!(entries[0].summary, "3 orders created");
        assert_eq!(entries[1].summary, "New order #LUM-7");
    }

    #[test]
    fn unknown_events_reach_no_handler() {
        let hub = EventHub::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        hub.subscribe("coupon_redeemed", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let report = hub.dispatch("coupon_redeemed", &json!({"code": "GLOW10"}));
        assert_eq!(report.delivered, 0);
        assert!(report.is_clean());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn feed_keeps_latest_fifty() {
        let feed = ActivityFeed::new();
        for n in 0..60 {
            feed.push("order_created", &json!({"order_number": n}));
        }
        assert_eq!(feed.len(), ACTIVITY_LIMIT);
        assert_eq!(feed.entries()[0].summary, "New order #59");
    }

    #[derive(Default)]
    struct FakeTransport {
        opened: Arc<AtomicUsize>,
    }

    struct FakeConnection {
        open: bool,
    }

    impl RealtimeConnection for FakeConnection {
        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    #[async_trait]
    impl RealtimeTransport for FakeTransport {
        type Connection = FakeConnection;

        async fn open(&self, _url: &str, _hub: EventHub) -> ServiceResult<FakeConnection> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(FakeConnection { open: true })
        }
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let transport = FakeTransport::default();
        let opened = transport.opened.clone();
        let mut subscriber = RealtimeSubscriber::new(transport, EventHub::new(), "ws://localhost:4000/ws");
        assert!(subscriber.connect().await.unwrap());
        assert!(!subscriber.connect().await.unwrap());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert!(subscriber.disconnect());
        assert!(!subscriber.is_connected());
        assert!(!subscriber.disconnect());
    }

    #[test]
    fn attach_keeps_the_first_live_connection() {
        let mut subscriber =
            RealtimeSubscriber::new(FakeTransport::default(), EventHub::new(), "ws://localhost:4000/ws");
        assert!(subscriber.attach(FakeConnection { open: true }));
        assert!(!subscriber.attach(FakeConnection { open: true }));
        assert!(subscriber.is_connected());
        subscriber.disconnect();
        assert!(subscriber.attach(FakeConnection { open: true }));
    }
}
