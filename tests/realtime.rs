use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lumina_admin::config::ServerConfig;
use lumina_admin::realtime::{
    socket::SocketTransport, DesktopNotice, EventHub, Notifier, RealtimeEvent, RealtimeSubscriber,
};
use lumina_admin::router::Resolution;
use lumina_admin::screens::ScreenId;
use lumina_admin::server::{app, ServerState};
use lumina_admin::services::Record;
use lumina_admin::session::{Operator, Session, SessionStore};
use lumina_admin::shell::AdminShell;

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<DesktopNotice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &DesktopNotice) -> Result<(), String> {
        self.seen
            .lock()
            .map_err(|err| err.to_string())?
            .push(notice.clone());
        Ok(())
    }
}

async fn serve() -> (ServerState, String) {
    let state = ServerState::with_sample(ServerConfig::local("realtime-secret"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (state, format!("ws://{addr}/ws"))
}

async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

fn session() -> Session {
    Session {
        token: "token".into(),
        operator: Operator {
            email: "ops@lumina.shop".into(),
            name: "Ops".into(),
            role: "admin".into(),
        },
        expires_at: None,
    }
}

#[tokio::test]
async fn shell_receives_server_broadcasts() {
    let (state, url) = serve().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut shell = AdminShell::new(SocketTransport, &url, SessionStore::new(), notifier.clone());

    assert_eq!(
        shell.sign_in(session()).await,
        Resolution::Screen(ScreenId::Overview)
    );
    assert!(shell.is_realtime_connected());

    let mut order = Record::new();
    order.set("order_number", "LUM-5000");
    order.set("total", 64.0);
    state.store.insert_record("orders", order.clone()).unwrap();
    state.publish(RealtimeEvent::OrderCreated, order.into_value());
    state.publish(RealtimeEvent::ProductsDeleted, json!({"ids": ["prd-1", "prd-2"]}));

    assert!(eventually(|| shell.feed().len() == 2).await);
    let entries = shell.feed().entries();
    assert_eq!(entries[0].summary, "2 products removed");
    assert_eq!(entries[1].summary, "New order #LUM-5000");

    let seen = notifier.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "New order");

    shell.sign_out();
    assert!(!shell.is_realtime_connected());
}

#[tokio::test]
async fn connect_is_idempotent_against_a_live_server() {
    let (state, url) = serve().await;
    let hub = EventHub::new();
    let mut subscriber = RealtimeSubscriber::new(SocketTransport, hub.clone(), &url);
    assert_eq!(subscriber.connect().await, Ok(true));
    assert_eq!(subscriber.connect().await, Ok(false));
    assert_eq!(state.events.receiver_count(), 1);
    assert!(subscriber.disconnect());
    assert!(!subscriber.disconnect());
}

#[tokio::test]
async fn unreachable_server_keeps_the_shell_usable() {
    let mut shell = AdminShell::new(
        SocketTransport,
        "ws://127.0.0.1:1/ws",
        SessionStore::new(),
        Arc::new(RecordingNotifier::default()),
    );
    shell.sign_in(session()).await;
    assert!(!shell.is_realtime_connected());
    assert_eq!(shell.navigate("/tax-rules"), Resolution::Screen(ScreenId::TaxRules));
}
