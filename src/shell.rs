use serde_json::json;
use std::sync::Arc;

use crate::realtime::{
    install_default_handlers, ActivityFeed, EventHub, Notifier, RealtimeConnection, RealtimeSubscriber,
    RealtimeTransport,
};
use crate::router::{Resolution, RouteTable, LOGIN_PATH};
use crate::screens::{self, ScreenId};
use crate::services::DashboardContext;
use crate::session::{Session, SessionStore};

/// How many activity entries the header shows.
const HEADER_ACTIVITY: usize = 10;

/// Layout frame around the screens: auth boundary, navigation and the
/// realtime subscriber.
pub struct AdminShell<T: RealtimeTransport> {
    routes: RouteTable,
    session: SessionStore,
    realtime: RealtimeSubscriber<T>,
    feed: ActivityFeed,
    current: Resolution,
}

impl<T: RealtimeTransport> AdminShell<T> {
    pub fn new(
        transport: T,
        realtime_url: &str,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let hub = EventHub::new();
        let feed = ActivityFeed::new();
        install_default_handlers(&hub, &feed, notifier);
        Self {
            routes: RouteTable::new(),
            session,
            realtime: RealtimeSubscriber::new(transport, hub, realtime_url),
            feed,
            current: Resolution::Login,
        }
    }

    pub fn hub(&self) -> &EventHub {
        self.realtime.hub()
    }

    pub fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn current(&self) -> &Resolution {
        &self.current
    }

    pub fn is_realtime_connected(&self) -> bool {
        self.realtime.is_connected()
    }

    /// Opens the realtime channel for a signed-in operator. A failed connect
    /// only costs live notices.
    pub async fn start(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }
        if let Err(error) = self.realtime.connect().await {
            tracing::warn!(%error, url = %self.realtime.url(), "realtime unavailable");
        }
    }

    pub fn navigate(&mut self, path: &str) -> Resolution {
        let mut resolution = self.routes.resolve(path, self.session.is_authenticated());
        // follow one redirect so callers always land on something renderable
        if let Resolution::Redirect(target) = &resolution {
            resolution = match self.routes.resolve(target, self.session.is_authenticated()) {
                Resolution::Redirect(_) => Resolution::Login,
                other => other,
            };
        }
        self.current = resolution.clone();
        resolution
    }

    pub async fn sign_in(&mut self, session: Session) -> Resolution {
        self.accept_session(session);
        self.start().await;
        self.navigate("/")
    }

    /// Stores the session without touching the realtime channel; callers that
    /// cannot hold the shell across an await connect through
    /// [`AdminShell::realtime_target`] and [`AdminShell::attach_realtime`].
    pub fn accept_session(&mut self, session: Session) {
        tracing::info!(operator = %session.operator.email, "operator signed in");
        self.session.sign_in(session);
    }

    /// Where and with which hub to connect, or `None` when signed out or
    /// already connected.
    pub fn realtime_target(&self) -> Option<(String, EventHub)> {
        if !self.session.is_authenticated() || self.realtime.is_connected() {
            return None;
        }
        Some((self.realtime.url().to_string(), self.realtime.hub().clone()))
    }

    pub fn attach_realtime(&mut self, connection: T::Connection) -> bool {
        if !self.session.is_authenticated() {
            let mut connection = connection;
            connection.close();
            return false;
        }
        self.realtime.attach(connection)
    }

    pub fn sign_out(&mut self) -> Resolution {
        if let Some(session) = self.session.sign_out() {
            tracing::info!(operator = %session.operator.email, "operator signed out");
        }
        self.realtime.disconnect();
        self.navigate(LOGIN_PATH)
    }

    pub fn render_frame(&self, ctx: &mut DashboardContext) {
        let operator = self.session.current().map(|session| session.operator);
        ctx.operator = operator.as_ref().map(|operator| operator.email.clone());
        ctx.route = match &self.current {
            Resolution::Screen(id) => id.path().to_string(),
            Resolution::Login => LOGIN_PATH.to_string(),
            Resolution::Redirect(target) => target.clone(),
        };
        ctx.context.set(
            "admin_menu",
            json!({
                "sections": screens::sections()
                    .into_iter()
                    .map(|(title, ids)| section_to_json(title, &ids, &self.current))
                    .collect::<Vec<_>>()
            }),
        );
        ctx.context.set("operator", operator);
        ctx.context.set("realtime_connected", self.realtime.is_connected());
        let activity = self
            .feed
            .entries()
            .into_iter()
            .take(HEADER_ACTIVITY)
            .collect::<Vec<_>>();
        ctx.context.set("activity", activity);
    }
}

fn section_to_json(title: &str, ids: &[ScreenId], current: &Resolution) -> serde_json::Value {
    json!({
        "title": title,
        "areas": ids
            .iter()
            .map(|id| {
                json!({
                    "path": id.path(),
                    "title": id.descriptor().title,
                    "active": *current == Resolution::Screen(*id),
                })
            })
            .collect::<Vec<_>>(),
    })
}
