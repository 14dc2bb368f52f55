use async_trait::async_trait;
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, Notification, NotificationOptions, NotificationPermission, WebSocket};

use lumina_admin::{
    config::ApiConfig,
    controller::ScreenController,
    descriptor::{FieldDescriptor, InputKind},
    errors,
    logging::log_failure,
    metrics::MetricCache,
    realtime::{DesktopNotice, EventHub, Notifier, RealtimeConnection, RealtimeTransport},
    router::{Resolution, LOGIN_PATH},
    screen::{ModalState, NoticeLevel, Operation, ScreenState},
    screens::{self, content, finance, ScreenId},
    services::{AdminError, DataSource, FileUpload, HttpService, InMemoryService, ServiceResult},
    session::{sign_in_remote, Credentials, Session, SessionStore},
    shell::AdminShell,
};

const SESSION_KEY: &str = "lumina_session";
const HEADER_ACTIVITY: usize = 5;

fn main() {
    launch(App);
}

// ---------- Browser capabilities ----------
fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn page_config() -> ApiConfig {
    let location = window().map(|win| win.location());
    let protocol = location.as_ref().and_then(|l| l.protocol().ok()).unwrap_or_default();
    let hostname = location.as_ref().and_then(|l| l.hostname().ok()).unwrap_or_default();
    ApiConfig::resolve(&protocol, &hostname, ApiConfig::build_time_override())
}

fn current_path() -> String {
    window()
        .and_then(|win| win.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history(path: &str) {
    if current_path() == path {
        return;
    }
    if let Some(history) = window().and_then(|win| win.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

fn save_session(session: &Session) {
    let Ok(raw) = serde_json::to_string(session) else { return };
    if let Some(storage) = window().and_then(|win| win.local_storage().ok().flatten()) {
        let _ = storage.set_item(SESSION_KEY, &raw);
    }
}

fn load_session() -> Option<Session> {
    let raw = window()
        .and_then(|win| win.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(SESSION_KEY).ok().flatten())?;
    serde_json::from_str(&raw).ok()
}

fn clear_session() {
    if let Some(storage) = window().and_then(|win| win.local_storage().ok().flatten()) {
        let _ = storage.remove_item(SESSION_KEY);
    }
}

fn request_notification_permission() {
    if Notification::permission() == NotificationPermission::Default {
        if let Err(err) = Notification::request_permission() {
            lumina_admin::logging::log_capability_failure("notification", &format!("{err:?}"));
        }
    }
}

/// Desktop notifications through the browser Notification API.
struct BrowserNotifier;

impl Notifier for BrowserNotifier {
    fn notify(&self, notice: &DesktopNotice) -> Result<(), String> {
        if Notification::permission() != NotificationPermission::Granted {
            return Err("notification permission not granted".into());
        }
        let options = NotificationOptions::new();
        options.set_body(&notice.body);
        Notification::new_with_options(&notice.title, &options)
            .map(|_| ())
            .map_err(|err| format!("{err:?}"))
    }
}

// ---------- Realtime ----------
struct BrowserConnection {
    socket: WebSocket,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
}

impl RealtimeConnection for BrowserConnection {
    fn close(&mut self) {
        self.socket.set_onmessage(None);
        let _ = self.socket.close();
    }

    fn is_open(&self) -> bool {
        matches!(self.socket.ready_state(), WebSocket::CONNECTING | WebSocket::OPEN)
    }
}

/// Opens a `WebSocket` and feeds text frames into the hub. `tick` bumps on
/// every frame so the header re-renders.
#[derive(Clone, Copy)]
struct BrowserTransport {
    tick: Signal<u64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RealtimeTransport for BrowserTransport {
    type Connection = BrowserConnection;

    async fn open(&self, url: &str, hub: EventHub) -> ServiceResult<BrowserConnection> {
        let socket = WebSocket::new(url)
            .map_err(|err| AdminError::Network(format!("realtime connect to {url}: {err:?}")))?;
        let mut tick = self.tick;
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if let Some(text) = event.data().as_string() {
                hub.dispatch_text(&text);
                *tick.write() += 1;
            }
        });
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        Ok(BrowserConnection {
            socket,
            _on_message: on_message,
        })
    }
}

// ---------- App ----------
type Shell = Rc<RefCell<AdminShell<BrowserTransport>>>;

/// Opens the realtime socket without holding the shell across the await;
/// the borrow is only taken to read the target and to attach.
async fn connect_realtime(shell: Shell, transport: BrowserTransport) {
    let target = shell.borrow().realtime_target();
    let Some((url, hub)) = target else { return };
    match transport.open(&url, hub).await {
        Ok(connection) => {
            shell.borrow_mut().attach_realtime(connection);
        }
        Err(error) => lumina_admin::logging::log_capability_failure("realtime", &error.to_string()),
    }
    let mut tick = transport.tick;
    *tick.write() += 1;
}

#[derive(Clone)]
struct AppContext {
    config: ApiConfig,
    shell: Shell,
    local: InMemoryService,
    http: Signal<HttpService>,
    route: Signal<Resolution>,
    tick: Signal<u64>,
}

impl AppContext {
    fn go(&self, path: &str) {
        let resolution = self.shell.borrow_mut().navigate(path);
        push_history(path_for(&resolution));
        let mut route = self.route;
        route.set(resolution);
    }
}

fn path_for(resolution: &Resolution) -> &str {
    match resolution {
        Resolution::Screen(id) => id.path(),
        Resolution::Login => LOGIN_PATH,
        Resolution::Redirect(target) => target.as_str(),
    }
}

fn App() -> Element {
    let tick = use_signal(|| 0u64);
    let config = use_hook(page_config);
    let shell: Shell = use_hook(|| {
        let session = SessionStore::new();
        if let Some(saved) = load_session() {
            session.sign_in(saved);
        }
        Rc::new(RefCell::new(AdminShell::new(
            BrowserTransport { tick },
            &page_config().realtime_url(),
            session,
            Arc::new(BrowserNotifier),
        )))
    });
    let http = use_signal({
        let shell = shell.clone();
        let config = config.clone();
        move || {
            let service = HttpService::new(config);
            match shell.borrow().session().token() {
                Some(token) => service.with_token(token),
                None => service,
            }
        }
    });
    let route = use_signal({
        let shell = shell.clone();
        move || shell.borrow_mut().navigate(&current_path())
    });
    let local = use_hook(InMemoryService::new_with_sample);

    use_hook({
        let shell = shell.clone();
        move || {
            request_notification_permission();
            spawn(connect_realtime(shell, BrowserTransport { tick }));
        }
    });

    use_context_provider(|| AppContext {
        config: config.clone(),
        shell: shell.clone(),
        local: local.clone(),
        http,
        route,
        tick,
    });

    let current = route.read().clone();
    let body = match current {
        Resolution::Screen(id) => rsx! { Layout { screen: id } },
        Resolution::Login | Resolution::Redirect(_) => rsx! { LoginPage {} },
    };

    rsx! {
        style { {STYLE} }
        {body}
    }
}

#[component]
fn LoginPage() -> Element {
    let ctx = use_context::<AppContext>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut field_errors = use_signal(Vec::<(String, String)>::new);
    let mut failure = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let submit = move |_| {
        let credentials = Credentials::new(&email.read(), &password.read());
        let invalid = credentials.validate();
        field_errors.set(invalid.clone().into_iter().collect());
        if !invalid.is_empty() || *busy.peek() {
            return;
        }
        let ctx = ctx.clone();
        spawn(async move {
            busy.set(true);
            failure.set(None);
            let service = ctx.http.peek().clone();
            match sign_in_remote(&service, &credentials).await {
                Ok(session) => {
                    save_session(&session);
                    let mut http = ctx.http;
                    http.set(service.with_token(session.token.clone()));
                    ctx.shell.borrow_mut().accept_session(session);
                    connect_realtime(ctx.shell.clone(), BrowserTransport { tick: ctx.tick }).await;
                    let resolution = ctx.shell.borrow_mut().navigate("/");
                    push_history(path_for(&resolution));
                    let mut route = ctx.route;
                    route.set(resolution);
                }
                Err(err) => failure.set(Some(errors::user_message("sign in", &err))),
            }
            busy.set(false);
        });
    };

    rsx! {
        div { class: "login",
            form { class: "panel login__card",
                onsubmit: submit,
                prevent_default: "onsubmit",
                div { class: "brand",
                    span { class: "brand__dot" }
                    span { "Lumina Admin" }
                }
                label { "Email" }
                input { r#type: "email", value: "{email}", oninput: move |evt| email.set(evt.value()) }
                label { "Password" }
                input { r#type: "password", value: "{password}", oninput: move |evt| password.set(evt.value()) }
                for (key, message) in field_errors.read().iter().cloned() {
                    div { key: "{key}", class: "field-error", "{message}" }
                }
                if let Some(message) = failure.read().clone() {
                    div { class: "notice notice--error", "{message}" }
                }
                div { class: "actions",
                    button { r#type: "submit", disabled: *busy.read(), if *busy.read() { "Signing in..." } else { "Sign in" } }
                }
            }
        }
    }
}

#[component]
fn Layout(screen: ScreenId) -> Element {
    let ctx = use_context::<AppContext>();
    let _ = ctx.tick.read();
    let (operator, connected, activity) = {
        let shell = ctx.shell.borrow();
        (
            shell.session().current().map(|session| session.operator),
            shell.is_realtime_connected(),
            shell.feed().entries().into_iter().take(HEADER_ACTIVITY).collect::<Vec<_>>(),
        )
    };
    let operator_name = operator.as_ref().map(|o| o.name.clone()).unwrap_or_default();
    let operator_email = operator.map(|o| o.email).unwrap_or_default();
    let sign_out = {
        let ctx = ctx.clone();
        move |_| {
            clear_session();
            let resolution = ctx.shell.borrow_mut().sign_out();
            let mut http = ctx.http;
            http.set(HttpService::new(ctx.config.clone()));
            push_history(path_for(&resolution));
            let mut route = ctx.route;
            route.set(resolution);
        }
    };

    rsx! {
        div { class: "app-shell",
            aside { class: "sidebar",
                div { class: "brand",
                    span { class: "brand__dot" }
                    span { "Lumina" }
                }
                for (title, ids) in screens::sections() {
                    div { key: "{title}", class: "sidebar__section",
                        div { class: "sidebar__title", "{title}" }
                        for id in ids {
                            NavLink { key: "{id.path()}", target: id, active: id == screen }
                        }
                    }
                }
            }
            div { class: "main",
                header { class: "top-nav",
                    div { class: "stack",
                        strong { "{operator_name}" }
                        span { class: "muted", "{operator_email}" }
                    }
                    span { class: if connected { "pill pill--live" } else { "pill" },
                        if connected { "Live" } else { "Offline" }
                    }
                    button { class: "ghost-btn", onclick: sign_out, "Sign out" }
                }
                if !activity.is_empty() {
                    ul { class: "activity",
                        for entry in activity {
                            li { key: "{entry.at}{entry.event}", class: "meta", "{entry.summary}" }
                        }
                    }
                }
                MetricDashboard { key: "{screen.path()}", screen: screen }
            }
        }
    }
}

#[component]
fn NavLink(target: ScreenId, active: bool) -> Element {
    let ctx = use_context::<AppContext>();
    let title = target.descriptor().title;
    rsx! {
        a {
            class: if active { "nav-link active" } else { "nav-link" },
            href: "{target.path()}",
            prevent_default: "onclick",
            onclick: move |_| ctx.go(target.path()),
            "{title}"
        }
    }
}

// ---------- Screens ----------
type Controller = Rc<ScreenController<DataSource>>;

fn spawn_operation(controller: Controller, mut state: Signal<ScreenState>, operation: Operation) {
    if !state.peek().can_act() {
        return;
    }
    spawn(async move {
        let ticket = state.write().begin_action(operation);
        let result = controller.execute(&ticket.operation).await;
        if let Err(error) = &result {
            log_failure(&controller.descriptor().endpoint, ticket.operation.label(), error);
        }
        state.write().finish_action(ticket, result);
    });
}

async fn upload_video(controller: Controller, mut state: Signal<ScreenState>, upload: FileUpload) {
    let title = upload
        .filename
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| upload.filename.clone());
    let size = upload.bytes.len();
    match controller.upload(upload).await {
        Ok(receipt) => {
            spawn_operation(controller, state, content::video_record(&receipt, &title, size));
        }
        Err(error) => state.write().record_failure("upload", &error),
    }
}

#[component]
fn MetricDashboard(screen: ScreenId) -> Element {
    let ctx = use_context::<AppContext>();
    let controller: Controller = use_hook(|| {
        let descriptor = screen.descriptor();
        let remote = ctx.http.peek().clone();
        let source = DataSource::for_screen(&descriptor, Some(&remote), &ctx.local);
        Rc::new(ScreenController::new(source, descriptor))
    });
    let mut state = use_signal(|| ScreenState::new(controller.descriptor()));
    let cache = use_hook(|| Rc::new(RefCell::new(MetricCache::default())));

    use_hook({
        let controller = controller.clone();
        move || {
            spawn(async move {
                let Some(ticket) = state.write().begin_mount() else {
                    return;
                };
                let result = controller.fetch().await;
                state.write().finish_load(ticket, result);
            });
        }
    });

    let descriptor = controller.descriptor();
    let view = state.read();
    let metrics = cache
        .borrow_mut()
        .get_or_compute(view.revision(), view.items(), &descriptor.metrics)
        .to_vec();
    let tabs = view.tab_views(descriptor);
    let rows: Vec<(String, String, String, &'static str, Vec<String>)> = view
        .visible_items(descriptor)
        .into_iter()
        .map(|record| {
            (
                record.id().unwrap_or_default(),
                descriptor.record_title(record),
                record.text(&descriptor.status_field).unwrap_or_default(),
                descriptor.tone_for(record).css_class(),
                descriptor.columns.iter().map(|column| column.render(record)).collect(),
            )
        })
        .collect();
    let notice = view.notice().cloned();
    let modal = view.modal().clone();
    let loading = view.is_loading();
    let can_act = view.can_act();
    let filter = view.filter().to_string();
    drop(view);

    let has_toggle = descriptor.toggle.is_some();
    let has_form = !descriptor.fields.is_empty();
    let columns = descriptor.columns.clone();

    rsx! {
        section { class: "panel",
            div { class: "panel__header",
                div {
                    h2 { "{descriptor.title}" }
                    span { class: "muted", "{descriptor.subtitle}" }
                }
                div { class: "actions",
                    if screen == ScreenId::Videos {
                        input {
                            r#type: "file",
                            accept: "video/*",
                            disabled: !can_act,
                            onchange: {
                                let controller = controller.clone();
                                move |evt: FormEvent| {
                                    let Some(files) = evt.files() else { return };
                                    let controller = controller.clone();
                                    spawn(async move {
                                        for name in files.files() {
                                            if let Some(bytes) = files.read_file(&name).await {
                                                let upload = FileUpload {
                                                    filename: name.clone(),
                                                    content_type: "video/mp4".into(),
                                                    bytes,
                                                };
                                                upload_video(controller.clone(), state, upload).await;
                                            }
                                        }
                                    });
                                }
                            }
                        }
                    }
                    button {
                        class: "ghost-btn",
                        onclick: {
                            let controller = controller.clone();
                            move |_| {
                                let controller = controller.clone();
                                spawn(async move {
                                    let ticket = state.write().begin_load();
                                    let result = controller.fetch().await;
                                    state.write().finish_load(ticket, result);
                                });
                            }
                        },
                        "Refresh"
                    }
                    if has_form {
                        button {
                            disabled: !can_act,
                            onclick: {
                                let controller = controller.clone();
                                move |_| state.write().open_create(controller.descriptor())
                            },
                            "New"
                        }
                    }
                }
            }

            if let Some(notice) = notice {
                div { class: match notice.level {
                        NoticeLevel::Error => "notice notice--error",
                        NoticeLevel::Warning => "notice notice--warning",
                        NoticeLevel::Success => "notice",
                    },
                    span { "{notice.message}" }
                    button { class: "link", onclick: move |_| state.write().dismiss_notice(), "Dismiss" }
                }
            }

            div { class: "stat-row",
                for metric in metrics {
                    div { key: "{metric.key}", class: "stat-box",
                        span { class: "muted", "{metric.label}" }
                        strong { "{metric.display}" }
                    }
                }
            }

            div { class: "toolbar",
                div { class: "tabs",
                    for tab in tabs {
                        button {
                            key: "{tab.key}",
                            class: if tab.active { "tab active" } else { "tab" },
                            onclick: {
                                let controller = controller.clone();
                                let key = tab.key.clone();
                                move |_| {
                                    state.write().select_tab(controller.descriptor(), &key);
                                }
                            },
                            "{tab.label} ({tab.count})"
                        }
                    }
                }
                input {
                    class: "filter",
                    placeholder: "Search",
                    value: "{filter}",
                    oninput: move |evt| state.write().set_filter(&evt.value()),
                }
            }

            if loading {
                div { class: "muted", "Loading..." }
            }

            table { class: "table",
                thead {
                    tr {
                        for column in columns.iter() {
                            th { key: "{column.key}", "{column.label}" }
                        }
                        th { "State" }
                        th { "" }
                    }
                }
                tbody {
                    for (id, title, status, tone, cells) in rows {
                        tr { key: "{id}",
                            for (index, cell) in cells.into_iter().enumerate() {
                                td { key: "{index}", "{cell}" }
                            }
                            td {
                                if !status.is_empty() {
                                    span { class: "{tone}", "{status}" }
                                }
                            }
                            td { class: "row__actions",
                                button { class: "link", title: "{title}", onclick: {
                                    let id = id.clone();
                                    move |_| { state.write().open_detail(&id); }
                                }, "View" }
                                if has_form {
                                    button { class: "link", disabled: !can_act, onclick: {
                                        let id = id.clone();
                                        move |_| { state.write().open_edit(&id); }
                                    }, "Edit" }
                                }
                                if has_toggle {
                                    button { class: "link", disabled: !can_act, onclick: {
                                        let controller = controller.clone();
                                        let id = id.clone();
                                        move |_| {
                                            let prepared = controller.toggle_operation(&state.peek(), &id);
                                            match prepared {
                                                Ok(operation) => spawn_operation(controller.clone(), state, operation),
                                                Err(error) => state.write().record_failure("update", &error),
                                            }
                                        }
                                    }, "Toggle" }
                                }
                                if screen == ScreenId::Transactions {
                                    button { class: "link", disabled: !can_act, onclick: {
                                        let controller = controller.clone();
                                        let id = id.clone();
                                        move |_| spawn_operation(controller.clone(), state, finance::refund_operation(&id, None, ""))
                                    }, "Refund" }
                                }
                                button { class: "link danger", disabled: !can_act, onclick: {
                                    let controller = controller.clone();
                                    let id = id.clone();
                                    move |_| spawn_operation(controller.clone(), state, Operation::Delete { id: id.clone() })
                                }, "Delete" }
                            }
                        }
                    }
                }
            }

            {render_modal(controller.clone(), state, modal)}
        }
    }
}

fn render_modal(controller: Controller, mut state: Signal<ScreenState>, modal: ModalState) -> Element {
    let descriptor = controller.descriptor().clone();
    match modal {
        ModalState::Closed => None,
        ModalState::Detail { id } => {
            let pairs = state
                .peek()
                .find(&id)
                .map(|record| descriptor.detail_pairs(record))
                .unwrap_or_default();
            rsx! {
                div { class: "modal",
                    div { class: "panel modal__card",
                        h3 { "{descriptor.title}" }
                        dl {
                            for (label, value) in pairs {
                                dt { "{label}" }
                                dd { "{value}" }
                            }
                        }
                        div { class: "actions",
                            button { class: "ghost-btn", onclick: move |_| state.write().close_modal(), "Close" }
                        }
                    }
                }
            }
        }
        ModalState::Create { draft, errors } | ModalState::Edit { draft, errors, .. } => {
            let heading = if draft.id().is_some() { "Edit" } else { "New" };
            let inputs: Vec<(String, FieldDescriptor, String, Option<String>)> = descriptor
                .fields
                .iter()
                .map(|field| {
                    (
                        field.key.clone(),
                        field.clone(),
                        draft.text(&field.key).unwrap_or_default(),
                        errors.get(&field.key).cloned(),
                    )
                })
                .collect();
            rsx! {
                div { class: "modal",
                    form { class: "panel modal__card",
                        prevent_default: "onsubmit",
                        onsubmit: move |_| {
                            let prepared = controller.prepare_submit(&mut state.write());
                            if let Ok(operation) = prepared {
                                spawn_operation(controller.clone(), state, operation);
                            }
                        },
                        h3 { "{heading} {descriptor.title}" }
                        for (key, field, value, error) in inputs {
                            FormField { key: "{key}", field: field, value: value, error: error, state: state }
                        }
                        div { class: "actions",
                            button { r#type: "submit", "Save" }
                            button { r#type: "button", class: "ghost-btn", onclick: move |_| state.write().close_modal(), "Cancel" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FormField(
    field: FieldDescriptor,
    value: String,
    #[props(!optional)] error: Option<String>,
    state: Signal<ScreenState>,
) -> Element {
    let mut state = state;
    let key = field.key.clone();
    let numeric = field.input == InputKind::Number;
    let on_input = {
        let key = key.clone();
        move |evt: FormEvent| {
            let raw = evt.value();
            match raw.trim().parse::<f64>() {
                Ok(number) if numeric => state.write().edit_draft(&key, number),
                _ => state.write().edit_draft(&key, raw),
            }
        }
    };
    let control = match &field.input {
        InputKind::TextArea => rsx! { textarea { rows: "3", value: "{value}", oninput: on_input } },
        InputKind::Select { options } => rsx! {
            select { value: "{value}", onchange: on_input,
                for option in options.iter() {
                    option { key: "{option}", value: "{option}", "{option}" }
                }
            }
        },
        InputKind::Toggle => {
            let checked = value == "true";
            rsx! {
                input {
                    r#type: "checkbox",
                    checked: checked,
                    onchange: move |_| state.write().edit_draft(&key, !checked),
                }
            }
        }
        kind => {
            let html_type = match kind {
                InputKind::Email => "email",
                InputKind::Url => "url",
                InputKind::Phone => "tel",
                InputKind::Number => "number",
                InputKind::Password => "password",
                InputKind::Date => "date",
                _ => "text",
            };
            rsx! { input { r#type: html_type, value: "{value}", oninput: on_input } }
        }
    };

    rsx! {
        label {
            "{field.label}"
            if field.required { span { class: "required", " *" } }
        }
        {control}
        if let Some(message) = error {
            div { class: "field-error", "{message}" }
        }
    }
}

const STYLE: &str = r#"
:root { --bg: #faf7f5; --panel: #ffffff; --muted: #7a6f6a; --text: #2b2421; --accent: #c7826b; --accent2: #8e6bbf; --border: rgba(43,36,33,0.1); --radius: 14px; }
* { box-sizing: border-box; }
body { margin: 0; background: var(--bg); color: var(--text); font-family: "Inter", system-ui, -apple-system, sans-serif; }
a { color: inherit; text-decoration: none; }
.app-shell { display: grid; grid-template-columns: 240px 1fr; min-height: 100vh; }
.sidebar { border-right: 1px solid var(--border); padding: 18px 12px; display: flex; flex-direction: column; gap: 14px; background: var(--panel); }
.sidebar__title { font-size: 12px; text-transform: uppercase; letter-spacing: 0.6px; color: var(--muted); margin: 6px 8px; }
.main { padding: 18px 24px 36px; display: flex; flex-direction: column; gap: 14px; }
.top-nav { display: flex; align-items: center; justify-content: space-between; gap: 12px; padding: 10px 14px; border: 1px solid var(--border); background: var(--panel); border-radius: var(--radius); }
.brand { display: flex; align-items: center; gap: 10px; font-weight: 800; letter-spacing: 0.4px; }
.brand__dot { width: 10px; height: 10px; border-radius: 50%; background: var(--accent); }
.nav-link { display: block; padding: 7px 10px; border-radius: 10px; color: var(--text); cursor: pointer; }
.nav-link.active { background: linear-gradient(120deg, var(--accent), var(--accent2)); color: #fff; }
.pill { display: inline-block; padding: 4px 10px; border-radius: 999px; background: rgba(0,0,0,0.06); font-weight: 700; font-size: 12px; text-transform: uppercase; }
.pill--live { background: rgba(46,160,67,0.15); color: #2e7d32; }
.activity { list-style: none; margin: 0; padding: 0 4px; display: flex; gap: 16px; flex-wrap: wrap; }
.panel { background: var(--panel); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; box-shadow: 0 8px 24px rgba(0,0,0,0.04); }
.panel h2, .panel h3 { margin: 0 0 6px; }
.panel__header { display: flex; align-items: flex-start; justify-content: space-between; gap: 10px; }
.muted, .meta { color: var(--muted); font-size: 13px; }
.stack { display: flex; flex-direction: column; gap: 2px; }
.stat-row { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 10px; margin: 14px 0; }
.stat-box { border: 1px solid var(--border); border-radius: 12px; padding: 12px; display: flex; flex-direction: column; gap: 4px; }
.stat-box strong { font-size: 22px; }
.toolbar { display: flex; justify-content: space-between; gap: 12px; align-items: center; flex-wrap: wrap; }
.tabs { display: flex; gap: 6px; flex-wrap: wrap; }
.tab { background: transparent; color: var(--text); border: 1px solid var(--border); font-weight: 600; }
.tab.active { background: var(--text); color: #fff; }
.filter { max-width: 260px; }
.table { width: 100%; border-collapse: collapse; margin-top: 12px; }
.table th, .table td { text-align: left; padding: 9px 8px; border-bottom: 1px solid var(--border); font-size: 14px; }
.badge { display: inline-block; padding: 3px 9px; border-radius: 999px; background: rgba(0,0,0,0.06); font-size: 12px; font-weight: 700; }
.badge--success { background: rgba(46,160,67,0.15); color: #2e7d32; }
.badge--warning { background: rgba(237,108,2,0.15); color: #b45309; }
.badge--danger { background: rgba(211,47,47,0.15); color: #b71c1c; }
.badge--info { background: rgba(2,136,209,0.15); color: #01579b; }
.badge--accent { background: rgba(142,107,191,0.15); color: #5e3f91; }
.row__actions { white-space: nowrap; }
.notice { margin-top: 12px; padding: 10px 12px; border-radius: 10px; background: rgba(46,160,67,0.1); display: flex; justify-content: space-between; gap: 10px; }
.notice--error { background: rgba(211,47,47,0.1); color: #b71c1c; }
.notice--warning { background: rgba(237,108,2,0.12); color: #b45309; }
.field-error { color: #b71c1c; font-size: 13px; margin-top: 4px; }
.required { color: #b71c1c; }
.modal { position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; padding: 20px; }
.modal__card { width: min(560px, 100%); max-height: 90vh; overflow: auto; }
.modal dl { display: grid; grid-template-columns: 160px 1fr; gap: 6px 12px; }
.modal dt { color: var(--muted); }
.modal dd { margin: 0; }
.login { min-height: 100vh; display: flex; align-items: center; justify-content: center; }
.login__card { width: min(380px, 100%); display: flex; flex-direction: column; gap: 4px; }
label { display: block; margin-top: 8px; font-weight: 700; }
input, textarea, select { width: 100%; margin-top: 6px; padding: 9px 11px; border-radius: 10px; border: 1px solid var(--border); background: #fff; color: var(--text); }
input[type=checkbox] { width: auto; }
.actions { display: flex; gap: 8px; flex-wrap: wrap; margin-top: 12px; align-items: center; }
button { padding: 9px 14px; border: none; border-radius: 10px; background: linear-gradient(120deg, var(--accent), var(--accent2)); color: #fff; font-weight: 700; cursor: pointer; }
button:disabled { opacity: 0.5; cursor: not-allowed; }
.ghost-btn { background: transparent; color: var(--text); border: 1px solid var(--border); }
.link { background: none; color: var(--accent2); padding: 4px 6px; font-weight: 600; }
.link.danger { color: #d32f2f; }
@media (max-width: 900px) { .app-shell { grid-template-columns: 1fr; } .sidebar { border-right: none; border-bottom: 1px solid var(--border); } }
"#;
