use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

use lumina_admin::{
    config::{ApiConfig, API_URL_VAR},
    controller::ScreenController,
    logging::init_tracing,
    realtime::{socket::SocketTransport, LogNotifier},
    screen::ScreenState,
    screens::ScreenId,
    services::{DashboardContext, DataSource, HttpService, InMemoryService},
    session::{Operator, Session, SessionStore},
    shell::AdminShell,
};

/// Walks every screen once against the configured backend and prints what
/// each one would render.
#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let local = InMemoryService::new_with_sample();
    let remote = env::var(API_URL_VAR)
        .ok()
        .map(|_| HttpService::new(ApiConfig::from_env()));
    let config = remote
        .as_ref()
        .map(|service| service.config().clone())
        .unwrap_or_default();

    let mut shell = AdminShell::new(
        SocketTransport,
        &config.realtime_url(),
        SessionStore::new(),
        Arc::new(LogNotifier),
    );
    shell
        .sign_in(Session {
            token: String::new(),
            operator: Operator {
                email: "ops@lumina.shop".into(),
                name: "Ops".into(),
                role: "admin".into(),
            },
            expires_at: None,
        })
        .await;

    for id in ScreenId::ALL {
        shell.navigate(id.path());
        let descriptor = id.descriptor();
        let source = DataSource::for_screen(&descriptor, remote.as_ref(), &local);
        let controller = ScreenController::new(source, descriptor);
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;

        let mut ctx = DashboardContext::default();
        shell.render_frame(&mut ctx);
        controller.render(&mut state, &mut ctx);

        println!(
            "{:<22} {:>3} rows  {}",
            controller.descriptor().title,
            state.items().len(),
            id.path()
        );
        if let Some(notice) = state.notice() {
            println!("    ! {}", notice.message);
        }
        for metric in state.metrics(controller.descriptor()) {
            println!("    {:<24} {}", metric.label, metric.display);
        }
    }

    shell.sign_out();
}
