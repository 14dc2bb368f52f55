use lumina_admin::controller::{ActionOutcome, ScreenController};
use lumina_admin::metrics;
use lumina_admin::screen::{LoadOutcome, ModalState, NoticeLevel, ScreenState};
use lumina_admin::screens::{sales, ScreenId};
use lumina_admin::services::{DashboardContext, InMemoryService, ResourceService};

async fn mounted(id: ScreenId) -> (InMemoryService, ScreenController<InMemoryService>, ScreenState) {
    let service = InMemoryService::new_with_sample();
    let controller = ScreenController::new(service.clone(), id.descriptor());
    let mut state = ScreenState::new(controller.descriptor());
    assert_eq!(controller.mount(&mut state).await, Some(LoadOutcome::Applied));
    (service, controller, state)
}

#[tokio::test]
async fn rendered_metrics_match_recomputation_on_every_screen() {
    for id in ScreenId::ALL {
        let (_, controller, mut state) = mounted(id).await;
        let expected = metrics::compute(state.items(), &controller.descriptor().metrics);
        let mut ctx = DashboardContext::default();
        controller.render(&mut state, &mut ctx);
        let rendered = ctx.context.get("metrics").cloned().unwrap_or_default();
        let rendered = rendered.as_array().cloned().unwrap_or_default();
        assert_eq!(rendered.len(), expected.len(), "{}", controller.descriptor().key);
        for (shown, value) in rendered.iter().zip(&expected) {
            assert_eq!(shown["display"], value.display.as_str());
        }
    }
}

#[tokio::test]
async fn cancelling_detail_sends_nothing() {
    let (service, _, mut state) = mounted(ScreenId::Orders).await;
    let before = service.request_count();
    let items = state.items().to_vec();

    assert!(state.open_detail("ord-1002"));
    assert!(state.modal().is_open());
    state.close_modal();

    assert_eq!(*state.modal(), ModalState::Closed);
    assert_eq!(state.items(), items.as_slice());
    assert_eq!(service.request_count(), before);
}

#[tokio::test]
async fn failed_writes_leave_items_and_metrics_alone() {
    let (service, controller, mut state) = mounted(ScreenId::Orders).await;
    let items = state.items().to_vec();
    let metrics_before = state.metrics(controller.descriptor()).to_vec();
    service.fail_resource("orders");

    state.open_create(controller.descriptor());
    state.edit_draft("order_number", "LUM-4000");
    state.edit_draft("customer_email", "mia@example.com");
    state.edit_draft("total", 18.5);
    assert_eq!(controller.submit(&mut state).await, ActionOutcome::Failed);
    assert_eq!(controller.delete(&mut state, "ord-1001").await, ActionOutcome::Failed);

    assert_eq!(state.items(), items.as_slice());
    assert_eq!(state.metrics(controller.descriptor()), metrics_before.as_slice());
    assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Error));
    // the create modal stays open so the operator can retry
    assert!(matches!(state.modal(), ModalState::Create { .. }));
}

#[tokio::test]
async fn tab_switches_are_local() {
    let (service, controller, mut state) = mounted(ScreenId::Orders).await;
    let before = service.request_count();
    assert!(state.select_tab(controller.descriptor(), "shipped"));
    assert_eq!(state.visible_items(controller.descriptor()).len(), 1);
    assert!(state.select_tab(controller.descriptor(), "all"));
    assert_eq!(state.visible_items(controller.descriptor()).len(), 5);
    assert_eq!(service.request_count(), before);
}

#[tokio::test]
async fn empty_collections_render_zeroes() {
    let service = InMemoryService::new();
    for descriptor in lumina_admin::screens::catalog() {
        service.seed(&descriptor.endpoint, Vec::new()).unwrap();
        let controller = ScreenController::new(service.clone(), descriptor);
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        for metric in state.metrics(controller.descriptor()) {
            assert!(metric.value.is_finite(), "{} {}", controller.descriptor().key, metric.key);
            assert_eq!(metric.value, 0.0);
        }
        let mut ctx = DashboardContext::default();
        controller.render(&mut state, &mut ctx);
        assert_eq!(ctx.context.get("rows").cloned(), Some(serde_json::json!([])));
    }
}

#[tokio::test]
async fn stale_refresh_does_not_undo_a_delete() {
    let (service, controller, mut state) = mounted(ScreenId::Orders).await;
    let ticket = state.begin_load();
    let snapshot = service.list("orders").await.unwrap();

    assert_eq!(controller.delete(&mut state, "ord-1005").await, ActionOutcome::Applied);
    assert_eq!(state.finish_load(ticket, Ok(snapshot)), LoadOutcome::Stale);
    assert_eq!(state.items().len(), 4);
    assert!(state.find("ord-1005").is_none());
}

#[tokio::test]
async fn remounting_is_a_no_op() {
    let (service, controller, mut state) = mounted(ScreenId::Customers).await;
    let before = service.request_count();
    assert_eq!(controller.mount(&mut state).await, None);
    assert_eq!(service.request_count(), before);
}

#[tokio::test]
async fn actions_wait_for_the_first_load() {
    let service = InMemoryService::new_with_sample();
    let controller = ScreenController::new(service.clone(), sales::customers());
    let mut state = ScreenState::new(controller.descriptor());
    assert!(!state.can_act());
    assert_eq!(controller.delete(&mut state, "cus-1").await, ActionOutcome::Blocked);
    assert_eq!(service.request_count(), 0);
}
