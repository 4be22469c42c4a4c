//! Cross-thread icon updates through the command queue

use status_tray::error::AppError;
use status_tray::tray::host::mocks::MockStatusBarHost;
use status_tray::tray::StatusIconController;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const WORKERS: usize = 8;
const UPDATES_PER_WORKER: usize = 25;

fn icon_name(worker: usize, n: usize) -> String {
    format!("icon_{}_{}.png", worker, n)
}

fn host_with_worker_icons() -> MockStatusBarHost {
    let host = MockStatusBarHost::with_icons(["icon_idle.png"]);
    for worker in 0..WORKERS {
        for n in 0..UPDATES_PER_WORKER {
            host.add_icon(icon_name(worker, n));
        }
    }
    host
}

#[test]
fn test_concurrent_updates_end_with_last_issued() {
    let host = host_with_worker_icons();
    let mut controller =
        StatusIconController::initialize(host.clone(), "icon_idle.png", || {}, || {}).unwrap();
    let item = host.only_item().unwrap();

    // The lock defines issuance order: send and record happen together
    let issued: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let updater = controller.icon_updater().unwrap();
            let issued = Arc::clone(&issued);
            thread::spawn(move || {
                for n in 0..UPDATES_PER_WORKER {
                    let path = PathBuf::from(icon_name(worker, n));
                    let mut log = issued.lock().unwrap();
                    updater.update_icon(path.clone()).unwrap();
                    log.push(path);
                }
            })
        })
        .collect();

    // Drain while producers are still running
    for _ in 0..10 {
        controller.flush_pending().unwrap();
        thread::sleep(Duration::from_millis(1));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    controller.flush_pending().unwrap();

    let issued = issued.lock().unwrap().clone();
    assert_eq!(issued.len(), WORKERS * UPDATES_PER_WORKER);
    assert_eq!(host.applied_icons(), issued);
    assert_eq!(controller.icon_path(), issued.last().unwrap().as_path());
    assert_eq!(host.visible_icon(item).as_ref(), issued.last());
}

#[test]
fn test_ticket_reports_success_and_failure() {
    let host = MockStatusBarHost::with_icons(["icon_idle.png", "icon_busy.png"]);
    let mut controller =
        StatusIconController::initialize(host.clone(), "icon_idle.png", || {}, || {}).unwrap();
    let updater = controller.icon_updater().unwrap();

    let worker = thread::spawn(move || {
        let good = updater.request_icon("icon_busy.png").unwrap();
        let bad = updater.request_icon("broken.png").unwrap();
        (good.wait(), bad.wait())
    });

    // Keep ticking the UI loop until the worker has both answers
    while !worker.is_finished() {
        controller.process_events().unwrap();
        thread::sleep(Duration::from_millis(1));
    }
    let (good, bad) = worker.join().unwrap();

    assert!(good.is_ok());
    assert!(matches!(bad, Err(AppError::IconLoadFailure(_))));
    assert_eq!(controller.icon_path(), std::path::Path::new("icon_busy.png"));
}

#[test]
fn test_teardown_discards_pending_updates() {
    let host = MockStatusBarHost::with_icons(["icon_idle.png", "icon_busy.png"]);
    let mut controller =
        StatusIconController::initialize(host.clone(), "icon_idle.png", || {}, || {}).unwrap();
    let updater = controller.icon_updater().unwrap();

    let ticket = updater.request_icon("icon_busy.png").unwrap();
    updater.update_icon("icon_busy.png").unwrap();
    controller.teardown();

    assert!(ticket.wait().unwrap_err().is_disposed());
    assert!(host.applied_icons().is_empty());
    assert_eq!(host.live_item_count(), 0);

    let from_thread = thread::spawn(move || updater.update_icon("icon_busy.png"))
        .join()
        .unwrap();
    assert!(from_thread.unwrap_err().is_disposed());
}

#[test]
fn test_empty_path_rejected_on_producer_side() {
    let host = MockStatusBarHost::with_icons(["icon_idle.png"]);
    let mut controller =
        StatusIconController::initialize(host.clone(), "icon_idle.png", || {}, || {}).unwrap();
    let updater = controller.icon_updater().unwrap();

    assert!(matches!(
        updater.update_icon(""),
        Err(AppError::IconLoadFailure(_))
    ));
    assert_eq!(controller.flush_pending().unwrap(), 0);
}
