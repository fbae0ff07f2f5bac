// tests/daemon_runtime.rs

use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

use tokio::sync::mpsc;

use fileknock::config::compile;
use fileknock::engine::{ControlEvent, Daemon, DaemonState, DispatchStats};
use fileknock::errors::FileknockError;
use fileknock::watch::{EventMask, Notification, WatchId};
use fileknock_test_utils::builders::StoreBuilder;
use fileknock_test_utils::fake_executor::RecordingExecutor;
use fileknock_test_utils::fake_source::{FakeSource, FakeSourceHandle};
use fileknock_test_utils::{init_tracing, wait_until, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// A state with one directory watch on `/tmp/watched` carrying both actions.
fn watched_dir_state() -> (DaemonState<FakeSource>, FakeSourceHandle, WatchId) {
    let (source, handle) = FakeSource::new();
    let mut state = DaemonState::new(source);
    let store = StoreBuilder::new()
        .monitor_path("/tmp/watched")
        .closed_exec("/bin/on-close")
        .closed_write_exec("/bin/on-write")
        .build();
    compile(Path::new("/etc/fileknock.d/watched.conf"), &store, &mut state).unwrap();
    let id = state.source.id_of("/tmp/watched").unwrap();
    (state, handle, id)
}

#[tokio::test]
async fn write_close_event_fires_both_actions_with_environment() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let daemon = Daemon::new(state, executor.clone(), ctl_rx);
    let run = tokio::spawn(daemon.run());

    source.push_event(id, EventMask::CLOSE_WRITE, Some("out.log"));
    wait_until(|| executor.fired_count() == 2).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    let fired = executor.fired();
    assert_eq!(fired[0].executable(), Path::new("/bin/on-close"));
    assert_eq!(fired[1].executable(), Path::new("/bin/on-write"));
    for inv in &fired {
        assert_eq!(inv.fk_path(), Path::new("/tmp/watched"));
        assert_eq!(inv.fk_file(), Some(OsStr::new("out.log")));
    }
    assert_eq!(stats.events, 1);
    assert_eq!(stats.actions_fired, 2);
    Ok(())
}

#[tokio::test]
async fn read_only_close_fires_only_the_generic_action() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    source.push_event(id, EventMask::CLOSE_NOWRITE, Some("read.txt"));
    wait_until(|| executor.fired_count() == 1).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    with_timeout(run).await??;

    let fired = executor.fired();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].executable(), Path::new("/bin/on-close"));
    Ok(())
}

#[tokio::test]
async fn whole_batch_is_dispatched_in_one_wake_up() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    source.push(vec![
        Notification::Change(fileknock::watch::ChangeEvent::new(
            id,
            EventMask::CLOSE_NOWRITE,
            Some("a".into()),
        )),
        Notification::Overflow,
        Notification::Change(fileknock::watch::ChangeEvent::new(
            WatchId(404),
            EventMask::CLOSE_WRITE,
            Some("ignored".into()),
        )),
        Notification::Change(fileknock::watch::ChangeEvent::new(
            id,
            EventMask::CLOSE_NOWRITE,
            Some("b".into()),
        )),
    ]);
    wait_until(|| executor.fired_count() == 2).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    let names: Vec<_> = executor
        .fired()
        .iter()
        .map(|inv| inv.fk_file().unwrap().to_os_string())
        .collect();
    assert_eq!(names, vec![OsString::from("a"), OsString::from("b")]);
    assert_eq!(stats.overflows, 1);
    assert_eq!(stats.events, 3);
    Ok(())
}

#[tokio::test]
async fn spawn_failure_does_not_stop_the_daemon() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new().fail_on("/bin/on-close");
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    source.push_event(id, EventMask::CLOSE_WRITE, Some("first"));
    source.push_event(id, EventMask::CLOSE_WRITE, Some("second"));
    wait_until(|| executor.fired_count() == 2).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    assert!(
        executor
            .fired()
            .iter()
            .all(|inv| inv.executable() == Path::new("/bin/on-write"))
    );
    assert_eq!(stats.spawn_failures, 2);
    assert_eq!(stats.actions_fired, 2);
    Ok(())
}

#[tokio::test]
async fn read_failure_is_fatal() -> TestResult {
    init_tracing();
    let (state, source, _id) = watched_dir_state();
    let (_ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, RecordingExecutor::new(), ctl_rx).run());

    source.push_error(io::Error::other("inotify read failed"));
    let result = with_timeout(run).await?;

    match result {
        Err(err @ FileknockError::EventReadError(_)) => assert!(!err.is_recoverable()),
        other => panic!("Expected EventReadError, got: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn shutdown_exits_cleanly_while_idle() -> TestResult {
    init_tracing();
    let (state, _source, _id) = watched_dir_state();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, RecordingExecutor::new(), ctl_rx).run());
    ctl_tx.send(ControlEvent::Shutdown).await?;

    let stats = with_timeout(run).await??;
    assert_eq!(stats, DispatchStats::default());
    Ok(())
}

#[tokio::test]
async fn dropping_every_control_sender_stops_the_loop() -> TestResult {
    init_tracing();
    let (state, _source, _id) = watched_dir_state();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, RecordingExecutor::new(), ctl_rx).run());
    drop(ctl_tx);

    with_timeout(run).await??;
    Ok(())
}

#[tokio::test]
async fn reload_swaps_in_the_new_watch_set() -> TestResult {
    init_tracing();
    let (state, old_source, _old_id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    // The replacement state watches a different directory.
    let (new_source, new_handle) = FakeSource::new();
    let mut replacement = Some(new_source);
    let reload_handle = new_handle.clone();

    let daemon = Daemon::new(state, executor.clone(), ctl_rx).with_reloader(move || {
        let source = replacement.take().expect("reloaded twice");
        let mut state = DaemonState::new(source);
        let store = StoreBuilder::new()
            .monitor_path("/srv/incoming")
            .closed_write_exec("/bin/ingest")
            .build();
        compile(Path::new("/etc/fileknock.d/incoming.conf"), &store, &mut state)?;
        Ok(state)
    });
    let run = tokio::spawn(daemon.run());

    ctl_tx.send(ControlEvent::Reload).await?;
    // Subscribed during the reload, before the swap.
    wait_until(|| reload_handle.requests().len() == 1).await;
    let new_id = WatchId(1);

    // The previous state, and with it the old source, has been dropped.
    assert!(old_source.is_closed());
    new_handle.push_event(new_id, EventMask::CLOSE_WRITE, Some("fresh.csv"));
    wait_until(|| executor.fired_count() == 1).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    let fired = executor.fired();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].executable(), Path::new("/bin/ingest"));
    assert_eq!(fired[0].fk_path(), Path::new("/srv/incoming"));
    assert_eq!(fired[0].fk_file(), Some(OsStr::new("fresh.csv")));
    assert_eq!(stats.reloads, 1);
    Ok(())
}

#[tokio::test]
async fn failed_reload_keeps_the_current_watches() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let daemon = Daemon::new(state, executor.clone(), ctl_rx).with_reloader(|| {
        Err(FileknockError::InitError(io::Error::other("too many inotify instances")))
    });
    let run = tokio::spawn(daemon.run());

    ctl_tx.send(ControlEvent::Reload).await?;
    source.push_event(id, EventMask::CLOSE_NOWRITE, Some("still-watched"));
    wait_until(|| executor.fired_count() == 1).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    assert_eq!(stats.reloads, 0);
    assert_eq!(executor.fired()[0].executable(), Path::new("/bin/on-close"));
    Ok(())
}

#[tokio::test]
async fn reload_without_reloader_is_ignored() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    ctl_tx.send(ControlEvent::Reload).await?;
    source.push_event(id, EventMask::CLOSE_NOWRITE, Some("still-watched"));
    wait_until(|| executor.fired_count() == 1).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    with_timeout(run).await??;
    Ok(())
}

#[tokio::test]
async fn close_of_the_watched_directory_itself_fires_nothing() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    // What listing the directory produces: IS_DIR, no child name.
    source.push_event(id, EventMask::CLOSE_NOWRITE | EventMask::IS_DIR, None);
    source.push_event(id, EventMask::CLOSE_WRITE, Some("marker"));
    wait_until(|| executor.fired_count() >= 2).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    assert_eq!(stats.events, 2);
    assert_eq!(stats.actions_fired, 2);
    for inv in executor.fired() {
        assert_eq!(inv.fk_file(), Some(OsStr::new("marker")));
    }
    Ok(())
}

#[tokio::test]
async fn shutdown_queued_before_start_wins_over_pending_events() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    // A signal that arrived while configuration was still compiling.
    ctl_tx.send(ControlEvent::Shutdown).await?;
    source.push_event(id, EventMask::CLOSE_WRITE, Some("late.log"));

    let stats = with_timeout(Daemon::new(state, executor.clone(), ctl_rx).run()).await?;

    assert_eq!(stats, DispatchStats::default());
    assert_eq!(executor.fired_count(), 0);
    Ok(())
}

#[tokio::test]
async fn removed_watch_is_logged_and_the_loop_continues() -> TestResult {
    init_tracing();
    let (state, source, id) = watched_dir_state();
    let executor = RecordingExecutor::new();
    let (ctl_tx, ctl_rx) = mpsc::channel(4);

    let run = tokio::spawn(Daemon::new(state, executor.clone(), ctl_rx).run());

    source.push(vec![Notification::Removed(WatchId(99))]);
    source.push_event(id, EventMask::CLOSE_NOWRITE, Some("after"));
    wait_until(|| executor.fired_count() == 1).await;

    ctl_tx.send(ControlEvent::Shutdown).await?;
    let stats = with_timeout(run).await??;

    assert_eq!(stats.events, 1);
    Ok(())
}
