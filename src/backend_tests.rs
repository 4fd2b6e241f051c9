//! Backend thread tests against the in-memory room

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::backend::{run_backend, ChatBackend, MemoryBackend, SyncOptions};
use crate::protocol::{BackendAction, GuiEvent};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    action_tx: Sender<BackendAction>,
    event_rx: Receiver<GuiEvent>,
    room: Arc<MemoryBackend>,
    thread: JoinHandle<()>,
}

fn spawn_backend(room: MemoryBackend) -> Harness {
    let room = Arc::new(room);
    let (action_tx, action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = bounded::<GuiEvent>(64);
    let options = SyncOptions {
        poll_interval: Duration::from_millis(20),
        request_timeout: Duration::from_millis(500),
    };
    let backend: Arc<dyn ChatBackend> = room.clone();
    let thread = std::thread::spawn(move || run_backend(action_rx, event_tx, backend, options));
    Harness {
        action_tx,
        event_rx,
        room,
        thread,
    }
}

/// Receive events until one matches, panicking after `WAIT`.
fn wait_for(rx: &Receiver<GuiEvent>, mut pred: impl FnMut(&GuiEvent) -> bool) -> GuiEvent {
    let deadline = Instant::now() + WAIT;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok(event) if pred(&event) => return event,
            Ok(_) => continue,
            Err(e) => panic!("expected event never arrived: {}", e),
        }
    }
}

fn is_non_empty_batch(event: &GuiEvent) -> bool {
    matches!(event, GuiEvent::Batch(b) if !b.is_empty())
}

#[test]
fn test_login_succeeds_for_anonymous_user() {
    let h = spawn_backend(MemoryBackend::new());
    h.action_tx
        .send(BackendAction::Login {
            username: "alice".into(),
            password: String::new(),
        })
        .unwrap();

    match wait_for(&h.event_rx, |_| true) {
        GuiEvent::LoginSucceeded(name) => assert_eq!(name, "alice"),
        other => panic!("Expected LoginSucceeded, got {:?}", other),
    }
    assert!(h.room.is_authenticated());
}

#[test]
fn test_login_refused_with_wrong_password() {
    let h = spawn_backend(MemoryBackend::new().with_account("admin", "hunter2"));
    h.action_tx
        .send(BackendAction::Login {
            username: "admin".into(),
            password: "nope".into(),
        })
        .unwrap();

    match wait_for(&h.event_rx, |_| true) {
        GuiEvent::LoginFailed(reason) => assert_eq!(reason, "Invalid username or password"),
        other => panic!("Expected LoginFailed, got {:?}", other),
    }
    assert!(!h.room.is_authenticated());
}

#[test]
fn test_polling_delivers_backlog_then_empty_batches() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.room.post("bob", "one");
    h.room.post("bob", "two");

    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();

    let GuiEvent::Batch(batch) = wait_for(&h.event_rx, |_| true) else {
        panic!("Expected the first event to be a batch");
    };
    let ids: Vec<&str> = batch.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);

    // Nothing new: the next cycle still reports, with an empty batch
    match wait_for(&h.event_rx, |_| true) {
        GuiEvent::Batch(b) => assert!(b.is_empty()),
        other => panic!("Expected empty Batch, got {:?}", other),
    }

    h.room.post("carol", "three");
    let GuiEvent::Batch(batch) = wait_for(&h.event_rx, is_non_empty_batch) else {
        unreachable!()
    };
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, "3");
}

#[test]
fn test_polling_resumes_from_given_cursor() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.room.post("bob", "old");
    h.room.post("bob", "new");

    h.action_tx
        .send(BackendAction::StartPolling { cursor: "1".into() })
        .unwrap();
    let GuiEvent::Batch(batch) = wait_for(&h.event_rx, is_non_empty_batch) else {
        unreachable!()
    };
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].content, "new");
}

#[test]
fn test_poll_failures_are_reported_and_retried() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.room.post("bob", "hello");
    h.room.fail_next_reads(2);

    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();

    assert!(matches!(wait_for(&h.event_rx, |_| true), GuiEvent::PollFailed(_)));
    assert!(matches!(wait_for(&h.event_rx, |_| true), GuiEvent::PollFailed(_)));
    // The failed cycles did not lose the message
    let GuiEvent::Batch(batch) = wait_for(&h.event_rx, |_| true) else {
        panic!("Expected a batch after recovery");
    };
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_send_result_reported() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.action_tx
        .send(BackendAction::SendMessage("hi there".into()))
        .unwrap();

    match wait_for(&h.event_rx, |e| matches!(e, GuiEvent::SendResult(_))) {
        GuiEvent::SendResult(result) => assert_eq!(result, Ok(())),
        _ => unreachable!(),
    }
    assert_eq!(h.room.message_count(), 1);
}

#[test]
fn test_send_failure_reported() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.room.fail_next_writes(1);
    h.action_tx.send(BackendAction::SendMessage("hi".into())).unwrap();

    match wait_for(&h.event_rx, |e| matches!(e, GuiEvent::SendResult(_))) {
        GuiEvent::SendResult(result) => assert!(result.is_err()),
        _ => unreachable!(),
    }
    assert_eq!(h.room.message_count(), 0);
}

#[test]
fn test_sent_message_arrives_through_polling() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();
    h.action_tx
        .send(BackendAction::SendMessage("[b]mine[/b]".into()))
        .unwrap();

    let GuiEvent::Batch(batch) = wait_for(&h.event_rx, is_non_empty_batch) else {
        unreachable!()
    };
    assert_eq!(batch[0].author, "alice");
    assert_eq!(batch[0].content, "[b]mine[/b]");
}

#[test]
fn test_logout_stops_polling() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();
    wait_for(&h.event_rx, |e| matches!(e, GuiEvent::Batch(_)));

    h.action_tx.send(BackendAction::Logout).unwrap();
    wait_for(&h.event_rx, |e| matches!(e, GuiEvent::LoggedOut));
    assert!(!h.room.is_authenticated());

    // Several poll intervals later nothing else has been produced
    std::thread::sleep(Duration::from_millis(150));
    assert!(h.event_rx.try_recv().is_err());
}

#[test]
fn test_new_login_replaces_poller() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();
    wait_for(&h.event_rx, |e| matches!(e, GuiEvent::Batch(_)));

    h.action_tx
        .send(BackendAction::Login {
            username: "bob".into(),
            password: String::new(),
        })
        .unwrap();
    wait_for(&h.event_rx, |e| matches!(e, GuiEvent::LoginSucceeded(_)));

    // The old poller was stopped before the login answer was sent
    std::thread::sleep(Duration::from_millis(150));
    assert!(h.event_rx.try_recv().is_err());
}

#[test]
fn test_shutdown_exits_thread() {
    let h = spawn_backend(MemoryBackend::new().with_session("alice"));
    h.action_tx
        .send(BackendAction::StartPolling { cursor: "0".into() })
        .unwrap();
    h.action_tx.send(BackendAction::Shutdown).unwrap();
    h.thread.join().unwrap();
}

#[test]
fn test_dropping_sender_exits_thread() {
    let h = spawn_backend(MemoryBackend::new());
    drop(h.action_tx);
    h.thread.join().unwrap();
}
