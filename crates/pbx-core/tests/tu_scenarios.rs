mod common;

use std::sync::Arc;

use common::mock_sink::MockSink;
use pbx_core::{Pbx, PbxError, Tu, TuState};

fn new_tu(pbx: &Arc<Pbx<MockSink>>) -> (Arc<Tu<MockSink>>, MockSink, i32) {
    let sink = MockSink::new();
    let tu = Tu::new(sink.clone(), sink.clone());
    let ext = pbx.register(&tu).expect("register should succeed");
    (tu, sink, ext)
}

#[test]
fn s1_self_dial_is_busy() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, a_ext) = new_tu(&pbx);

    assert_eq!(a_sink.take_lines(), vec![format!("ON HOOK {a_ext}")]);

    a.pickup();
    assert_eq!(a_sink.take_lines(), vec!["DIAL TONE"]);

    pbx.dial(&a, a_ext);
    assert_eq!(a_sink.take_lines(), vec!["BUSY SIGNAL"]);

    a.hangup();
    assert_eq!(a_sink.take_lines(), vec![format!("ON HOOK {a_ext}")]);
}

#[test]
fn s2_successful_call_and_chat() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, a_ext) = new_tu(&pbx);
    let (b, b_sink, b_ext) = new_tu(&pbx);
    a_sink.take_lines();
    b_sink.take_lines();

    a.pickup();
    assert_eq!(a_sink.take_lines(), vec!["DIAL TONE"]);

    pbx.dial(&a, b_ext);
    assert_eq!(a_sink.take_lines(), vec!["RING BACK"]);
    assert_eq!(b_sink.take_lines(), vec!["RINGING"]);

    b.pickup();
    assert_eq!(b_sink.take_lines(), vec![format!("CONNECTED {a_ext}")]);
    assert_eq!(a_sink.take_lines(), vec![format!("CONNECTED {b_ext}")]);

    a.chat("hello");
    assert_eq!(a_sink.take_lines(), vec![format!("CONNECTED {b_ext}")]);
    assert_eq!(b_sink.take_lines(), vec!["CHAT hello"]);

    b.hangup();
    assert_eq!(b_sink.take_lines(), vec![format!("ON HOOK {b_ext}")]);
    assert_eq!(a_sink.take_lines(), vec!["DIAL TONE"]);

    a.hangup();
    assert_eq!(a_sink.take_lines(), vec![format!("ON HOOK {a_ext}")]);
}

#[test]
fn s3_dial_unknown_extension_errors() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, a_ext) = new_tu(&pbx);
    a_sink.take_lines();

    a.pickup();
    assert_eq!(a_sink.take_lines(), vec!["DIAL TONE"]);

    pbx.dial(&a, 99);
    assert_eq!(a_sink.take_lines(), vec!["ERROR"]);

    a.hangup();
    assert_eq!(a_sink.take_lines(), vec![format!("ON HOOK {a_ext}")]);
}

#[test]
fn s4_dial_busy_callee_leaves_third_party_untouched() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, _a_ext) = new_tu(&pbx);
    let (b, b_sink, b_ext) = new_tu(&pbx);
    let (c, c_sink, c_ext) = new_tu(&pbx);
    a_sink.take_lines();
    b_sink.take_lines();
    c_sink.take_lines();

    b.pickup();
    pbx.dial(&b, c_ext);
    c.pickup();
    b_sink.take_lines();
    c_sink.take_lines();
    assert_eq!(b.state(), TuState::Connected);
    assert_eq!(c.state(), TuState::Connected);

    a.pickup();
    assert_eq!(a_sink.take_lines(), vec!["DIAL TONE"]);
    pbx.dial(&a, b_ext);
    assert_eq!(a_sink.take_lines(), vec!["BUSY SIGNAL"]);

    assert!(b_sink.take_lines().is_empty());
    assert!(c_sink.take_lines().is_empty());
    assert_eq!(b.state(), TuState::Connected);
    assert_eq!(c.state(), TuState::Connected);
}

#[test]
fn s5_caller_hangs_up_while_ringing() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, a_ext) = new_tu(&pbx);
    let (b, b_sink, b_ext) = new_tu(&pbx);
    a_sink.take_lines();
    b_sink.take_lines();

    a.pickup();
    pbx.dial(&a, b_ext);
    assert_eq!(a_sink.take_lines(), vec!["RING BACK"]);
    assert_eq!(b_sink.take_lines(), vec!["RINGING"]);

    a.hangup();
    assert_eq!(a_sink.take_lines(), vec![format!("ON HOOK {a_ext}")]);
    assert_eq!(b_sink.take_lines(), vec![format!("ON HOOK {b_ext}")]);
    assert_eq!(a.state(), TuState::OnHook);
    assert_eq!(b.state(), TuState::OnHook);
}

#[test]
fn registry_rejects_duplicate_extension_table_overflow() {
    let pbx = Pbx::with_capacity(1);
    let (_first, _sink, _ext) = new_tu(&pbx);

    let overflow_sink = MockSink::new();
    let overflow_tu = Tu::new(overflow_sink.clone(), overflow_sink);
    assert_eq!(
        pbx.register(&overflow_tu),
        Err(PbxError::NoFreeExtension)
    );
}

#[test]
fn unregister_hangs_up_in_progress_call() {
    let pbx = Pbx::with_capacity(16);
    let (a, a_sink, a_ext) = new_tu(&pbx);
    let (b, b_sink, b_ext) = new_tu(&pbx);
    a_sink.take_lines();
    b_sink.take_lines();

    a.pickup();
    pbx.dial(&a, b_ext);
    b.pickup();
    a_sink.take_lines();
    b_sink.take_lines();
    assert_eq!(a.state(), TuState::Connected);

    pbx.unregister(&a).expect("unregister should succeed");
    assert_eq!(b_sink.take_lines(), vec!["DIAL TONE"]);
    assert_eq!(b.state(), TuState::DialTone);
    assert_eq!(pbx.active_count(), 1);

    assert_eq!(pbx.unregister(&a), Err(PbxError::NotRegistered));
    let _ = a_ext;
}

#[test]
fn shutdown_blocks_until_last_tu_unregisters() {
    let pbx = Pbx::with_capacity(16);
    let (a, _a_sink, _) = new_tu(&pbx);
    assert_eq!(pbx.active_count(), 1);

    let pbx_for_unregister = Arc::clone(&pbx);
    let unregister_thread = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        pbx_for_unregister.unregister(&a).unwrap();
    });

    pbx.shutdown();
    assert_eq!(pbx.active_count(), 0);
    unregister_thread.join().unwrap();
}
