// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hooks, runtime controls, and option access.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{FakeHost, TestEngine, fire_timers, pointer, pointer_down, single_box, start_kind};
use kurbo::{Rect, Vec2};
use understory_drag::options::{Axis, OptionValue, Options, Revert};
use understory_drag::{
    Control, ControlError, DragContext, Engine, EventKind, EventScope, HookKind, Hooks,
    InputFamily, Phase, PoolConfig, StartRejection,
};

type Log = Rc<RefCell<Vec<HookKind>>>;

fn recording(log: &Log) -> Hooks<u32> {
    let kinds = [
        HookKind::Init,
        HookKind::PointerStart,
        HookKind::DragStart,
        HookKind::Drag,
        HookKind::DragWithFreq,
        HookKind::BeforePointerUp,
        HookKind::AfterPointerUp,
    ];
    kinds.into_iter().fold(Hooks::new(), |hooks, kind| {
        let log = Rc::clone(log);
        hooks.on(kind, move |_| log.borrow_mut().push(kind))
    })
}

fn engine_with_log(options: Options<u32>) -> (TestEngine, u32, Log) {
    let (host, el) = single_box(0.0, 0.0);
    let log = Log::default();
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], options, recording(&log));
    (engine, el, log)
}

fn count(log: &Log, kind: HookKind) -> usize {
    log.borrow().iter().filter(|k| **k == kind).count()
}

#[test]
fn hooks_fire_in_lifecycle_order() {
    let (mut engine, el, log) = engine_with_log(Options::default());
    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    pointer(&mut engine, Phase::Move, 1, (20.0, 10.0), 1.0);
    pointer(&mut engine, Phase::Move, 1, (30.0, 10.0), 2.0);
    pointer(&mut engine, Phase::End, 1, (30.0, 10.0), 3.0);

    assert_eq!(
        *log.borrow(),
        [
            HookKind::Init,
            HookKind::PointerStart,
            HookKind::DragStart,
            HookKind::Drag,
            HookKind::Drag,
            HookKind::BeforePointerUp,
            HookKind::AfterPointerUp,
        ]
    );
}

#[test]
fn click_without_motion_only_reports_the_press() {
    let (mut engine, el, log) = engine_with_log(Options::default());
    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    pointer(&mut engine, Phase::End, 1, (10.0, 10.0), 1.0);
    assert_eq!(*log.borrow(), [HookKind::Init, HookKind::PointerStart]);
    assert_eq!(engine.host().node(el).translation, Vec2::ZERO);
}

#[test]
fn after_pointer_up_waits_for_revert() {
    let (mut engine, el, log) = engine_with_log(Options::default().with_revert(Revert::On));
    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    pointer(&mut engine, Phase::Move, 1, (50.0, 10.0), 1.0);
    pointer(&mut engine, Phase::End, 1, (50.0, 10.0), 2.0);
    assert_eq!(log.borrow().last(), Some(&HookKind::BeforePointerUp));

    fire_timers(&mut engine);
    assert_eq!(log.borrow().last(), Some(&HookKind::AfterPointerUp));
}

#[test]
fn frequency_hook_is_throttled() {
    let (mut engine, el, log) = engine_with_log(Options::default().with_frequency(50.0));
    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    for (i, t) in [10.0, 30.0, 70.0, 100.0, 130.0].into_iter().enumerate() {
        let x = 20.0 + 10.0 * i as f64;
        pointer(&mut engine, Phase::Move, 1, (x, 10.0), t);
    }
    assert_eq!(count(&log, HookKind::Drag), 5);
    assert_eq!(count(&log, HookKind::DragWithFreq), 2);
}

#[test]
fn hooks_see_the_session() {
    let (host, el) = single_box(0.0, 0.0);
    let seen = Rc::new(RefCell::new(None));
    let hooks = Hooks::<u32>::new().on(HookKind::DragStart, {
        let seen = Rc::clone(&seen);
        move |s| *seen.borrow_mut() = s.element()
    });
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), hooks);

    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    pointer(&mut engine, Phase::Move, 1, (20.0, 10.0), 1.0);
    assert_eq!(*seen.borrow(), Some(el));
}

#[test]
fn attach_marks_elements_once() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    assert_eq!(engine.enable_dragging([el], Options::default(), Hooks::new()), 1);
    assert_eq!(engine.enable_dragging([el], Options::default(), Hooks::new()), 0);

    let node = engine.host().node(el);
    assert!(node.touch_action_none);
    assert_eq!(
        node.classes.iter().filter(|c| *c == "mdl-dragger-element").count(),
        1
    );
    assert!(engine.is_attached(el));
    assert!(engine.host().is_listening(EventScope::Element(el), start_kind(InputFamily::Pointer)));
}

#[test]
fn delegators_get_their_own_class() {
    let mut host = FakeHost::new();
    let list = host.add(0, "div.list", Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut engine = Engine::new(host);
    engine.enable_dragging([list], Options::default().with_delegate(".item"), Hooks::new());
    assert!(
        engine
            .host()
            .node(list)
            .classes
            .iter()
            .any(|c| c == "mdl-dragger-delegator")
    );
}

#[test]
fn legacy_input_listens_for_mouse_and_touch() {
    let (mut host, el) = single_box(0.0, 0.0);
    host.caps.pointer_events = false;
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), Hooks::new());
    let scope = EventScope::Element(el);
    assert!(engine.host().is_listening(scope, start_kind(InputFamily::Mouse)));
    assert!(engine.host().is_listening(scope, start_kind(InputFamily::Touch)));
    assert!(!engine.host().is_listening(scope, start_kind(InputFamily::Pointer)));
}

#[test]
fn disable_blocks_new_starts_until_enabled() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), Hooks::new());

    engine.invoke(el, Control::Disable).unwrap();
    let r = pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    assert_eq!(r.rejection, Some(StartRejection::Disabled));

    engine.invoke_named(el, "enable").unwrap();
    assert!(pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 1.0).started);
}

#[test]
fn disable_lets_the_current_drag_finish() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), Hooks::new());

    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    engine.invoke(el, Control::Disable).unwrap();
    pointer(&mut engine, Phase::Move, 1, (40.0, 10.0), 1.0);
    pointer(&mut engine, Phase::End, 1, (40.0, 10.0), 2.0);
    assert_eq!(engine.host().node(el).translation, Vec2::new(30.0, 0.0));
}

#[test]
fn destroy_mid_drag_detaches_everything() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default().with_time_out(1000.0), Hooks::new());

    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    pointer(&mut engine, Phase::Move, 1, (30.0, 10.0), 1.0);
    engine.invoke(el, Control::Destroy).unwrap();

    assert!(!engine.is_attached(el));
    assert!(engine.session(el).is_none());
    assert!(engine.element_state(el).is_none());
    let host = engine.host();
    assert!(host.listeners.is_empty());
    assert!(host.timers.is_empty());
    assert!(!host.frame_requested);
    assert!(!host.node(el).classes.iter().any(|c| c.starts_with("mdl-dragger")));
    assert_eq!(host.node(el).translation, Vec2::new(20.0, 0.0));

    // Late events from the old contact are ignored.
    pointer(&mut engine, Phase::Move, 1, (90.0, 10.0), 2.0);
    assert_eq!(engine.host().node(el).translation, Vec2::new(20.0, 0.0));
    assert_eq!(engine.invoke(el, Control::Enable), Err(ControlError::NotAttached));
}

#[test]
fn destroy_then_reattach() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), Hooks::new());
    engine.invoke_named(el, "destroy").unwrap();
    assert_eq!(engine.enable_dragging([el], Options::default(), Hooks::new()), 1);
    assert!(pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0).started);
}

#[test]
fn unknown_controls_and_targets_are_errors() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    assert_eq!(engine.invoke_named(el, "enable"), Err(ControlError::NotAttached));
    engine.enable_dragging([el], Options::default(), Hooks::new());
    assert_eq!(
        engine.invoke_named(el, "explode"),
        Err(ControlError::UnknownControl("explode".into()))
    );
}

#[test]
fn options_read_and_write_by_name() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default().with_distance(4.0), Hooks::new());

    assert_eq!(engine.option(el, "distance"), Ok(OptionValue::Distance(Some(4.0))));
    engine.set_option(el, "axis", OptionValue::Axis(Axis::X)).unwrap();
    assert_eq!(engine.option(el, "axis"), Ok(OptionValue::Axis(Axis::X)));

    assert_eq!(
        engine.option(el, "colour"),
        Err(ControlError::UnknownOption("colour".into()))
    );
    assert_eq!(
        engine.set_option(el, "axis", OptionValue::Distance(None)),
        Err(ControlError::TypeMismatch { option: "axis" })
    );
    assert_eq!(engine.option(el + 1, "axis"), Err(ControlError::NotAttached));
}

#[test]
fn option_changes_apply_to_the_next_drag() {
    let (host, el) = single_box(0.0, 0.0);
    let mut engine = Engine::new(host);
    engine.enable_dragging([el], Options::default(), Hooks::new());

    pointer_down(&mut engine, el, el, 1, (10.0, 10.0), 0.0);
    engine.set_option(el, "axis", OptionValue::Axis(Axis::X)).unwrap();
    pointer(&mut engine, Phase::Move, 1, (20.0, 20.0), 1.0);
    pointer(&mut engine, Phase::End, 1, (20.0, 20.0), 2.0);
    assert_eq!(engine.host().node(el).translation, Vec2::new(10.0, 10.0));

    pointer_down(&mut engine, el, el, 1, (20.0, 20.0), 3.0);
    pointer(&mut engine, Phase::Move, 1, (30.0, 30.0), 4.0);
    pointer(&mut engine, Phase::End, 1, (30.0, 30.0), 5.0);
    assert_eq!(engine.host().node(el).translation, Vec2::new(20.0, 10.0));
}

#[test]
fn selection_controls() {
    let mut host = FakeHost::new();
    let a = host.add(0, "div.a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = host.add(0, "div.b", Rect::new(20.0, 0.0, 30.0, 10.0));
    let stray = host.add(0, "div.c", Rect::new(40.0, 0.0, 50.0, 10.0));
    let mut engine = Engine::new(host);
    engine.enable_dragging([a], Options::default().with_distance(2.0), Hooks::new());
    engine.enable_dragging([b], Options::default(), Hooks::new());

    let selection = [stray, a, b];
    assert_eq!(
        engine.option_for(&selection, "distance"),
        Ok(OptionValue::Distance(Some(2.0)))
    );
    assert_eq!(
        engine.option_for(&[stray], "distance"),
        Err(ControlError::NotAttached)
    );
    assert_eq!(
        engine.set_option_for(&selection, "distance", &OptionValue::Distance(Some(8.0))),
        Ok(2)
    );
    assert_eq!(engine.option(b, "distance"), Ok(OptionValue::Distance(Some(8.0))));

    assert_eq!(engine.invoke_for(&selection, Control::Disable), 2);
    assert_eq!(
        pointer_down(&mut engine, a, a, 1, (5.0, 5.0), 0.0).rejection,
        Some(StartRejection::Disabled)
    );
    assert_eq!(engine.invoke_for(&selection, Control::Destroy), 2);
    assert!(!engine.is_attached(a) && !engine.is_attached(b));
}

#[test]
fn pool_grows_with_attachments() {
    let mut host = FakeHost::new();
    let items: Vec<u32> = (0..4)
        .map(|i| {
            let x = f64::from(i) * 20.0;
            host.add(0, "div.item", Rect::new(x, 0.0, x + 10.0, 10.0))
        })
        .collect();
    let list = host.add(0, "div.list", Rect::new(0.0, 100.0, 100.0, 200.0));
    let mut engine = Engine::new(host);

    engine.enable_dragging(items.iter().copied(), Options::default(), Hooks::new());
    assert_eq!(engine.pooled_sessions(), 5);
    engine.enable_dragging([list], Options::default().with_delegate(".item"), Hooks::new());
    assert_eq!(engine.pooled_sessions(), 30);
}

#[test]
fn pool_respects_configured_size() {
    let mut host = FakeHost::new();
    let items: Vec<u32> = (0..8)
        .map(|i| {
            let x = f64::from(i) * 20.0;
            host.add(0, "div.item", Rect::new(x, 0.0, x + 10.0, 10.0))
        })
        .collect();
    let ctx = DragContext {
        pool: PoolConfig {
            init_size: Some(3),
            max_size: 0,
            auto_increase: false,
        },
        ..DragContext::default()
    };
    let mut engine = Engine::with_context(host, ctx);

    engine.enable_dragging(items[..4].iter().copied(), Options::default(), Hooks::new());
    assert_eq!(engine.pooled_sessions(), 3);
    engine.enable_dragging(items[4..].iter().copied(), Options::default(), Hooks::new());
    assert_eq!(engine.pooled_sessions(), 3);
    assert_eq!(engine.context().pool.init_size, Some(3));
}

#[test]
fn document_listeners_are_shared_between_sessions() {
    let mut host = FakeHost::new();
    let a = host.add(0, "div.a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = host.add(0, "div.b", Rect::new(20.0, 0.0, 30.0, 10.0));
    let mut engine = Engine::new(host);
    engine.enable_dragging([a, b], Options::default(), Hooks::new());
    let doc_move = EventKind::Input(InputFamily::Pointer, Phase::Move);

    pointer_down(&mut engine, a, a, 1, (5.0, 5.0), 0.0);
    pointer_down(&mut engine, b, b, 2, (25.0, 5.0), 0.0);
    pointer(&mut engine, Phase::End, 1, (5.0, 5.0), 1.0);
    assert!(engine.host().is_listening(EventScope::Document, doc_move));
    pointer(&mut engine, Phase::End, 2, (25.0, 5.0), 1.0);
    assert!(!engine.host().is_listening(EventScope::Document, doc_move));
}
