use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::VisibilityState;
use yew::prelude::*;

use super::{controls_panel::ControlsPanel, legend::Legend, time_display::TimeDisplay};
use crate::clock::{Clock, SystemClock};
use crate::fit::{DisplayRefs, fit_fonts};
use crate::format::{current_timestamp, format_duration, format_local};
use crate::model::Stopwatch;
use crate::params::AppConfig;
use crate::state::layout::STARTED_PREFIX;
use crate::state::{FontSizes, KeepAwake, WakeCommand};
use crate::wake_lock::{self, ScreenWakeLock};

/// Everything one redraw shows, read from the stopwatch in a single pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub active: String,
    pub current: String,
    /// `Started: ...` and the wall-clock session duration, once a session exists.
    pub session: Option<(String, String)>,
}

impl Frame {
    pub fn capture<C: Clock>(stopwatch: &Stopwatch<C>, current: String) -> Self {
        let active = format_duration(stopwatch.elapsed_ms() as u64);
        let session = stopwatch
            .session_start_time()
            .zip(stopwatch.session_elapsed_ms())
            .map(|(start, elapsed)| {
                (
                    format!("{}{}", STARTED_PREFIX, format_local(start)),
                    format_duration(elapsed),
                )
            });
        Self {
            active,
            current,
            session,
        }
    }
}

fn refit(refs: &DisplayRefs, fonts: &RefCell<FontSizes>, show_session: bool) {
    let previous = *fonts.borrow();
    let next = fit_fonts(refs, previous, show_session, show_session);
    *fonts.borrow_mut() = next;
}

fn run_wake_command(
    command: Option<WakeCommand>,
    keep_awake: &Rc<RefCell<KeepAwake>>,
    lock: &ScreenWakeLock,
    redraw: &Callback<()>,
) {
    if let Some(command) = command {
        wake_lock::dispatch(command, keep_awake.clone(), lock.clone(), redraw.clone());
    }
}

/// Installs the frame loop plus resize and visibility listeners; returns the
/// teardown. `None` when there is no window or document to attach to.
fn mount(
    stopwatch: Rc<RefCell<Stopwatch>>,
    fonts: Rc<RefCell<FontSizes>>,
    refs: Rc<DisplayRefs>,
    keep_awake: Rc<RefCell<KeepAwake>>,
    lock: ScreenWakeLock,
    redraw: Callback<()>,
) -> Option<Box<dyn FnOnce()>> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // RAF loop
    let raf_id = Rc::new(RefCell::new(None));
    let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    {
        let raf_id_loop = raf_id.clone();
        let closure_cell_loop = closure_cell.clone();
        let window_loop = window.clone();
        let redraw = redraw.clone();
        *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            redraw.emit(());
            if let Some(cb) = closure_cell_loop.borrow().as_ref() {
                if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    *raf_id_loop.borrow_mut() = Some(id);
                }
            }
        }) as Box<dyn FnMut()>));
    }
    if let Some(cb) = closure_cell.borrow().as_ref() {
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            *raf_id.borrow_mut() = Some(id);
        }
    }

    let resize_cb = {
        let redraw = redraw.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            let show_session = stopwatch.borrow().has_started();
            refit(&refs, &fonts, show_session);
            redraw.emit(());
        }) as Box<dyn FnMut(_)>)
    };
    let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());

    // The platform drops wake locks while the page is hidden.
    let visibility_cb = {
        let document = document.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            if document.visibility_state() != VisibilityState::Visible {
                return;
            }
            let command = keep_awake.borrow_mut().on_visible();
            run_wake_command(command, &keep_awake, &lock, &redraw);
        }) as Box<dyn FnMut(_)>)
    };
    let _ = document
        .add_event_listener_with_callback("visibilitychange", visibility_cb.as_ref().unchecked_ref());

    Some(Box::new(move || {
        let _ = window.remove_event_listener_with_callback(
            "resize",
            resize_cb.as_ref().unchecked_ref(),
        );
        let _ = document.remove_event_listener_with_callback(
            "visibilitychange",
            visibility_cb.as_ref().unchecked_ref(),
        );
        if let Some(id) = *raf_id.borrow() {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the closure <-> cell cycle.
        closure_cell.borrow_mut().take();
    }))
}

#[function_component(App)]
pub fn app() -> Html {
    let stopwatch = use_mut_ref(|| {
        let config = AppConfig::from_location();
        Stopwatch::new(SystemClock, config.start_offset_ms)
    });
    let keep_awake = use_mut_ref(|| KeepAwake::new(wake_lock::is_supported()));
    let lock = use_memo((), |_| ScreenWakeLock::default());
    let fonts = use_mut_ref(FontSizes::default);
    let refs = use_memo((), |_| DisplayRefs::default());
    let force = use_force_update();
    let redraw = {
        let force = force.clone();
        Callback::from(move |_: ()| force.force_update())
    };

    {
        let stopwatch = stopwatch.clone();
        let fonts = fonts.clone();
        let refs = refs.clone();
        let keep_awake = keep_awake.clone();
        let lock = (*lock).clone();
        let redraw = redraw.clone();
        use_effect_with((), move |_| {
            if !keep_awake.borrow().is_supported() {
                info!("screen wake lock unsupported, keep-awake disabled");
            }
            let teardown = mount(stopwatch, fonts, refs, keep_awake, lock, redraw);
            move || {
                if let Some(teardown) = teardown {
                    teardown();
                }
            }
        });
    }
    // Rows appear or vanish with the session, so the split changes.
    {
        let fonts = fonts.clone();
        let refs = refs.clone();
        let has_started = stopwatch.borrow().has_started();
        use_effect_with(has_started, move |show_session| {
            refit(&refs, &fonts, *show_session);
            || ()
        });
    }

    let on_toggle = {
        let stopwatch = stopwatch.clone();
        let force = force.clone();
        Callback::from(move |_| {
            stopwatch.borrow_mut().toggle();
            force.force_update();
        })
    };
    let on_reset = {
        let stopwatch = stopwatch.clone();
        let force = force.clone();
        Callback::from(move |_| {
            stopwatch.borrow_mut().reset();
            force.force_update();
        })
    };
    let on_keep_awake = {
        let keep_awake = keep_awake.clone();
        let lock = (*lock).clone();
        let redraw = redraw.clone();
        Callback::from(move |_| {
            let command = keep_awake.borrow_mut().toggle();
            run_wake_command(command, &keep_awake, &lock, &redraw);
            redraw.emit(());
        })
    };

    let (frame, running) = {
        let sw = stopwatch.borrow();
        (Frame::capture(&*sw, current_timestamp()), sw.is_running())
    };
    let sizes = *fonts.borrow();
    let ka = keep_awake.borrow().clone();
    let (started, session) = frame.session.clone().unzip();

    html! {<div class="stopwatch">
        <ControlsPanel
            running={running}
            keep_awake_label={ka.label()}
            keep_awake_active={ka.is_enabled()}
            keep_awake_supported={ka.is_supported()}
            on_toggle={on_toggle}
            on_reset={on_reset}
            on_keep_awake={on_keep_awake}
        />
        <TimeDisplay
            class="current-timestamp-display"
            text={frame.current.clone()}
            font_px={sizes.current_timestamp}
            node_ref={refs.current_timestamp.clone()}
        />
        <TimeDisplay
            class="start-timestamp-display"
            text={started.unwrap_or_else(|| format!("{}--", STARTED_PREFIX))}
            visible={frame.session.is_some()}
            font_px={sizes.start_timestamp}
            node_ref={refs.start_timestamp.clone()}
        />
        <Legend font_px={sizes.legend} node_ref={refs.legend.clone()} />
        <TimeDisplay
            class="stopwatch-duration-display"
            text={frame.active.clone()}
            font_px={sizes.active}
            node_ref={refs.active.clone()}
        />
        <TimeDisplay
            class="session-duration-display"
            text={session.unwrap_or_else(|| "0s".to_string())}
            visible={frame.session.is_some()}
            font_px={sizes.session}
            node_ref={refs.session.clone()}
        />
    </div>}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::DateTime;

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_756_629_028, 0).unwrap())
    }

    #[test]
    fn idle_frame_shows_offset_and_no_session() {
        let sw = Stopwatch::new(clock(), 3_661_000);
        let frame = Frame::capture(&sw, "now".into());
        assert_eq!(frame.active, "1h1m (01:01:01)");
        assert_eq!(frame.current, "now");
        assert_eq!(frame.session, None);
    }

    #[test]
    fn session_duration_keeps_running_while_paused() {
        let clock = clock();
        let mut sw = Stopwatch::new(clock.clone(), 0);
        sw.start();
        clock.advance(5_000);
        sw.stop();
        clock.advance(60_000);
        let frame = Frame::capture(&sw, String::new());
        assert_eq!(frame.active, "5s");
        let (started, session) = frame.session.expect("session started");
        assert!(started.starts_with("Started: "));
        assert_eq!(session, "1m5s");
    }

    #[test]
    fn reset_hides_session_again() {
        let clock = clock();
        let mut sw = Stopwatch::new(clock.clone(), 30_000);
        sw.start();
        clock.advance(1_000);
        sw.reset();
        let frame = Frame::capture(&sw, String::new());
        assert_eq!(frame.active, "30s");
        assert_eq!(frame.session, None);
    }
}
