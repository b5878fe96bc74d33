//! Screen Wake Lock (`navigator.wakeLock`) binding.
//!
//! The API is reached through `js_sys::Reflect` rather than the typed
//! `web_sys::WakeLock` bindings, which are gated behind `web_sys_unstable_apis`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect};
use thiserror::Error;
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use yew::Callback;

use crate::state::{KeepAwake, WakeCommand};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WakeLockError {
    #[error("screen wake lock is not supported")]
    Unsupported,
    #[error("no browser window")]
    NoWindow,
    #[error("wake lock request rejected: {0}")]
    Request(String),
    #[error("wake lock release failed: {0}")]
    Release(String),
}

fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn wake_lock_object() -> Result<JsValue, WakeLockError> {
    let navigator = web_sys::window().ok_or(WakeLockError::NoWindow)?.navigator();
    match Reflect::get(&navigator, &JsValue::from_str("wakeLock")) {
        Ok(v) if !v.is_undefined() && !v.is_null() => Ok(v),
        _ => Err(WakeLockError::Unsupported),
    }
}

/// `"wakeLock" in navigator`.
pub fn is_supported() -> bool {
    web_sys::window()
        .map(|w| Reflect::has(&w.navigator(), &JsValue::from_str("wakeLock")).unwrap_or(false))
        .unwrap_or(false)
}

async fn call_async(target: &JsValue, method: &str, arg: Option<&str>) -> Result<JsValue, JsValue> {
    let func: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    let ret = match arg {
        Some(a) => func.call1(target, &JsValue::from_str(a))?,
        None => func.call0(target)?,
    };
    JsFuture::from(Promise::resolve(&ret)).await
}

/// Holds at most one `WakeLockSentinel`. Clones share it.
#[derive(Clone, Default)]
pub struct ScreenWakeLock {
    sentinel: Rc<RefCell<Option<JsValue>>>,
}

impl ScreenWakeLock {
    pub fn is_held(&self) -> bool {
        self.sentinel.borrow().is_some()
    }

    /// Requests a `"screen"` lock. `on_release` fires if the platform revokes
    /// it (e.g. the tab goes to the background) or it is released normally.
    pub async fn acquire(&self, on_release: Callback<()>) -> Result<(), WakeLockError> {
        if self.is_held() {
            return Ok(());
        }
        let api = wake_lock_object()?;
        let sentinel = call_async(&api, "request", Some("screen"))
            .await
            .map_err(|e| WakeLockError::Request(js_message(&e)))?;

        let listener = {
            let slot = self.sentinel.clone();
            let this = sentinel.clone();
            Closure::once_into_js(move || {
                let mut current = slot.borrow_mut();
                // A stale sentinel must not clear a newer one.
                if current.as_ref().is_some_and(|c| js_sys::Object::is(c, &this)) {
                    *current = None;
                    drop(current);
                    on_release.emit(());
                }
            })
        };
        if let Some(target) = sentinel.dyn_ref::<web_sys::EventTarget>() {
            let _ = target.add_event_listener_with_callback("release", listener.unchecked_ref());
        }
        *self.sentinel.borrow_mut() = Some(sentinel);
        Ok(())
    }

    pub async fn release(&self) -> Result<(), WakeLockError> {
        let Some(sentinel) = self.sentinel.borrow_mut().take() else {
            return Ok(());
        };
        call_async(&sentinel, "release", None)
            .await
            .map(|_| ())
            .map_err(|e| WakeLockError::Release(js_message(&e)))
    }
}

/// Runs a keep-awake command against the browser and feeds the outcome back
/// into `state`. `redraw` is emitted once the state has settled.
pub fn dispatch(
    command: WakeCommand,
    state: Rc<RefCell<KeepAwake>>,
    lock: ScreenWakeLock,
    redraw: Callback<()>,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let mut next = Some(command);
        while let Some(command) = next.take() {
            next = match command {
                WakeCommand::Acquire => acquire(&lock, &state, &redraw).await,
                WakeCommand::Release => release(&lock, &state).await,
            };
        }
        redraw.emit(());
    });
}

async fn acquire(
    lock: &ScreenWakeLock,
    state: &Rc<RefCell<KeepAwake>>,
    redraw: &Callback<()>,
) -> Option<WakeCommand> {
    let on_release = {
        let state = state.clone();
        let lock = lock.clone();
        let redraw = redraw.clone();
        Callback::from(move |_| {
            debug!("wake lock released");
            let follow_up = state.borrow_mut().on_released();
            if let Some(command) = follow_up {
                dispatch(command, state.clone(), lock.clone(), redraw.clone());
            }
            redraw.emit(());
        })
    };
    match lock.acquire(on_release).await {
        Ok(()) => {
            info!("wake lock acquired");
            state.borrow_mut().on_acquired()
        }
        Err(err) => {
            warn!(error = %err, "failed to acquire wake lock");
            state.borrow_mut().on_acquire_failed();
            None
        }
    }
}

async fn release(lock: &ScreenWakeLock, state: &Rc<RefCell<KeepAwake>>) -> Option<WakeCommand> {
    if let Err(err) = lock.release().await {
        warn!(error = %err, "failed to release wake lock");
    }
    state.borrow_mut().on_released()
}
