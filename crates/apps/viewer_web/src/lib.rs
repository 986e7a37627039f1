use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::ids::DayNumber;
use foundation::time::Millis;
use formats::{LoadError, RouteFormat, RouteGeometry, RouteGeometryError, TripData};
use runtime::{Event, Severity};
use scene::TripController;

mod config;
mod dom;
mod leaflet;

pub use config::HostConfig;
use dom::DomView;

struct HostState {
    controller: Option<TripController<DomView>>,
    /// Native timer armed for the controller's next deferred reveal.
    timer: Option<(Millis, i32)>,
}

thread_local! {
    static STATE: RefCell<HostState> = RefCell::new(HostState {
        controller: None,
        timer: None,
    });
}

fn now() -> Millis {
    Millis::from_f64(js_sys::Date::now())
}

pub(crate) fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn forward(events: Vec<Event>) {
    for e in events {
        let line = JsValue::from_str(&format!("[trip:{}] {}", e.kind, e.message));
        match e.severity {
            Severity::Debug => web_sys::console::debug_1(&line),
            Severity::Info => web_sys::console::info_1(&line),
            Severity::Warn => web_sys::console::warn_1(&line),
            Severity::Error => web_sys::console::error_1(&line),
        }
    }
}

/// Runs `f` against the controller on a fresh task.
///
/// DOM and Leaflet callbacks may fire while the controller is already
/// borrowed (Leaflet emits some events synchronously), so every entry point
/// goes through here instead of borrowing in place.
pub(crate) fn dispatch(f: impl FnOnce(&mut TripController<DomView>) + 'static) {
    spawn_local(async move {
        let due = STATE.with(|state| {
            let mut s = state.borrow_mut();
            let controller = s.controller.as_mut()?;
            controller.tick(now());
            f(controller);
            forward(controller.drain_diagnostics());
            controller.next_timer_due()
        });
        arm_timer(due);
    });
}

/// Keeps one native timeout armed for the earliest deferred reveal.
fn arm_timer(due: Option<Millis>) {
    let Some(due) = due else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };
    let already = STATE.with(|state| matches!(state.borrow().timer, Some((at, _)) if at == due));
    if already {
        return;
    }

    let delay = due.0.saturating_sub(now().0).min(i32::MAX as u64) as i32;
    let callback = Closure::once_into_js(move || {
        STATE.with(|state| state.borrow_mut().timer = None);
        dispatch(|_| {});
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay,
    ) {
        Ok(handle) => {
            let previous = STATE.with(|state| state.borrow_mut().timer.replace((due, handle)));
            if let Some((_, old)) = previous {
                window.clear_timeout_with_handle(old);
            }
        }
        Err(err) => console_error(&format!("could not arm reveal timer: {err:?}")),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Builds the viewer into the page and starts loading the itinerary and the
/// optional route. `settings` is a JSON object of [`HostConfig`] fields.
#[wasm_bindgen]
pub fn boot(settings: Option<String>) -> Result<(), JsValue> {
    let config = HostConfig::from_json(settings.as_deref().unwrap_or(""))
        .map_err(|e| JsValue::from_str(&e))?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let view = DomView::new(document, &config);
    let controller = TripController::new(config.viewer_config(), view);
    STATE.with(|state| state.borrow_mut().controller = Some(controller));

    spawn_local(async move {
        let loaded = fetch_itinerary(&config.itinerary_url, config.fetch_timeout_ms).await;
        dispatch(move |c| {
            c.load(loaded);
        });

        if let Some(url) = config.route_url {
            let route = fetch_route(&url, config.fetch_timeout_ms).await;
            dispatch(move |c| c.load_route(route));
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn select_day(day: u32) {
    match DayNumber::new(day) {
        Some(day) => dispatch(move |c| {
            c.select(day);
        }),
        None => console_error("select_day: day numbers start at 1"),
    }
}

/// Day currently shown, or 0 before the first selection.
#[wasm_bindgen]
pub fn active_day() -> u32 {
    STATE.with(|state| {
        state
            .borrow()
            .controller
            .as_ref()
            .and_then(|c| c.active_day())
            .map_or(0, DayNumber::get)
    })
}

/// Counters and gauges of the controller as a JSON string.
#[wasm_bindgen]
pub fn metrics_json() -> String {
    STATE.with(|state| {
        let s = state.borrow();
        let Some(c) = s.controller.as_ref() else {
            return "null".to_string();
        };
        let snapshot = c.metrics().snapshot();
        let counters: serde_json::Map<String, serde_json::Value> = snapshot
            .counters
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
        let gauges: serde_json::Map<String, serde_json::Value> = snapshot
            .gauges
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
        serde_json::json!({ "counters": counters, "gauges": gauges }).to_string()
    })
}

/// Body of `url`, aborting the request after `timeout_ms`.
async fn fetch_text(url: &str, timeout_ms: u32) -> Result<(u16, String), LoadError> {
    let abort = web_sys::AbortController::new().map_err(|e| LoadError::transport(format!("{e:?}")))?;
    let timed_out = Rc::new(Cell::new(false));

    let timer = web_sys::window().and_then(|w| {
        let abort = abort.clone();
        let timed_out = timed_out.clone();
        let on_timeout = Closure::once_into_js(move || {
            timed_out.set(true);
            abort.abort();
        });
        w.set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.unchecked_ref(),
            timeout_ms.min(i32::MAX as u32) as i32,
        )
        .ok()
    });

    let signal = abort.signal();
    let result = async {
        let resp = Request::get(url)
            .abort_signal(Some(&signal))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        Ok::<_, String>((status, body))
    }
    .await;

    if let (Some(window), Some(handle)) = (web_sys::window(), timer) {
        window.clear_timeout_with_handle(handle);
    }

    result.map_err(|msg| {
        if timed_out.get() {
            LoadError::Timeout {
                after_ms: u64::from(timeout_ms),
            }
        } else {
            LoadError::transport(msg)
        }
    })
}

async fn fetch_itinerary(url: &str, timeout_ms: u32) -> Result<TripData, LoadError> {
    let (status, body) = fetch_text(url, timeout_ms).await?;
    TripData::from_http(status, &body)
}

async fn fetch_route(url: &str, timeout_ms: u32) -> Result<RouteGeometry, RouteGeometryError> {
    let format = RouteFormat::from_path(url).unwrap_or(RouteFormat::GeoJson);
    let (status, body) = fetch_text(url, timeout_ms)
        .await
        .map_err(|e| RouteGeometryError::Fetch(e.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(RouteGeometryError::Fetch(format!("HTTP {status}")));
    }
    RouteGeometry::parse(&body, format)
}
