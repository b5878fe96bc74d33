// DOM measurement for the responsive font sizing.

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use yew::NodeRef;

use crate::state::layout::{self, FontPlan, FontSizes, Slot};

/// Node refs of every auto-sized text row.
#[derive(Clone, Default, PartialEq)]
pub struct DisplayRefs {
    pub active: NodeRef,
    pub session: NodeRef,
    pub current_timestamp: NodeRef,
    pub start_timestamp: NodeRef,
    pub legend: NodeRef,
}

impl DisplayRefs {
    fn get(&self, slot: Slot) -> Option<HtmlElement> {
        let node = match slot {
            Slot::Active => &self.active,
            Slot::Session => &self.session,
            Slot::CurrentTimestamp => &self.current_timestamp,
            Slot::StartTimestamp => &self.start_timestamp,
            Slot::Legend => &self.legend,
        };
        node.cast::<HtmlElement>()
    }
}

/// Recomputes every row's size for the current viewport. Returns `previous`
/// unchanged when the window or any row is missing.
pub fn fit_fonts(
    refs: &DisplayRefs,
    previous: FontSizes,
    show_start: bool,
    show_session: bool,
) -> FontSizes {
    let Some(window) = web_sys::window() else {
        return previous;
    };
    let dimension = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64())
    };
    let (Some(width), Some(height)) = (
        dimension(window.inner_width()),
        dimension(window.inner_height()),
    ) else {
        return previous;
    };
    let all = [
        Slot::Active,
        Slot::Session,
        Slot::CurrentTimestamp,
        Slot::StartTimestamp,
        Slot::Legend,
    ];
    if all.iter().any(|s| refs.get(*s).is_none()) {
        return previous;
    }

    let plan = FontPlan::for_viewport(height, show_start, show_session);
    let max_width = width - layout::WIDTH_MARGIN_PX;
    let mut probes: Vec<(Slot, Probe)> = Vec::new();
    let sizes = FontSizes::fit(&plan, previous, max_width, |slot, px| {
        if !probes.iter().any(|(s, _)| *s == slot) {
            match refs.get(slot).and_then(|el| Probe::new(&el, slot.sample())) {
                Some(p) => probes.push((slot, p)),
                None => return 0.0,
            }
        }
        probes
            .iter()
            .find(|(s, _)| *s == slot)
            .map_or(0.0, |(_, p)| p.width_at(px))
    });
    drop(probes);
    sizes
}

/// Hidden off-screen clone of a row holding sample text; removed on drop.
struct Probe {
    element: HtmlElement,
}

impl Probe {
    fn new(template: &HtmlElement, sample: &str) -> Option<Self> {
        let body = web_sys::window()?.document()?.body()?;
        let element = template
            .clone_node_with_deep(true)
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        let style = element.style();
        style.set_property("visibility", "hidden").ok()?;
        style.set_property("position", "absolute").ok()?;
        style.set_property("top", "-9999px").ok()?;
        style.set_property("display", "block").ok()?;
        style.set_property("white-space", "nowrap").ok()?;
        element.set_text_content(Some(sample));
        body.append_child(&element).ok()?;
        Some(Self { element })
    }

    fn width_at(&self, px: f64) -> f64 {
        let _ = self
            .element
            .style()
            .set_property("font-size", &format!("{}px", px));
        self.element.offset_width() as f64
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.element.remove();
    }
}
