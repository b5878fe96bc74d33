// Viewport space allocation and the shrink-to-fit loop for the text rows.

pub const CONTROLS_SHARE: f64 = 0.15;
pub const CURRENT_TIMESTAMP_SHARE: f64 = 0.10;
pub const START_TIMESTAMP_SHARE: f64 = 0.06;
pub const LEGEND_SHARE: f64 = 0.08;
/// Horizontal breathing room subtracted from `innerWidth`.
pub const WIDTH_MARGIN_PX: f64 = 20.0;
pub const MIN_FONT_PX: f64 = 8.0;

pub const LEGEND_TEXT: &str = "🟢 Active • 🟡 Session";
pub const STARTED_PREFIX: &str = "Started: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Active,
    Session,
    CurrentTimestamp,
    StartTimestamp,
    Legend,
}

impl Slot {
    /// Widest text the row is expected to hold.
    pub fn sample(self) -> &'static str {
        match self {
            Slot::Active | Slot::Session => "99d23h59m",
            Slot::CurrentTimestamp => "Sun, Aug 31, 2025 08:30:28 (08:30:28 AM)",
            Slot::StartTimestamp => "Started: Sun, Aug 31, 2025 08:30:28 (08:30:28 AM)",
            Slot::Legend => LEGEND_TEXT,
        }
    }
}

/// Font size to begin shrinking from, per visible row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontPlan {
    pub active: f64,
    pub session: Option<f64>,
    pub current_timestamp: f64,
    pub start_timestamp: Option<f64>,
    pub legend: f64,
}

impl FontPlan {
    pub fn for_viewport(height: f64, show_start: bool, show_session: bool) -> Self {
        let available = height - height * CONTROLS_SHARE;
        let current_h = available * CURRENT_TIMESTAMP_SHARE;
        let start_h = if show_start {
            available * START_TIMESTAMP_SHARE
        } else {
            0.0
        };
        let legend_h = available * LEGEND_SHARE;
        let timer_space = available - current_h - start_h - legend_h;

        let (active, session) = if show_session {
            let half = timer_space * 0.5;
            (half.max(30.0), Some(half.max(30.0)))
        } else {
            (timer_space.max(50.0), None)
        };
        Self {
            active,
            session,
            current_timestamp: current_h.max(12.0),
            start_timestamp: show_start.then(|| start_h.max(10.0)),
            legend: legend_h.max(10.0),
        }
    }
}

/// Applied font sizes; `None` leaves the stylesheet default in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontSizes {
    pub active: Option<f64>,
    pub session: Option<f64>,
    pub current_timestamp: Option<f64>,
    pub start_timestamp: Option<f64>,
    pub legend: Option<f64>,
}

impl FontSizes {
    /// Fits every planned row; rows hidden by the plan keep their previous size.
    pub fn fit(
        plan: &FontPlan,
        previous: FontSizes,
        max_width: f64,
        mut measure: impl FnMut(Slot, f64) -> f64,
    ) -> FontSizes {
        let mut fit_slot =
            |slot: Slot, start: f64| shrink_to_fit(start, max_width, |px| measure(slot, px));
        FontSizes {
            active: Some(fit_slot(Slot::Active, plan.active)),
            session: plan
                .session
                .map(|s| fit_slot(Slot::Session, s))
                .or(previous.session),
            current_timestamp: Some(fit_slot(Slot::CurrentTimestamp, plan.current_timestamp)),
            start_timestamp: plan
                .start_timestamp
                .map(|s| fit_slot(Slot::StartTimestamp, s))
                .or(previous.start_timestamp),
            legend: Some(fit_slot(Slot::Legend, plan.legend)),
        }
    }
}

/// Steps the font down 1px at a time, from the whole pixel at or below
/// `start`, until `measure(px) <= max_width` or the floor is hit.
pub fn shrink_to_fit(start: f64, max_width: f64, mut measure: impl FnMut(f64) -> f64) -> f64 {
    let mut size = start.floor();
    while measure(size) > max_width && size > MIN_FONT_PX {
        size -= 1.0;
    }
    size
}

pub fn font_style(size: Option<f64>) -> String {
    size.map(|px| format!("font-size:{}px;", px))
        .unwrap_or_default()
}
