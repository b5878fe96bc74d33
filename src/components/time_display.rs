use crate::state::layout::font_style;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct TimeDisplayProps {
    pub class: &'static str,
    pub text: String,
    pub font_px: Option<f64>,
    pub node_ref: NodeRef,
    #[prop_or(true)]
    pub visible: bool,
}

/// One auto-sized text row (durations and timestamps).
#[function_component(TimeDisplay)]
pub fn time_display(props: &TimeDisplayProps) -> Html {
    let display = if props.visible { "display:flex;" } else { "display:none;" };
    html! {<div
        ref={props.node_ref.clone()}
        class={props.class}
        style={format!("{} {}", display, font_style(props.font_px))}
    >{ props.text.clone() }</div>}
}
