use crate::state::layout::{LEGEND_TEXT, font_style};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LegendProps {
    pub font_px: Option<f64>,
    pub node_ref: NodeRef,
}

#[function_component(Legend)]
pub fn legend(props: &LegendProps) -> Html {
    html! { <div ref={props.node_ref.clone()} class="legend-display" style={font_style(props.font_px)}>{ LEGEND_TEXT }</div> }
}
