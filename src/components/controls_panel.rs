use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub running: bool,
    pub keep_awake_label: &'static str,
    pub keep_awake_active: bool,
    pub keep_awake_supported: bool,
    pub on_toggle: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_keep_awake: Callback<()>,
}

fn toggle_button(running: bool) -> (&'static str, &'static str) {
    if running {
        ("STOP", "btn btn-toggle btn-stop")
    } else {
        ("START", "btn btn-toggle btn-start")
    }
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let toggle_cb = {
        let cb = props.on_toggle.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let reset_cb = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let keep_awake_cb = {
        let cb = props.on_keep_awake.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let (toggle_label, toggle_class) = toggle_button(props.running);
    let keep_awake_class = classes!(
        "btn",
        "btn-keep-awake",
        props.keep_awake_active.then_some("active")
    );
    // Unsupported platforms get a disabled, greyed-out button.
    let keep_awake_style = if props.keep_awake_supported {
        ""
    } else {
        "background:#6b7280;"
    };
    html! {<div class="controls">
        <button class={toggle_class} onclick={toggle_cb}>{ toggle_label }</button>
        <button
            class={keep_awake_class}
            style={keep_awake_style}
            disabled={!props.keep_awake_supported}
            onclick={keep_awake_cb}
        >{ props.keep_awake_label }</button>
        <button class="btn btn-reset" onclick={reset_cb}>{"RESET"}</button>
    </div>}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_button_tracks_running() {
        assert_eq!(toggle_button(false), ("START", "btn btn-toggle btn-start"));
        assert_eq!(toggle_button(true), ("STOP", "btn btn-toggle btn-stop"));
    }
}
