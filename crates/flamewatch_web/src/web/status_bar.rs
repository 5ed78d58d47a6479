use flamewatch::status::{StatusBar, StatusField};
use leptos::prelude::*;

use crate::ui_model::{ElementId, ToolbarAction};

#[component]
pub(super) fn Header(
    status: ReadSignal<StatusBar>,
    on_toggle: Callback<()>,
    on_reset_zoom: Callback<()>,
) -> impl IntoView {
    view! {
        <header class="app-header">
            <div class="app-header-left">
                <span
                    id=ElementId::Status.id()
                    class=move || format!("status-dot {}", status.get().indicator_class())
                ></span>
                <h1 class="brand">"flamewatch"</h1>
                <span class="subtle" title="Elapsed">
                    "⏱ "
                    <span id=ElementId::Duration.id()>{move || status.get().duration}</span>
                </span>
            </div>
            <div class="app-header-right">
                <button
                    class="icon-btn"
                    title=ToolbarAction::PlayPause.title()
                    on:click=move |_| on_toggle.run(())
                >
                    <i class=move || format!("fa {}", status.get().play_icon.css_class())>
                        {move || status.get().play_icon.glyph()}
                    </i>
                </button>
                <button
                    class="btn sm ghost"
                    title=ToolbarAction::ResetZoom.title()
                    on:click=move |_| on_reset_zoom.run(())
                >
                    {ToolbarAction::ResetZoom.label()}
                </button>
            </div>
        </header>
    }
}

#[component]
pub(super) fn ProcessFields(status: ReadSignal<StatusBar>) -> impl IntoView {
    let caption = |field: StatusField| match field {
        StatusField::Duration => "Duration",
        StatusField::Samples => "Samples",
        StatusField::Cpu => "CPU",
        StatusField::Memory => "Memory",
        StatusField::Pid => "PID",
        StatusField::Command => "Command",
    };

    view! {
        <section class="process-fields">
            {StatusField::all()
                .iter()
                .copied()
                .filter(|f| *f != StatusField::Duration)
                .map(|field| {
                    view! {
                        <div class="field">
                            <span class="subtle">{caption(field)}</span>
                            <span id=ElementId::for_field(field).id() class="value">
                                {move || status.get().field(field).to_string()}
                            </span>
                        </div>
                    }
                })
                .collect_view()}
        </section>
    }
}

#[component]
pub(super) fn SearchForm(
    on_search: Callback<String>,
    on_input: Callback<String>,
    on_clear: Callback<()>,
) -> impl IntoView {
    let term = RwSignal::new(String::new());

    view! {
        <form
            id=ElementId::Form.id()
            class="search-form"
            on:submit=move |ev| {
                ev.prevent_default();
                on_search.run(term.get_untracked());
            }
        >
            <input
                id=ElementId::Term.id()
                type="text"
                placeholder="Search frames"
                prop:value=move || term.get()
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    term.set(value.clone());
                    on_input.run(value);
                }
            />
            <button type="submit" class="btn sm">"Search"</button>
            <button
                type="button"
                class="btn sm ghost"
                title=ToolbarAction::Clear.title()
                on:click=move |_| {
                    term.set(String::new());
                    on_clear.run(());
                }
            >
                {ToolbarAction::Clear.label()}
            </button>
        </form>
    }
}
