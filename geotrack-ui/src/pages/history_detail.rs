//! History Detail Page
//!
//! Recorded locations of one timeline, as a table or on a map.

use geotrack::model::LocationEvent;
use geotrack::render::{coordinate, format_optional, short_address, MapOverlay};
use geotrack::store::ViewState;
use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{ErrorAlert, ListSkeleton, MapView};
use crate::state::use_global_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Table,
    Map,
}

#[component]
pub fn HistoryDetail() -> impl IntoView {
    let params = use_params_map();
    let timeline_id = move || params.with(|p| p.get("timeline_id").cloned().unwrap_or_default());
    let api_base = store_value(use_global_state().api_base);

    let locations = create_rw_signal(ViewState::<Vec<LocationEvent>>::Loading);
    let tab = create_rw_signal(Tab::Table);

    let load = move |id: String| {
        locations.set(ViewState::Loading);
        let base = api_base.get_value();
        spawn_local(async move {
            let result = api::fetch_timeline_detail(&base, &id).await;
            let _ = locations.try_set(api::into_view_state(result));
        });
    };
    create_effect(move |_| load(timeline_id()));

    let overlay = Signal::derive(move || {
        locations.with(|s| MapOverlay::from_locations(s.data().map(Vec::as_slice).unwrap_or(&[])))
    });

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <A href="/history" class="text-sm text-gray-400 hover:text-white">"← History"</A>
                    <h1 class="text-3xl font-bold">{move || format!("Timeline {}", timeline_id())}</h1>
                </div>
                <div class="flex space-x-2">
                    <TabButton tab=tab value=Tab::Table label="Table" />
                    <TabButton tab=tab value=Tab::Map label="Map" />
                </div>
            </div>

            {move || match locations.get() {
                ViewState::Loading => view! { <ListSkeleton count=5 /> }.into_view(),
                ViewState::Failed(message) => view! {
                    <ErrorAlert message=message on_retry=Callback::new(move |_| load(timeline_id())) />
                }.into_view(),
                ViewState::Loaded(list) => match tab.get() {
                    Tab::Table => view! { <LocationTable locations=list /> }.into_view(),
                    Tab::Map => view! { <MapView overlay=overlay /> }.into_view(),
                },
            }}
        </div>
    }
}

#[component]
fn TabButton(tab: RwSignal<Tab>, value: Tab, label: &'static str) -> impl IntoView {
    view! {
        <button
            class=move || if tab.get() == value {
                "px-4 py-2 rounded-lg bg-gray-700 text-white"
            } else {
                "px-4 py-2 rounded-lg text-gray-400 hover:text-white"
            }
            on:click=move |_| tab.set(value)
        >
            {label}
        </button>
    }
}

#[component]
pub fn LocationTable(locations: Vec<LocationEvent>) -> impl IntoView {
    view! {
        <table class="w-full text-left bg-gray-800 rounded-lg overflow-hidden text-sm">
            <thead class="bg-gray-700 text-gray-300">
                <tr>
                    <th class="px-4 py-3">"Latitude"</th>
                    <th class="px-4 py-3">"Longitude"</th>
                    <th class="px-4 py-3">"Event Type"</th>
                    <th class="px-4 py-3">"Address"</th>
                    <th class="px-4 py-3">"Time"</th>
                </tr>
            </thead>
            <tbody>
                {locations.into_iter().map(|l| view! {
                    <tr class="border-t border-gray-700">
                        <td class="px-4 py-2">{coordinate(l.latitude)}</td>
                        <td class="px-4 py-2">{coordinate(l.longitude)}</td>
                        <td class="px-4 py-2">{l.event_type_label().to_string()}</td>
                        <td class="px-4 py-2">{short_address(l.reverse_data.as_deref())}</td>
                        <td class="px-4 py-2">{format_optional(l.created_at.as_ref())}</td>
                    </tr>
                }).collect_view()}
            </tbody>
        </table>
    }
}
