//! History Page
//!
//! All recorded timelines; each row links to its detail page.

use geotrack::model::Timeline;
use geotrack::render::{end_label, start_label};
use geotrack::store::ViewState;
use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{ErrorAlert, ListSkeleton};
use crate::state::use_global_state;

#[component]
pub fn History() -> impl IntoView {
    let api_base = store_value(use_global_state().api_base);
    let timelines = create_rw_signal(ViewState::<Vec<Timeline>>::Loading);

    let load = move || {
        timelines.set(ViewState::Loading);
        let base = api_base.get_value();
        spawn_local(async move {
            let result = api::fetch_timelines(&base).await;
            let _ = timelines.try_set(api::into_view_state(result));
        });
    };
    load();

    view! {
        <div class="space-y-6">
            <div>
                <h1 class="text-3xl font-bold">"Timeline History"</h1>
                <p class="text-gray-400 mt-1">"Recorded tracking sessions"</p>
            </div>

            {move || match timelines.get() {
                ViewState::Loading => view! { <ListSkeleton count=5 /> }.into_view(),
                ViewState::Failed(message) => view! {
                    <ErrorAlert message=message on_retry=Callback::new(move |_| load()) />
                }.into_view(),
                ViewState::Loaded(list) if list.is_empty() => view! {
                    <p class="text-gray-400">"No timelines recorded yet."</p>
                }.into_view(),
                ViewState::Loaded(list) => view! { <TimelineTable timelines=list /> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn TimelineTable(timelines: Vec<Timeline>) -> impl IntoView {
    view! {
        <table class="w-full text-left bg-gray-800 rounded-lg overflow-hidden">
            <thead class="bg-gray-700 text-gray-300 text-sm">
                <tr>
                    <th class="px-4 py-3">"ID"</th>
                    <th class="px-4 py-3">"Device Name"</th>
                    <th class="px-4 py-3">"Start Time"</th>
                    <th class="px-4 py-3">"End Time"</th>
                </tr>
            </thead>
            <tbody>
                {timelines.into_iter().map(|t| {
                    let href = format!("/history/{}", t.id);
                    view! {
                        <tr class="border-t border-gray-700 hover:bg-gray-700/50">
                            <td class="px-4 py-3">
                                <A href=href class="text-primary-400 hover:underline">{t.id.clone()}</A>
                            </td>
                            <td class="px-4 py-3">{t.device_name().to_string()}</td>
                            <td class="px-4 py-3">{start_label(&t)}</td>
                            <td class="px-4 py-3">{end_label(&t)}</td>
                        </tr>
                    }
                }).collect_view()}
            </tbody>
        </table>
    }
}
