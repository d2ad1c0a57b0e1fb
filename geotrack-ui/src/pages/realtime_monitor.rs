//! Realtime Monitor Page
//!
//! Active timelines with their live location samples.

use geotrack::model::MonitoredTimeline;
use geotrack::protocol::{EventKind, Feed};
use geotrack::render::{coordinate, short_address, start_label};
use geotrack::store::{MonitorBoard, ViewState};
use leptos::*;
use leptos_router::*;

use crate::components::{ErrorAlert, ListSkeleton, ReconnectButton};
use crate::state::{bind_store, on_every_open, use_global_state};

#[component]
pub fn RealtimeMonitor() -> impl IntoView {
    let state = use_global_state();
    let board = create_rw_signal(MonitorBoard::new());

    bind_store(
        &state.socket,
        &[
            EventKind::RealtimeMonitor,
            EventKind::ActiveTimeline,
            EventKind::LocationUpdate,
        ],
        board,
        MonitorBoard::apply,
    );
    on_every_open(&state, |socket| {
        socket.subscribe(Feed::RealtimeMonitor, None);
    });

    let socket = state.socket.clone();
    let retry = Callback::new(move |_| {
        board.update(MonitorBoard::retry);
        socket.subscribe(Feed::RealtimeMonitor, None);
    });

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"Realtime Monitor"</h1>
                    <p class="text-gray-400 mt-1">"Active timelines, updated live"</p>
                </div>
                <ReconnectButton />
            </div>

            {move || board.with(|b| match b.state() {
                ViewState::Loading => view! { <ListSkeleton count=3 /> }.into_view(),
                ViewState::Failed(message) => view! {
                    <ErrorAlert message=message.clone() on_retry=retry />
                }.into_view(),
                ViewState::Loaded(_) => match b.notice() {
                    Some(notice) => view! { <p class="text-gray-400">{notice}</p> }.into_view(),
                    None => b
                        .timelines()
                        .iter()
                        .cloned()
                        .map(|t| view! { <MonitorCard timeline=t /> })
                        .collect_view(),
                },
            })}
        </div>
    }
}

#[component]
fn MonitorCard(timeline: MonitoredTimeline) -> impl IntoView {
    let href = format!("/realtime-monitor/{}", timeline.timeline.id);
    let last = timeline.last_location().map(|s| {
        format!(
            "{}, {} - {}",
            coordinate(s.latitude),
            coordinate(s.longitude),
            short_address(s.reverse_data.as_deref())
        )
    });

    view! {
        <A href=href class="block bg-gray-800 hover:bg-gray-700 rounded-lg p-4 mb-3">
            <div class="flex items-center justify-between">
                <span class="font-semibold">{timeline.timeline.device_name().to_string()}</span>
                <span class="text-sm text-gray-400">{format!("Started {}", start_label(&timeline.timeline))}</span>
            </div>
            <div class="text-sm text-gray-300 mt-2">
                {last.unwrap_or_else(|| "Waiting for location...".to_string())}
            </div>
            <div class="text-xs text-gray-500 mt-1">
                {format!("{} live samples", timeline.locations.len())}
            </div>
        </A>
    }
}
