//! Realtime Detail Page
//!
//! One timeline, live. Leaving the page unsubscribes from its feed.

use geotrack::protocol::{EventKind, Feed};
use geotrack::render::MapOverlay;
use geotrack::store::{TimelineFeed, ViewState};
use leptos::*;
use leptos_router::*;

use super::history_detail::LocationTable;
use crate::components::{ErrorAlert, Loading, MapView, ReconnectButton};
use crate::state::{bind_store, on_every_open, use_global_state};

#[component]
pub fn RealtimeDetail() -> impl IntoView {
    let params = use_params_map();
    let timeline_id = move || params.with(|p| p.get("timeline_id").cloned().unwrap_or_default());

    // Remount on id change so the old feed is left first
    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <A href="/realtime-monitor" class="text-sm text-gray-400 hover:text-white">"← Realtime Monitor"</A>
                <ReconnectButton />
            </div>
            {move || {
                let id = timeline_id();
                view! { <LiveTimeline timeline_id=id /> }
            }}
        </div>
    }
}

#[component]
fn LiveTimeline(timeline_id: String) -> impl IntoView {
    let state = use_global_state();
    let feed = create_rw_signal(TimelineFeed::new(timeline_id.clone()));

    bind_store(
        &state.socket,
        &[EventKind::TimelineDetailRealtime, EventKind::DetailActivity],
        feed,
        TimelineFeed::apply,
    );

    let id = timeline_id.clone();
    on_every_open(&state, move |socket| {
        socket.subscribe(Feed::TimelineDetailRealtime, Some(id.clone()));
    });

    let socket = state.socket.clone();
    let id = timeline_id.clone();
    on_cleanup(move || {
        if socket.is_connected() {
            socket.unsubscribe(Feed::TimelineDetailRealtime, Some(id));
        }
    });

    let socket = state.socket.clone();
    let id = store_value(timeline_id.clone());
    let retry = Callback::new(move |_| {
        feed.update(TimelineFeed::retry);
        socket.subscribe(Feed::TimelineDetailRealtime, Some(id.get_value()));
    });

    let overlay = Signal::derive(move || {
        feed.with(|f| {
            MapOverlay::from_locations(f.detail().map(|d| d.locations.as_slice()).unwrap_or(&[]))
        })
    });

    view! {
        {move || feed.with(|f| match f.state() {
            ViewState::Loading => view! { <Loading /> }.into_view(),
            ViewState::Failed(message) => view! {
                <ErrorAlert message=message.clone() on_retry=retry />
            }.into_view(),
            ViewState::Loaded(detail) => {
                let name = detail.device.name.clone();
                let locations = detail.locations.clone();
                view! {
                    <h1 class="text-3xl font-bold">{name}</h1>
                    <p class="text-gray-400">{format!("Timeline {}", f.timeline_id())}</p>
                    <MapView overlay=overlay />
                    <LocationTable locations=locations />
                }.into_view()
            }
        })}
    }
}
