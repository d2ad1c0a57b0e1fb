//! Multi-Pointer Page
//!
//! Every tracked device on one map. Click the map to add a pointer; each
//! chip can nudge or remove its pointer.

use geotrack::model::Pointer;
use geotrack::protocol::EventKind;
use geotrack::render::{chip_initial, chip_label, clock_label, jitter, MapOverlay, NO_ACTIVE_DEVICES};
use geotrack::store::PointerStore;
use geotrack::LatLng;
use leptos::*;

use crate::components::{MapView, ReconnectButton};
use crate::state::{bind_store, on_every_open, use_global_state};

#[component]
pub fn MultiPointer() -> impl IntoView {
    let state = use_global_state();
    let store = create_rw_signal(PointerStore::new());

    bind_store(
        &state.socket,
        &[
            EventKind::Pointers,
            EventKind::PointerAdded,
            EventKind::PointerRemoved,
            EventKind::PointerMoved,
        ],
        store,
        PointerStore::apply,
    );
    let greeting = state.socket.on(EventKind::Connected, |event| {
        web_sys::console::log_1(&format!("Server greeting: {:?}", event).into());
    });
    on_cleanup(move || drop(greeting));

    on_every_open(&state, |socket| {
        socket.get_pointers();
    });

    let socket = state.socket.clone();
    let add = Callback::new(move |position: LatLng| {
        socket.add_pointer(position);
    });

    let overlay = Signal::derive(move || store.with(|s| MapOverlay::from_pointers(s.pointers())));

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"Multi-Pointer Tracking"</h1>
                    <p class="text-gray-400 mt-1">
                        {move || store.with(|s| s.last_update().map(|at| format!("Last update: {}", clock_label(&at))))}
                    </p>
                </div>
                <ReconnectButton />
            </div>

            <section class="bg-gray-800 rounded-xl p-4">
                <h2 class="text-lg font-semibold">"Active Devices"</h2>
                <p class="text-sm text-gray-400 mb-3">{move || store.with(PointerStore::count_label)}</p>
                <div class="flex flex-wrap gap-2">
                    {move || {
                        let pointers = store.with(|s| s.pointers().to_vec());
                        if pointers.is_empty() {
                            view! { <span class="text-gray-400">{NO_ACTIVE_DEVICES}</span> }.into_view()
                        } else {
                            pointers
                                .into_iter()
                                .map(|p| view! { <PointerChip pointer=p store=store /> })
                                .collect_view()
                        }
                    }}
                </div>
            </section>

            <MapView overlay=overlay on_click=add />
        </div>
    }
}

#[component]
fn PointerChip(pointer: Pointer, store: RwSignal<PointerStore>) -> impl IntoView {
    let socket = use_global_state().socket;
    let id = store_value(pointer.id.clone());

    let nudge = {
        let socket = socket.clone();
        move |_| {
            let id = id.get_value();
            let Some(position) = store.with_untracked(|s| s.get(&id).map(Pointer::position)) else {
                return;
            };
            let target = jitter(position, js_sys::Math::random(), js_sys::Math::random());
            socket.move_pointer(&id, target);
        }
    };
    let remove = move |_| {
        socket.remove_pointer(&id.get_value());
    };

    view! {
        <span class="flex items-center space-x-2 bg-gray-700 rounded-full pl-1 pr-3 py-1 text-sm">
            <span class="w-6 h-6 rounded-full bg-primary-600 flex items-center justify-center font-bold">
                {chip_initial(&pointer)}
            </span>
            <span>{chip_label(&pointer)}</span>
            <button class="text-gray-400 hover:text-white" title="Move" on:click=nudge>"↝"</button>
            <button class="text-gray-400 hover:text-red-400" title="Remove" on:click=remove>"✕"</button>
        </span>
    }
}
