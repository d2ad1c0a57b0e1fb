//! Connection status chip

use geotrack::transport::ConnectionStatus;
use leptos::*;

use crate::state::use_global_state;

fn chip_class(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "bg-green-400",
        ConnectionStatus::Connecting => "bg-yellow-400 pulse",
        ConnectionStatus::Disconnected => "bg-red-400",
        ConnectionStatus::Idle => "bg-gray-500",
    }
}

#[component]
pub fn StatusChip() -> impl IntoView {
    let state = use_global_state();

    view! {
        <span class="flex items-center space-x-2 ml-4 text-sm text-gray-300">
            <span class=move || format!("w-2 h-2 rounded-full {}", chip_class(state.status.get())) />
            <span>{move || state.status.get().label()}</span>
        </span>
    }
}

/// Reconnect button, shown only after the connection dropped
#[component]
pub fn ReconnectButton() -> impl IntoView {
    let state = use_global_state();
    let socket = state.socket.clone();

    view! {
        <Show when=move || state.status.get() == ConnectionStatus::Disconnected>
            {
                let socket = socket.clone();
                view! {
                    <button
                        class="px-3 py-1 bg-primary-600 hover:bg-primary-700 rounded-lg text-sm"
                        on:click=move |_| socket.connect()
                    >
                        "Reconnect"
                    </button>
                }
            }
        </Show>
    }
}
