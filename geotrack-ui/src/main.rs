//! GeoTrack Dashboard
//!
//! Device geolocation dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Timeline history with table and map views
//! - Realtime monitor of active timelines
//! - Live multi-pointer tracking
//!
//! # Architecture
//!
//! Client-side rendered (CSR) Leptos application compiled to WebAssembly.
//! History comes from the REST API; live pages share one WebSocket driven
//! by the `geotrack` transport core.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
