//! Loading Component
//!
//! Loading spinner and the page-level error alert.

use leptos::*;

/// Full-page loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-12">
            <div class="loading-spinner w-8 h-8" />
        </div>
    }
}

/// Error alert with an optional retry action
#[component]
pub fn ErrorAlert(
    #[prop(into)] message: String,
    #[prop(optional, into)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div class="bg-red-900/50 border border-red-700 text-red-200 rounded-lg p-4 flex items-center justify-between">
            <span>{message}</span>
            {on_retry.map(|retry| view! {
                <button
                    class="px-3 py-1 bg-red-700 hover:bg-red-600 rounded-lg text-sm"
                    on:click=move |_| retry.call(())
                >
                    "Retry"
                </button>
            })}
        </div>
    }
}

/// Skeleton loader for tables
#[component]
pub fn ListSkeleton(#[prop(default = 3)] count: usize) -> impl IntoView {
    view! {
        <div class="space-y-3 animate-pulse">
            {(0..count).map(|_| view! {
                <div class="bg-gray-700 rounded h-12" />
            }).collect_view()}
        </div>
    }
}
