//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::components::Nav;
use crate::pages::{History, HistoryDetail, MultiPointer, RealtimeDetail, RealtimeMonitor};
use crate::state::{provide_global_state, use_global_state};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                <Nav />

                <main class="flex-1 container mx-auto px-4 py-8 pb-24">
                    <Routes>
                        <Route path="/" view=|| view! { <Redirect path="/history" /> } />
                        <Route path="/history" view=History />
                        <Route path="/history/:timeline_id" view=HistoryDetail />
                        <Route path="/realtime-monitor" view=RealtimeMonitor />
                        <Route path="/realtime-monitor/:timeline_id" view=RealtimeDetail />
                        <Route path="/multi-pointer" view=MultiPointer />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                <Footer />
            </div>
        </Router>
    }
}

/// Footer showing which servers the dashboard talks to
#[component]
fn Footer() -> impl IntoView {
    let state = use_global_state();
    let ws_url = state.socket.url().to_string();

    view! {
        <footer class="fixed bottom-0 left-0 right-0 bg-gray-800 border-t border-gray-700 py-3 px-4">
            <div class="container mx-auto flex items-center justify-between text-sm text-gray-400">
                <span>{format!("API: {}", state.api_base)}</span>
                <span>{format!("Live: {}", ws_url)}</span>
            </div>
        </footer>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/history"
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
            >
                "Go to History"
            </A>
        </div>
    }
}
