//! Map Component
//!
//! SVG rendering of a [`MapOverlay`]: markers with popups and the optional
//! connecting path, projected onto a fixed viewport around the points.

use geotrack::render::{MapOverlay, Marker};
use geotrack::LatLng;
use leptos::*;
use wasm_bindgen::JsCast;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 450.0;

/// Degrees shown around a lone point (or an empty map)
const MIN_SPAN: f64 = 0.02;

/// Linear lat/lng to pixel projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    south: f64,
    west: f64,
    lat_span: f64,
    lng_span: f64,
}

impl Viewport {
    /// Fit the overlay's points, padded by 10%, around at least `MIN_SPAN`
    pub fn fit(overlay: &MapOverlay) -> Self {
        let (sw, ne) = overlay
            .bounds()
            .unwrap_or((overlay.center, overlay.center));
        let lat_span = ((ne.latitude - sw.latitude) * 1.2).max(MIN_SPAN);
        let lng_span = ((ne.longitude - sw.longitude) * 1.2).max(MIN_SPAN);
        let mid_lat = (sw.latitude + ne.latitude) / 2.0;
        let mid_lng = (sw.longitude + ne.longitude) / 2.0;
        Self {
            south: mid_lat - lat_span / 2.0,
            west: mid_lng - lng_span / 2.0,
            lat_span,
            lng_span,
        }
    }

    pub fn project(&self, position: LatLng) -> (f64, f64) {
        let x = (position.longitude - self.west) / self.lng_span * WIDTH;
        let y = (1.0 - (position.latitude - self.south) / self.lat_span) * HEIGHT;
        (x, y)
    }

    /// Position under a click, from fractions of the rendered width and height
    pub fn unproject(&self, fx: f64, fy: f64) -> LatLng {
        LatLng::new(
            self.south + (1.0 - fy) * self.lat_span,
            self.west + fx * self.lng_span,
        )
    }
}

/// Map of an overlay
///
/// With `on_click`, clicking empty map reports the clicked position.
#[component]
pub fn MapView(
    #[prop(into)] overlay: Signal<MapOverlay>,
    #[prop(optional, into)] on_click: Option<Callback<LatLng>>,
) -> impl IntoView {
    let viewport = create_memo(move |_| overlay.with(Viewport::fit));
    let selected = create_rw_signal(None::<Marker>);

    let handle_click = move |ev: web_sys::MouseEvent| {
        let Some(callback) = on_click else { return };
        let Some(target) = ev
            .current_target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let rect = target.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let fx = (f64::from(ev.client_x()) - rect.left()) / rect.width();
        let fy = (f64::from(ev.client_y()) - rect.top()) / rect.height();
        callback.call(viewport.get_untracked().unproject(fx, fy));
    };

    view! {
        <div class="relative">
            <svg
                viewBox=format!("0 0 {} {}", WIDTH, HEIGHT)
                class="w-full h-96 bg-gray-800 rounded-lg cursor-crosshair"
                on:click=handle_click
            >
                {move || {
                    let vp = viewport.get();
                    overlay.with(|o| {
                        o.path.as_ref().map(|path| {
                            let points = path
                                .iter()
                                .map(|p| {
                                    let (x, y) = vp.project(*p);
                                    format!("{:.1},{:.1}", x, y)
                                })
                                .collect::<Vec<_>>()
                                .join(" ");
                            view! {
                                <polyline points=points fill="none" stroke="#3b82f6" stroke-width="3" />
                            }
                        })
                    })
                }}
                {move || {
                    let vp = viewport.get();
                    overlay
                        .with(|o| o.markers.clone())
                        .into_iter()
                        .map(|marker| {
                            let (x, y) = vp.project(marker.position);
                            let tooltip = std::iter::once(marker.title.clone())
                                .chain(marker.lines.iter().cloned())
                                .collect::<Vec<_>>()
                                .join("\n");
                            let picked = marker.clone();
                            view! {
                                <circle
                                    cx=format!("{:.1}", x)
                                    cy=format!("{:.1}", y)
                                    r="7"
                                    class="fill-red-500 stroke-white cursor-pointer"
                                    stroke-width="2"
                                    on:click=move |ev: web_sys::MouseEvent| {
                                        ev.stop_propagation();
                                        selected.set(Some(picked.clone()));
                                    }
                                >
                                    <title>{tooltip}</title>
                                </circle>
                            }
                        })
                        .collect_view()
                }}
            </svg>

            {move || selected.get().map(|marker| view! {
                <div class="absolute top-2 right-2 bg-gray-900/90 rounded-lg p-3 text-sm max-w-xs">
                    <div class="flex justify-between items-start space-x-3">
                        <strong>{marker.title.clone()}</strong>
                        <button class="text-gray-400 hover:text-white" on:click=move |_| selected.set(None)>
                            "✕"
                        </button>
                    </div>
                    {marker.lines.iter().map(|line| view! { <div class="text-gray-300">{line.clone()}</div> }).collect_view()}
                </div>
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrack::render::ORIGIN;

    #[test]
    fn test_empty_overlay_centers_origin() {
        let overlay = MapOverlay {
            center: ORIGIN,
            markers: Vec::new(),
            path: None,
        };
        let vp = Viewport::fit(&overlay);
        let (x, y) = vp.project(ORIGIN);
        assert!((x - WIDTH / 2.0).abs() < 1e-6);
        assert!((y - HEIGHT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_click_maps_back_to_position() {
        let overlay = MapOverlay {
            center: LatLng::new(-6.2088, 106.8456),
            markers: Vec::new(),
            path: None,
        };
        let vp = Viewport::fit(&overlay);
        let p = vp.unproject(0.5, 0.5);
        assert!((p.latitude + 6.2088).abs() < 1e-9);
        assert!((p.longitude - 106.8456).abs() < 1e-9);

        let (x, y) = vp.project(LatLng::new(-6.2, 106.85));
        let back = vp.unproject(x / WIDTH, y / HEIGHT);
        assert!((back.latitude + 6.2).abs() < 1e-9);
        assert!((back.longitude - 106.85).abs() < 1e-9);
    }
}
