use dioxus::prelude::*;
use notewright_common::{ApiClient, ApiConfig};
use notewright_renderer::{Theme, css};
use views::{Create, Dashboard, NotFound, Settings, Sidebar, Viewer};

mod components;
/// The browser surface of the enhancement pass.
mod live;
mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[redirect("/", || Route::Dashboard {})]
    #[layout(Sidebar)]
        #[route("/home")]
        Dashboard {},
        #[route("/new")]
        Create {},
        #[route("/viewer?:id")]
        Viewer { id: String },
        #[route("/settings")]
        Settings {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/styling/main.css");

fn main() {
    // Set up better panic messages for wasm
    #[cfg(all(target_family = "wasm", target_os = "unknown"))]
    console_error_panic_hook::set_once();

    // Must happen before dioxus::launch so dioxus skips its own init
    #[cfg(all(target_family = "wasm", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        let _ = set_global_default(Registry::default().with(wasm_layer));
    }

    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(|| match ApiConfig::from_env() {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::error!(error = %err, "invalid API configuration");
            None
        }
    });
    live::use_library_loader_provider();
    // prose, player and image rules shared with the offline export
    let content_css = use_hook(|| css::generate_stylesheet(&Theme::default()));

    rsx! {
        document::Link { rel: "preconnect", href: "https://fonts.googleapis.com" }
        document::Link { rel: "preconnect", href: "https://fonts.gstatic.com" }
        document::Link { rel: "stylesheet", href: notewright_renderer::theme::FONT_IMPORT_URL }
        document::Link { rel: "stylesheet", href: notewright_renderer::theme::ICON_FONT_URL }
        document::Stylesheet { href: MAIN_CSS }
        style { dangerous_inner_html: "{content_css}" }
        match config {
            Some(config) => rsx! { ConfiguredRouter { config } },
            None => rsx! {
                div { class: "fatal-error",
                    "The API address this build was configured with is not a valid URL."
                }
            },
        }
    }
}

#[component]
fn ConfiguredRouter(config: ApiConfig) -> Element {
    use_context_provider(|| ApiClient::new(config.clone()));
    rsx! { Router::<Route> {} }
}
