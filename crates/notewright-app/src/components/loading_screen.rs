use std::time::Duration;

use dioxus::prelude::*;

use super::Brand;

const LOADING_CSS: Asset = asset!("/assets/styling/loading.css");
const MESSAGE_PERIOD: Duration = Duration::from_secs(4);

/// Full-page wait state with a spinner and a rotating status line.
#[component]
pub fn LoadingScreen(
    messages: &'static [&'static str],
    #[props(default = false)] overlay: bool,
) -> Element {
    let mut index = use_signal(|| 0usize);

    dioxus_sdk::time::use_interval(MESSAGE_PERIOD, move |_| {
        if !messages.is_empty() {
            let next = (index() + 1) % messages.len();
            index.set(next);
        }
    });

    let message = messages.get(index()).copied().unwrap_or_default();
    let class = if overlay {
        "loading-screen loading-overlay"
    } else {
        "loading-screen"
    };

    rsx! {
        document::Link { rel: "stylesheet", href: LOADING_CSS }
        div { class,
            div { class: "loading-progress" }
            div { class: "loading-column",
                Brand { large: true }
                div { class: "loading-card",
                    div { class: "loading-spinner",
                        div { class: "loading-ring" }
                        div { class: "loading-ring loading-ring-active" }
                    }
                    h2 { class: "loading-message", "{message}" }
                    p { class: "loading-note",
                        "We're preparing personalized generations just for you. This will take a few minutes."
                    }
                }
                blockquote { class: "loading-quote",
                    p { "If I can't picture it. I can't understand it." }
                    cite { "Albert Einstein" }
                }
            }
        }
    }
}
