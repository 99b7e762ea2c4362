use crate::Route;
use dioxus::prelude::*;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "not-found",
            span { class: "material-symbols-outlined", "explore_off" }
            h1 { "Page not found" }
            p { "Nothing lives at /{path}." }
            Link { class: "button-primary", to: Route::Dashboard {}, "Back to Dashboard" }
        }
    }
}
