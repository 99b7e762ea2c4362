use dioxus::prelude::*;

/// Logo tile with the product name and tagline.
#[component]
pub fn Brand(#[props(default = false)] large: bool) -> Element {
    let class = if large { "brand brand-large" } else { "brand" };
    rsx! {
        div { class,
            div { class: "brand-logo",
                span { class: "material-symbols-outlined", "school" }
            }
            div { class: "brand-text",
                h1 { class: "brand-name", "Notewright" }
                p { class: "brand-tagline", "Learning Engine" }
            }
        }
    }
}
