use crate::Route;
use crate::components::LoadingScreen;
use crate::live::{self, EnhancedContent};
use chrono::Utc;
use dioxus::prelude::*;
use notewright_common::{ApiClient, Document, DocumentId};
use notewright_renderer::{ExportOptions, export_document};

const VIEWER_CSS: Asset = asset!("/assets/styling/viewer.css");

const FETCHING_MESSAGES: &[&str] = &[
    "Understanding Documents...",
    "Preparing visualizations...",
    "Almost ready...",
];

/// Shows one generated document with live players, math and image downloads.
#[component]
pub fn Viewer(id: String) -> Element {
    let client = use_context::<ApiClient>();
    let loaded = use_resource(use_reactive!(|id| {
        let client = client.clone();
        async move {
            if id.trim().is_empty() {
                return None;
            }
            Some(client.get_document(&DocumentId::new(id)).await)
        }
    }));

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWER_CSS }

        match &*loaded.read_unchecked() {
            Some(Some(Ok(doc))) => rsx! {
                Article { document: doc.clone() }
            },
            Some(Some(Err(err))) => {
                tracing::warn!(error = %err, "could not load document");
                rsx! {
                    ViewerMessage {
                        icon: "error",
                        title: "Error loading article",
                        detail: err.to_string(),
                    }
                }
            }
            Some(None) => rsx! {
                ViewerMessage {
                    icon: "description",
                    title: "No content to display",
                    detail: "Please generate a concept first".to_string(),
                }
            },
            None => rsx! {
                LoadingScreen { messages: FETCHING_MESSAGES }
            },
        }
    }
}

#[component]
fn Article(document: Document) -> Element {
    let nav = use_navigator();
    let export_source = document.clone();

    let download = move |_| {
        match export_document(&export_source, &ExportOptions::default(), Utc::now()) {
            Ok(exported) => live::save_exported(&exported),
            Err(err) => tracing::error!(error = %err, id = %export_source.id, "export failed"),
        }
    };

    rsx! {
        div { class: "viewer",
            header { class: "viewer-bar",
                div { class: "viewer-bar-title",
                    button {
                        class: "icon-button",
                        title: "Back to Dashboard",
                        onclick: move |_| {
                            nav.push(Route::Dashboard {});
                        },
                        span { class: "material-symbols-outlined", "arrow_back" }
                    }
                    span { class: "material-symbols-outlined", "description" }
                    span { class: "viewer-bar-name", "Generated Notes" }
                }
                div { class: "viewer-bar-actions",
                    Link { class: "button-secondary", to: Route::Create {},
                        span { class: "material-symbols-outlined", "add_circle" }
                        span { class: "button-label", "New Notes" }
                    }
                    button { class: "button-secondary", onclick: download,
                        span { class: "material-symbols-outlined", "download" }
                        span { class: "button-label", "Download" }
                    }
                }
            }
            article { class: "viewer-page",
                header { class: "viewer-heading",
                    if !document.subject.is_empty() {
                        span { class: "pill", "{document.subject}" }
                    }
                    h1 { "{document.display_title()}" }
                    if !document.subtitle.is_empty() {
                        p { class: "viewer-subtitle", "{document.subtitle}" }
                    }
                }
                EnhancedContent { html: document.content.clone() }
            }
        }
    }
}

#[component]
fn ViewerMessage(icon: &'static str, title: &'static str, detail: String) -> Element {
    rsx! {
        div { class: "viewer-message",
            span { class: "material-symbols-outlined viewer-message-icon", "{icon}" }
            p { class: "viewer-message-title", "{title}" }
            p { class: "viewer-message-detail", "{detail}" }
            Link { class: "button-primary", to: Route::Dashboard {}, "Back to Dashboard" }
        }
    }
}
