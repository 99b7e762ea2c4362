use crate::Route;
use chrono::Utc;
use dioxus::prelude::*;
use notewright_common::library::{
    COLLAPSED_ROWS, DashboardStats, filter_documents, relative_age, visible_rows,
};
use notewright_common::{ApiClient, Document};

const DASHBOARD_CSS: Asset = asset!("/assets/styling/dashboard.css");

/// The Dashboard page: activity stats and the searchable list of generated notes.
#[component]
pub fn Dashboard() -> Element {
    let client = use_context::<ApiClient>();
    let documents = use_resource(move || {
        let client = client.clone();
        async move { client.list_documents().await }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: DASHBOARD_CSS }

        div { class: "dashboard",
            div { class: "dashboard-welcome",
                h1 { "Welcome back." }
                p {
                    "Your canvas awaits. You have fresh generations available to help you transform any topic into rich visual notes."
                }
            }
            match &*documents.read_unchecked() {
                Some(Ok(list)) => rsx! {
                    div { class: "dashboard-grid",
                        StatsCard { stats: DashboardStats::from_documents(list, Utc::now()) }
                        QuoteCard {}
                    }
                    ConceptsList { documents: list.clone() }
                },
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "could not load the library");
                    rsx! {
                        div { class: "dashboard-status dashboard-error", "Error: {err}" }
                    }
                }
                None => rsx! {
                    div { class: "dashboard-status", "Loading articles..." }
                },
            }
        }
    }
}

#[component]
fn StatsCard(stats: DashboardStats) -> Element {
    let usage = format!("{:.0}%", stats.usage_fraction() * 100.0);
    rsx! {
        div { class: "stats-card",
            div { class: "stats-body",
                div { class: "stats-eyebrow",
                    span { class: "material-symbols-outlined", "bolt" }
                    span { "Recent Activity" }
                }
                div { class: "stats-count",
                    span { class: "stats-number", "{stats.generations_used}" }
                    span { class: "pill", "Total Notes" }
                }
                div { class: "stats-meter", title: "{stats.generations_used} of {stats.generations_total}",
                    div { class: "stats-meter-fill", style: "width: {usage}" }
                }
                p { class: "stats-latest",
                    "Last created: "
                    strong { "{stats.days_since_latest} days ago" }
                    "."
                }
            }
            Link { class: "button-primary", to: Route::Create {},
                span { class: "material-symbols-outlined", "add" }
                "Create Notes"
            }
        }
    }
}

#[component]
fn QuoteCard() -> Element {
    rsx! {
        div { class: "quote-card",
            span { class: "material-symbols-outlined", "format_quote" }
            p { "If I can't picture it. I can't understand it." }
            cite { "Albert Einstein" }
        }
    }
}

#[component]
fn ConceptsList(documents: Vec<Document>) -> Element {
    let mut query = use_signal(String::new);
    let mut show_all = use_signal(|| false);

    let query_text = query.read().clone();
    let matches = filter_documents(&documents, &query_text);
    let total = matches.len();
    let rows = visible_rows(&matches, show_all());
    let now = Utc::now();

    rsx! {
        section { class: "concepts",
            div { class: "concepts-header",
                div {
                    h2 { "Recent Notes" }
                    p { "Review your previously generated study materials." }
                }
                label { class: "search",
                    span { class: "material-symbols-outlined", "search" }
                    input {
                        r#type: "search",
                        placeholder: "Search your library...",
                        value: "{query}",
                        oninput: move |evt| {
                            query.set(evt.value());
                            show_all.set(false);
                        },
                    }
                }
            }

            if rows.is_empty() {
                div { class: "concepts-empty",
                    span { class: "material-symbols-outlined", "search_off" }
                    p {
                        if query_text.trim().is_empty() {
                            "No articles yet. Create your first concept to get started!"
                        } else {
                            "No articles found matching your search."
                        }
                    }
                }
            } else {
                div { class: "concepts-table",
                    div { class: "concepts-columns",
                        div { class: "col-topic", "Topic" }
                        div { class: "col-subject", "Subject" }
                        div { class: "col-created", "Created" }
                        div { class: "col-action", "Action" }
                    }
                    for document in rows.iter() {
                        ConceptRow {
                            key: "{document.id}",
                            document: (*document).clone(),
                            created: document.created_at().map(|at| relative_age(at, now)),
                        }
                    }
                }
                if total > COLLAPSED_ROWS {
                    div { class: "concepts-more",
                        button {
                            class: "button-pill",
                            onclick: move |_| show_all.toggle(),
                            if show_all() {
                                "Show less"
                            } else {
                                "View all generated concepts ({total})"
                            }
                            span {
                                class: if show_all() { "material-symbols-outlined flipped" } else { "material-symbols-outlined" },
                                "expand_more"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ConceptRow(document: Document, created: Option<String>) -> Element {
    let nav = use_navigator();
    let id = document.id.to_string();
    let subject = if document.subject.is_empty() {
        "General".to_string()
    } else {
        document.subject.clone()
    };

    rsx! {
        button {
            class: "concept-row",
            onclick: move |_| {
                nav.push(Route::Viewer { id: id.clone() });
            },
            div { class: "col-topic",
                span { class: "concept-icon material-symbols-outlined", "school" }
                div {
                    h3 { "{document.display_title()}" }
                    p { class: "concept-subtitle", "{document.subtitle}" }
                }
            }
            div { class: "col-subject",
                span { class: "pill", "{subject}" }
            }
            div { class: "col-created", {created.unwrap_or_default()} }
            div { class: "col-action",
                span { class: "material-symbols-outlined", "arrow_forward" }
            }
        }
    }
}
