use crate::Route;
use crate::components::LoadingScreen;
use dioxus::prelude::*;
use notewright_common::upload::{
    MAX_PROMPT_CHARS, MAX_TOTAL_PAGES, accept_prompt_edit, validate_prompt,
};
use notewright_common::{ApiClient, IncomingFile, UploadBatch};

const CREATE_CSS: Asset = asset!("/assets/styling/create.css");

const GENERATING_MESSAGES: &[&str] = &[
    "Analyzing documents...",
    "Understanding your question...",
    "Generating visual explanations...",
];

struct Suggestion {
    icon: &'static str,
    tone: &'static str,
    label: &'static str,
    prompt: &'static str,
}

const SUGGESTIONS: &[Suggestion] = &[
    Suggestion {
        icon: "science",
        tone: "tone-purple",
        label: "Quantum Entanglement",
        prompt: "Explain quantum entanglement in simple terms",
    },
    Suggestion {
        icon: "calculate",
        tone: "tone-green",
        label: "Solve for X",
        prompt: "Solve the equation: 2x² + 5x - 3 = 0",
    },
    Suggestion {
        icon: "summarize",
        tone: "tone-amber",
        label: "Summarize Theorem",
        prompt: "Summarize the Pythagorean theorem and its applications",
    },
];

/// Prompt and uploads for a new generation. On success the new document
/// opens in the viewer.
#[component]
pub fn Create() -> Element {
    let client = use_context::<ApiClient>();
    let nav = use_navigator();

    let mut prompt = use_signal(String::new);
    let mut batch = use_signal(UploadBatch::new);
    let mut upload_error = use_signal(|| None::<String>);
    let mut submit_error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let add_files = move |evt: FormEvent| async move {
        let mut incoming = Vec::new();
        let mut unreadable = None;
        for file in evt.files() {
            let name = file.name();
            match file.read_bytes().await {
                // declared types are unreliable across browsers, so the batch sniffs
                Ok(bytes) => incoming.push(IncomingFile::new(name, "", bytes.to_vec())),
                Err(err) => {
                    tracing::warn!(error = ?err, name = %name, "could not read selected file");
                    unreadable = Some(format!("{name} could not be read"));
                }
            }
        }
        let outcome = batch.write().add_files(incoming);
        tracing::debug!(accepted = outcome.accepted, "files added");
        upload_error.set(outcome.error.map(|err| err.to_string()).or(unreadable));
    };

    let submit = move |_| {
        let client = client.clone();
        async move {
            let text = prompt.read().clone();
            if submitting() || validate_prompt(&text).is_err() {
                return;
            }
            submitting.set(true);
            submit_error.set(None);

            let entries = batch.read().entries().to_vec();
            match client.generate(&text, &entries).await {
                Ok(created) => {
                    tracing::info!(id = %created.id, "generation finished");
                    nav.push(Route::Viewer {
                        id: created.id.to_string(),
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "generation failed");
                    submit_error.set(Some(err.to_string()));
                    submitting.set(false);
                }
            }
        }
    };

    let char_count = prompt.read().chars().count();
    let counter_class = if char_count * 10 > MAX_PROMPT_CHARS * 9 {
        "char-count char-count-warn"
    } else {
        "char-count"
    };
    let entries = batch.read().entries().to_vec();
    let total_pages = batch.read().total_pages();
    let can_submit = !prompt.read().trim().is_empty() && !submitting();

    rsx! {
        document::Link { rel: "stylesheet", href: CREATE_CSS }

        if submitting() {
            LoadingScreen { messages: GENERATING_MESSAGES, overlay: true }
        }

        div { class: "create",
            div { class: "create-paper" }
            div { class: "create-column",
                header { class: "create-heading",
                    h1 {
                        "What shall we "
                        br {}
                        em { "create" }
                        " today?"
                    }
                    p {
                        "Turn any topic into visual notes complete with animations, diagrams, and clear explanations."
                    }
                }

                div { class: "prompt-card",
                    div { class: "prompt-toolbar",
                        span { class: "prompt-label",
                            span { class: "material-symbols-outlined", "edit" }
                            "Your question"
                        }
                        label { class: "upload-button",
                            span { class: "material-symbols-outlined", "upload" }
                            span { "Upload file (PDF or Image)" }
                            input {
                                r#type: "file",
                                multiple: true,
                                accept: "image/*,application/pdf",
                                onchange: add_files,
                            }
                        }
                    }

                    textarea {
                        class: "prompt-input",
                        placeholder: "Type your question here, e.g., 'Explain the probability problem in the uploaded PDF in simple terms'...",
                        maxlength: "{MAX_PROMPT_CHARS}",
                        value: "{prompt}",
                        oninput: move |evt| {
                            accept_prompt_edit(&mut prompt.write(), evt.value());
                        },
                    }

                    if !entries.is_empty() {
                        ul { class: "upload-list",
                            for (index, entry) in entries.into_iter().enumerate() {
                                li { key: "{index}-{entry.name}", class: "upload-entry",
                                    match entry.preview_url.as_deref() {
                                        Some(preview) => rsx! { img { class: "upload-thumb", src: "{preview}", alt: "{entry.name}" } },
                                        None => rsx! { span { class: "upload-icon material-symbols-outlined", "{entry.kind.icon()}" } },
                                    }
                                    div { class: "upload-meta",
                                        span { class: "upload-name", "{entry.name}" }
                                        span { class: "upload-pages", "{entry.pages_label()}" }
                                    }
                                    button {
                                        class: "upload-remove",
                                        title: "Remove",
                                        onclick: move |_| {
                                            batch.write().remove(index);
                                            upload_error.set(None);
                                        },
                                        span { class: "material-symbols-outlined", "close" }
                                    }
                                }
                            }
                        }
                        p { class: "upload-total", "{total_pages}/{MAX_TOTAL_PAGES} pages" }
                    }

                    if let Some(message) = upload_error() {
                        p { class: "upload-error",
                            span { class: "material-symbols-outlined", "warning" }
                            "{message}"
                        }
                    }

                    div { class: "prompt-footer",
                        span { class: counter_class, "{char_count}/{MAX_PROMPT_CHARS}" }
                    }
                }

                div { class: "create-actions",
                    button {
                        class: "button-generate",
                        disabled: !can_submit,
                        onclick: submit,
                        span { class: "material-symbols-outlined", "school" }
                        "Generate Notes"
                    }

                    div { class: "suggestions",
                        for suggestion in SUGGESTIONS {
                            button {
                                key: "{suggestion.label}",
                                class: "suggestion",
                                onclick: move |_| {
                                    prompt.set(suggestion.prompt.to_string());
                                },
                                span { class: "material-symbols-outlined {suggestion.tone}", "{suggestion.icon}" }
                                "{suggestion.label}"
                            }
                        }
                    }

                    if let Some(message) = submit_error() {
                        div { class: "submit-error",
                            span { class: "material-symbols-outlined", "error" }
                            span { "{message}" }
                        }
                    }
                }

                p { class: "create-tip",
                    span { class: "material-symbols-outlined", "lightbulb" }
                    "Pro tip: Upload PDFs or images (max 10 pages total) for visual analysis."
                }
            }
        }
    }
}
