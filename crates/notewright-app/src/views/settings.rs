use std::rc::Rc;

use dioxus::prelude::*;
use notewright_common::credential::{CredentialStore, default_store, mask_credential};

const SETTINGS_CSS: Asset = asset!("/assets/styling/settings.css");

/// API key management. The key lives in local storage as plain text.
#[component]
pub fn Settings() -> Element {
    let store = use_hook(|| Rc::new(default_store()));
    let initial = use_hook({
        let store = store.clone();
        move || store.load().map_err(|err| err.to_string())
    });

    let mut stored = use_signal(|| initial.clone().ok().flatten());
    let mut draft = use_signal(|| stored.peek().clone().unwrap_or_default());
    let mut revealed = use_signal(|| false);
    let mut saving = use_signal(|| false);
    let mut saved = use_signal(|| false);
    let mut failure = use_signal(|| initial.clone().err());

    let save = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            async move {
                let value = draft.read().trim().to_string();
                if value.is_empty() || saving() {
                    return;
                }
                saving.set(true);
                failure.set(None);

                #[cfg(all(target_family = "wasm", target_os = "unknown"))]
                gloo_timers::future::TimeoutFuture::new(500).await;

                match store.save(&value) {
                    Ok(()) => {
                        tracing::info!(key = %mask_credential(&value), "API key saved");
                        stored.set(Some(value));
                        saving.set(false);
                        saved.set(true);

                        #[cfg(all(target_family = "wasm", target_os = "unknown"))]
                        {
                            gloo_timers::future::TimeoutFuture::new(3000).await;
                            saved.set(false);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "could not save API key");
                        failure.set(Some(err.to_string()));
                        saving.set(false);
                    }
                }
            }
        }
    };

    let clear = move |_| match store.clear() {
        Ok(()) => {
            stored.set(None);
            draft.set(String::new());
            saved.set(false);
            failure.set(None);
        }
        Err(err) => failure.set(Some(err.to_string())),
    };

    let has_draft = !draft.read().is_empty();
    let input_type = if revealed() { "text" } else { "password" };

    rsx! {
        document::Link { rel: "stylesheet", href: SETTINGS_CSS }

        div { class: "settings",
            header { class: "settings-heading",
                h1 { "Settings" }
                p { "Manage your account settings and API configuration" }
            }

            section { class: "settings-card",
                div { class: "settings-card-intro",
                    span { class: "settings-card-icon material-symbols-outlined", "key" }
                    div {
                        h2 { "Anthropic API Key" }
                        p {
                            "Configure your Anthropic API key to enable AI-powered note generation. "
                            "Your API key is stored locally and never sent to our servers."
                        }
                    }
                }

                label { class: "field-label", r#for: "api-key", "API Key" }
                div { class: "key-field",
                    input {
                        id: "api-key",
                        r#type: input_type,
                        placeholder: "sk-ant-api03-...",
                        autocomplete: "off",
                        value: "{draft}",
                        oninput: move |evt| draft.set(evt.value()),
                    }
                    button {
                        class: "icon-button",
                        aria_label: if revealed() { "Hide API key" } else { "Show API key" },
                        onclick: move |_| revealed.toggle(),
                        span { class: "material-symbols-outlined",
                            if revealed() { "visibility_off" } else { "visibility" }
                        }
                    }
                }
                p { class: "field-hint",
                    "Get your API key from "
                    a {
                        href: "https://console.anthropic.com/",
                        target: "_blank",
                        rel: "noopener noreferrer",
                        "console.anthropic.com"
                    }
                }

                if let Some(key) = stored() {
                    p { class: "key-current",
                        "Saved key: "
                        code { "{mask_credential(&key)}" }
                    }
                }

                if saved() {
                    div { class: "notice notice-success",
                        span { class: "material-symbols-outlined", "check_circle" }
                        span { "API key saved successfully!" }
                    }
                }
                if let Some(message) = failure() {
                    div { class: "notice notice-error",
                        span { class: "material-symbols-outlined", "error" }
                        span { "{message}" }
                    }
                }

                div { class: "settings-actions",
                    button {
                        class: "button-primary",
                        disabled: saving() || !has_draft,
                        onclick: save,
                        if saving() {
                            span { class: "material-symbols-outlined spin", "refresh" }
                            "Saving..."
                        } else {
                            span { class: "material-symbols-outlined", "save" }
                            "Save API Key"
                        }
                    }
                    button {
                        class: "button-secondary",
                        disabled: !has_draft && stored().is_none(),
                        onclick: clear,
                        span { class: "material-symbols-outlined", "delete" }
                        "Clear"
                    }
                }
            }

            aside { class: "settings-info",
                span { class: "material-symbols-outlined", "info" }
                div {
                    h3 { "About API Keys" }
                    p {
                        "Your API key is kept in this browser's local storage as plain text. "
                        "Anyone with access to this browser profile can read it, so clear it on shared machines. "
                        "It is never sent to our servers."
                    }
                }
            }
        }
    }
}
