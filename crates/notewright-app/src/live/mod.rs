//! Hosts generated content in the page and runs the enhancement pass on it.
//!
//! In the browser the pass works on the real DOM: a mutation observer (with a
//! timer as fallback) says when the content has mounted, KaTeX is loaded on
//! demand, and players and image buttons get native event listeners. Other
//! targets run the same pass in memory and render the result.

use std::rc::Rc;

use dioxus::prelude::*;
use notewright_renderer::LibraryLoader;
use notewright_renderer::export::ExportedDocument;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod attacher;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod download;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod player;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod target;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod watch;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub type PageAttacher = attacher::BrowserAttacher;
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub type PageAttacher = notewright_renderer::loader::Preloaded;

/// One loader for the whole page, so each library is fetched at most once.
pub type SharedLoader = Rc<LibraryLoader<PageAttacher>>;

pub const HOST_ID: &str = "generated-content";

pub fn use_library_loader_provider() -> SharedLoader {
    use_context_provider(|| Rc::new(LibraryLoader::new(PageAttacher::default())))
}

/// Generated HTML, enhanced once it is in the page.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
#[component]
pub fn EnhancedContent(html: ReadSignal<String>) -> Element {
    use std::cell::RefCell;

    let loader = use_context::<SharedLoader>();
    let host = use_hook(|| Rc::new(RefCell::new(target::HostState::default())));

    {
        let host = host.clone();
        use_effect(move || {
            // subscribe: new content means a new generation
            let _ = html.read();
            target::watch_host(HOST_ID, host.clone(), loader.clone());
        });
    }
    {
        let host = host.clone();
        use_drop(move || host.borrow_mut().unmount());
    }

    rsx! {
        div { id: HOST_ID, class: "prose", dangerous_inner_html: "{html}" }
    }
}

/// Generated HTML, enhanced in memory before rendering.
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
#[component]
pub fn EnhancedContent(html: ReadSignal<String>) -> Element {
    let enhanced = use_resource(move || async move {
        let source = html.read().clone();
        match notewright_renderer::enhance_html(&source).await {
            Ok((fragment, _report)) => fragment.to_html(),
            Err(err) => {
                tracing::warn!(error = %err, "enhancement skipped");
                source
            }
        }
    });

    let body = enhanced.read().clone().unwrap_or_default();
    rsx! {
        div { id: HOST_ID, class: "prose", dangerous_inner_html: "{body}" }
    }
}

/// Hand the exported file to the browser. Fire and forget.
pub fn save_exported(exported: &ExportedDocument) {
    #[cfg(all(target_family = "wasm", target_os = "unknown"))]
    if let Err(err) = download::save_text(&exported.contents, exported.mime, &exported.file_name) {
        tracing::warn!(error = ?err, file_name = %exported.file_name, "export download failed");
    }

    #[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
    tracing::info!(
        file_name = %exported.file_name,
        bytes = exported.contents.len(),
        "export ready; saving files needs the web build"
    );
}
