//! At-most-once loading of the external math libraries.
//!
//! The loader is a page-lifetime cache keyed by resource URL. Concurrent
//! callers for the same URL share one in-flight attachment; a completed load
//! is never repeated. A failed load clears its slot so the next enhancement
//! pass (a fresh user action) can ask again.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use futures_util::FutureExt;
use futures_util::future::{Either, LocalBoxFuture, Shared, select};
use miette::Diagnostic;
use smol_str::SmolStr;

pub const KATEX_VERSION: &str = "0.16.9";
pub const KATEX_CSS_URL: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css";
pub const KATEX_JS_URL: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js";
pub const KATEX_AUTO_RENDER_URL: &str =
    "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/contrib/auto-render.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Script,
    Stylesheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub url: SmolStr,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn script(url: &str) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Script,
        }
    }

    pub fn stylesheet(url: &str) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Stylesheet,
        }
    }
}

/// The three pieces the browser needs to typeset math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathStack {
    pub stylesheet: Resource,
    pub engine: Resource,
    pub auto_render: Resource,
}

impl Default for MathStack {
    fn default() -> Self {
        Self {
            stylesheet: Resource::stylesheet(KATEX_CSS_URL),
            engine: Resource::script(KATEX_JS_URL),
            auto_render: Resource::script(KATEX_AUTO_RENDER_URL),
        }
    }
}

/// Cloneable since every waiter on a shared load receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("failed to load {url}: {message}")]
#[diagnostic(
    code(notewright::loader),
    help("math is left as plain text; reopen the document to try again")
)]
pub struct LoadError {
    pub url: SmolStr,
    pub message: String,
}

impl LoadError {
    pub fn new(url: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

pub type LoadFuture = LocalBoxFuture<'static, Result<(), LoadError>>;

/// Puts a resource into the page and reports when it has loaded.
pub trait ResourceAttacher {
    fn attach(&self, resource: &Resource) -> LoadFuture;
}

/// For builds where the math engine is linked in and nothing needs fetching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preloaded;

impl ResourceAttacher for Preloaded {
    fn attach(&self, _resource: &Resource) -> LoadFuture {
        futures_util::future::ready(Ok(())).boxed_local()
    }
}

/// Snapshot of which math scripts are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderState {
    pub math_engine_loaded: bool,
    pub auto_render_loaded: bool,
}

enum Slot {
    Pending {
        attempt: u64,
        load: Shared<LoadFuture>,
    },
    Loaded,
}

pub struct LibraryLoader<A> {
    attacher: A,
    slots: RefCell<HashMap<SmolStr, Slot>>,
    attempts: Cell<u64>,
}

impl<A: ResourceAttacher> LibraryLoader<A> {
    pub fn new(attacher: A) -> Self {
        Self {
            attacher,
            slots: RefCell::new(HashMap::new()),
            attempts: Cell::new(0),
        }
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        matches!(self.slots.borrow().get(url), Some(Slot::Loaded))
    }

    pub fn state(&self, stack: &MathStack) -> LoaderState {
        LoaderState {
            math_engine_loaded: self.is_loaded(&stack.engine.url),
            auto_render_loaded: self.is_loaded(&stack.auto_render.url),
        }
    }

    /// Resolve once `resource` is in the page. Immediate if it already is.
    pub async fn ensure_loaded(&self, resource: &Resource) -> Result<(), LoadError> {
        let (attempt, load) = {
            let mut slots = self.slots.borrow_mut();
            match slots.get(&resource.url) {
                Some(Slot::Loaded) => return Ok(()),
                Some(Slot::Pending { attempt, load }) => (*attempt, load.clone()),
                None => {
                    let attempt = self.attempts.get() + 1;
                    self.attempts.set(attempt);
                    tracing::debug!(url = %resource.url, kind = ?resource.kind, "attaching resource");
                    let load = self.attacher.attach(resource).shared();
                    slots.insert(
                        resource.url.clone(),
                        Slot::Pending {
                            attempt,
                            load: load.clone(),
                        },
                    );
                    (attempt, load)
                }
            }
        };

        let result = load.await;

        let mut slots = self.slots.borrow_mut();
        let ours = matches!(
            slots.get(&resource.url),
            Some(Slot::Pending { attempt: current, .. }) if *current == attempt
        );
        if ours {
            match &result {
                Ok(()) => {
                    tracing::info!(url = %resource.url, "resource loaded");
                    slots.insert(resource.url.clone(), Slot::Loaded);
                }
                Err(err) => {
                    tracing::warn!(url = %resource.url, error = %err, "resource failed to load");
                    slots.remove(&resource.url);
                }
            }
        }
        result
    }

    /// Stylesheet first without waiting on it, then the engine, then the
    /// auto-render scanner. The scanner is never requested before the engine
    /// has resolved.
    pub async fn ensure_math_stack(&self, stack: &MathStack) -> Result<(), LoadError> {
        let stylesheet = self.ensure_loaded(&stack.stylesheet);
        let scripts = async {
            self.ensure_loaded(&stack.engine).await?;
            self.ensure_loaded(&stack.auto_render).await
        };
        futures_util::pin_mut!(stylesheet, scripts);

        match select(stylesheet, scripts).await {
            Either::Right((result, _stylesheet)) => result,
            Either::Left((css, scripts)) => {
                if let Err(err) = css {
                    // layout degrades, rendering still works
                    tracing::warn!(error = %err, "math stylesheet failed");
                }
                scripts.await
            }
        }
    }
}
