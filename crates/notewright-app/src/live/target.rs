use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo_events::EventListener;
use notewright_renderer::download::image_file_name;
use notewright_renderer::enhance::{
    IMAGE_BUTTON_CLASS, IMAGE_BUTTON_MARKUP, IMAGE_WRAPPER_CLASS, INITIALIZED_ATTR,
    PLACEHOLDER_CLASS, VIDEO_SRC_ATTR,
};
use notewright_renderer::readiness::Generation;
use notewright_renderer::{
    EnhanceError, EnhanceTarget, EnhancementPass, MathConfig, MathOutcome, MathStack,
    MountReadiness, PassGuard,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlImageElement};

use super::SharedLoader;
use super::download;
use super::player::LivePlayer;
use super::watch::{MountWatch, WatchSignal};

/// Everything the page holds on to for the currently mounted content.
#[derive(Default)]
pub struct Attachments {
    players: Vec<LivePlayer>,
    listeners: Vec<EventListener>,
}

impl Attachments {
    fn absorb(&mut self, other: Attachments) {
        self.players.extend(other.players);
        self.listeners.extend(other.listeners);
    }
}

#[derive(Default)]
pub struct HostState {
    readiness: MountReadiness,
    guard: PassGuard,
    watch: Option<MountWatch>,
    attachments: Attachments,
}

impl HostState {
    /// Forget the current content. In-flight passes see a stale generation
    /// and stop.
    pub fn unmount(&mut self) {
        self.readiness.reset();
        self.watch = None;
        self.attachments = Attachments::default();
    }
}

/// Start watching the host for the content that was just assigned.
pub fn watch_host(host_id: &str, state: Rc<RefCell<HostState>>, loader: SharedLoader) {
    let Some(host) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(host_id))
    else {
        tracing::warn!(host_id, "content host is not in the page");
        return;
    };

    let generation = {
        let mut current = state.borrow_mut();
        current.watch = None;
        current.attachments = Attachments::default();
        current.readiness.watch()
    };

    let on_signal: Rc<dyn Fn(WatchSignal)> = {
        let state = state.clone();
        let host = host.clone();
        Rc::new(move |signal| {
            let ready = {
                let mut current = state.borrow_mut();
                match signal {
                    WatchSignal::Mutation => current
                        .readiness
                        .on_mutation(generation, host.has_child_nodes()),
                    WatchSignal::Timeout => current.readiness.on_timeout(generation),
                }
            };
            if let Some(ready) = ready {
                tracing::debug!(generation = ready.generation.get(), cause = ?ready.cause, "content mounted");
                run_pass(ready.generation, host.clone(), state.clone(), loader.clone());
            }
        })
    };

    match MountWatch::start(&host, on_signal) {
        Ok(watch) => {
            let mut current = state.borrow_mut();
            if current.readiness.is_current(generation) {
                current.watch = Some(watch);
            }
        }
        Err(err) => tracing::error!(error = ?err, "could not observe the content host"),
    }
}

fn run_pass(
    generation: Generation,
    host: Element,
    state: Rc<RefCell<HostState>>,
    loader: SharedLoader,
) {
    let Some(ticket) = state.borrow_mut().guard.begin(generation) else {
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let stack = MathStack::default();
        let config = MathConfig::default();
        let pass = EnhancementPass {
            loader: loader.as_ref(),
            stack: &stack,
            config: &config,
        };
        let mut target = LiveTarget::new(host);
        let result = pass
            .run(&mut target, ticket, |g| state.borrow().readiness.is_current(g))
            .await;

        match result {
            Ok(_) => {
                let mut current = state.borrow_mut();
                if current.readiness.is_current(generation) {
                    current.attachments.absorb(target.attachments);
                }
            }
            Err(err) => tracing::debug!(error = %err, "enhancement pass abandoned"),
        }
    });
}

/// The host element as seen by the enhancement pass.
pub struct LiveTarget {
    host: Element,
    attachments: Attachments,
}

impl LiveTarget {
    fn new(host: Element) -> Self {
        Self {
            host,
            attachments: Attachments::default(),
        }
    }

    fn select_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.host.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

fn dom_error(err: JsValue) -> EnhanceError {
    EnhanceError::Dom(format!("{err:?}"))
}

fn non_empty_source(el: &Element) -> Option<String> {
    el.get_attribute(VIDEO_SRC_ATTR)
        .filter(|src| !src.trim().is_empty())
}

impl EnhanceTarget for LiveTarget {
    type Node = Element;

    fn unclaimed_placeholders(&self) -> Vec<Element> {
        self.select_all(&format!(".{PLACEHOLDER_CLASS}"))
            .into_iter()
            .filter(|el| !el.has_attribute(INITIALIZED_ATTR))
            .filter(|el| non_empty_source(el).is_some())
            .collect()
    }

    fn placeholder_source(&self, node: &Element) -> Option<String> {
        // the browser has already decoded entities in attribute values
        non_empty_source(node)
    }

    fn mark_initialized(&mut self, node: &Element) {
        if let Err(err) = node.set_attribute(INITIALIZED_ATTR, "true") {
            tracing::warn!(error = ?err, "could not flag placeholder");
        }
    }

    fn mount_player(&mut self, node: &Element, src: &str) -> Result<(), EnhanceError> {
        let player = LivePlayer::mount(node, src).map_err(|err| EnhanceError::PlayerMount {
            src: src.to_string(),
            message: format!("{err:?}"),
        })?;
        self.attachments.players.push(player);
        Ok(())
    }

    fn render_math(&mut self, config: &MathConfig) -> Result<MathOutcome, EnhanceError> {
        let window = web_sys::window().ok_or_else(|| EnhanceError::Dom("no window".into()))?;
        let scan = js_sys::Reflect::get(&window, &JsValue::from_str("renderMathInElement"))
            .map_err(dom_error)?;
        let scan: js_sys::Function = scan
            .dyn_into()
            .map_err(|_| EnhanceError::Dom("renderMathInElement is not defined".into()))?;

        let json = serde_json::to_string(config).map_err(|err| EnhanceError::Dom(err.to_string()))?;
        let options = js_sys::JSON::parse(&json).map_err(dom_error)?;
        js_sys::Reflect::set(&options, &JsValue::from_str("throwOnError"), &JsValue::FALSE)
            .map_err(dom_error)?;
        js_sys::Reflect::set(&options, &JsValue::from_str("strict"), &JsValue::FALSE)
            .map_err(dom_error)?;

        scan.call2(&JsValue::NULL, &self.host, &options)
            .map_err(dom_error)?;
        Ok(MathOutcome::Scanned)
    }

    fn unwrapped_images(&self) -> Vec<Element> {
        self.select_all("img")
            .into_iter()
            .filter(|img| {
                !img.parent_element()
                    .is_some_and(|parent| parent.class_list().contains(IMAGE_WRAPPER_CLASS))
            })
            .collect()
    }

    fn wrap_image(&mut self, node: &Element) -> Result<(), EnhanceError> {
        let parent = node
            .parent_node()
            .ok_or_else(|| EnhanceError::Dom("image is detached".into()))?;
        let document = node
            .owner_document()
            .ok_or_else(|| EnhanceError::Dom("image has no document".into()))?;

        let wrapper = document.create_element("div").map_err(dom_error)?;
        wrapper.set_class_name(IMAGE_WRAPPER_CLASS);
        let image: &web_sys::Node = node;
        parent.insert_before(&wrapper, Some(image)).map_err(dom_error)?;
        wrapper.append_child(image).map_err(dom_error)?;
        wrapper
            .insert_adjacent_html("beforeend", IMAGE_BUTTON_MARKUP)
            .map_err(dom_error)?;
        let button = wrapper
            .query_selector(&format!(".{IMAGE_BUTTON_CLASS}"))
            .map_err(dom_error)?
            .ok_or_else(|| EnhanceError::Dom("download button did not parse".into()))?;

        let img = node.clone();
        let listener = EventListener::new(&button, "click", move |event| {
            event.prevent_default();
            event.stop_propagation();
            let src = img
                .dyn_ref::<HtmlImageElement>()
                .map(|i| i.current_src())
                .filter(|src| !src.is_empty())
                .or_else(|| img.get_attribute("src"));
            if let Some(src) = src {
                download::save_url(src, image_file_name(Utc::now()));
            }
        });
        self.attachments.listeners.push(listener);
        Ok(())
    }
}
