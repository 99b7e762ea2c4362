use std::rc::Rc;

use gloo_timers::callback::Timeout;
use notewright_renderer::readiness::READY_TIMEOUT;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSignal {
    /// Nodes were inserted somewhere under the host
    Mutation,
    Timeout,
}

/// Observer plus fallback timer for one content assignment. Dropping it
/// disconnects the observer and cancels the timer.
pub struct MountWatch {
    observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    _timeout: Timeout,
}

impl MountWatch {
    pub fn start(host: &Element, on_signal: Rc<dyn Fn(WatchSignal)>) -> Result<Self, JsValue> {
        let on_mutation = {
            let on_signal = on_signal.clone();
            Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
                move |_records: js_sys::Array, _observer: MutationObserver| {
                    on_signal(WatchSignal::Mutation)
                },
            )
        };
        let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(host, &init)?;

        let timeout = {
            let on_signal = on_signal.clone();
            Timeout::new(READY_TIMEOUT.as_millis() as u32, move || {
                on_signal(WatchSignal::Timeout)
            })
        };

        // the framework may have inserted the content before we got here
        if host.has_child_nodes() {
            on_signal(WatchSignal::Mutation);
        }

        Ok(Self {
            observer,
            _on_mutation: on_mutation,
            _timeout: timeout,
        })
    }
}

impl Drop for MountWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
