use futures_util::FutureExt;
use js_sys::Promise;
use notewright_renderer::loader::{LoadError, LoadFuture, Resource, ResourceAttacher, ResourceKind};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlLinkElement, HtmlScriptElement};

/// Appends `<script>` / `<link>` tags to `<head>` and waits for their
/// `load` or `error` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAttacher;

impl ResourceAttacher for BrowserAttacher {
    fn attach(&self, resource: &Resource) -> LoadFuture {
        let resource = resource.clone();
        async move {
            let loaded = append_to_head(&resource)
                .map_err(|err| LoadError::new(resource.url.clone(), format!("{err:?}")))?;
            JsFuture::from(loaded)
                .await
                .map(|_| ())
                .map_err(|_| LoadError::new(resource.url.clone(), "the browser reported a load error"))
        }
        .boxed_local()
    }
}

fn append_to_head(resource: &Resource) -> Result<Promise, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("document has no <head>"))?;

    let element: HtmlElement = match resource.kind {
        ResourceKind::Script => {
            let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
            script.set_src(&resource.url);
            // execution order matters: the scanner needs the engine
            script.set_async(false);
            script.into()
        }
        ResourceKind::Stylesheet => {
            let link: HtmlLinkElement = document.create_element("link")?.dyn_into()?;
            link.set_rel("stylesheet");
            link.set_href(&resource.url);
            link.into()
        }
    };

    let loaded = Promise::new(&mut |resolve, reject| {
        element.set_onload(Some(&resolve));
        element.set_onerror(Some(&reject));
    });
    head.append_child(&element)?;
    Ok(loaded)
}
