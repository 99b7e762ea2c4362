//! Browser file saves: Blob, object URL, temporary anchor, click, revoke.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Response, Url};

pub fn save_text(contents: &str, mime: &str, file_name: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    save_blob(&blob, file_name)
}

fn save_blob(blob: &Blob, file_name: &str) -> Result<(), JsValue> {
    let url = Url::create_object_url_with_blob(blob)?;
    let clicked = click_anchor(&url, file_name);
    Url::revoke_object_url(&url)?;
    clicked
}

fn click_anchor(href: &str, file_name: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no <body>"))?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(href);
    anchor.set_download(file_name);
    anchor.style().set_property("display", "none")?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    tracing::info!(file_name, "download started");
    Ok(())
}

/// Save the resource at `url`. Fetching first lets the saved file take our
/// name even for cross-origin media; if the fetch fails the browser is
/// pointed at the URL directly.
pub fn save_url(url: String, file_name: String) {
    wasm_bindgen_futures::spawn_local(async move {
        let saved = match fetch_blob(&url).await {
            Ok(blob) => save_blob(&blob, &file_name),
            Err(err) => {
                tracing::debug!(url, error = ?err, "fetch failed, linking directly");
                click_anchor(&url, &file_name)
            }
        };
        if let Err(err) = saved {
            tracing::warn!(url, error = ?err, "download failed");
        }
    });
}

async fn fetch_blob(url: &str) -> Result<Blob, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let blob: Blob = JsFuture::from(response.blob()?).await?.dyn_into()?;
    Ok(blob)
}
