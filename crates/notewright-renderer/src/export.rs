//! Standalone HTML export of a generated document.
//!
//! The exported file carries no app runtime. Styling is inlined, fonts and
//! (optionally) KaTeX come from their CDNs, and a plain-DOM script performs
//! the same enhancement steps as the live pass, configured from a JSON block
//! generated out of the constants in this crate.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use miette::IntoDiagnostic;
use notewright_common::Document;
use pulldown_cmark_escape::{FmtWriter, escape_html};
use serde::Serialize;

use crate::css::{EXPORT_LAYOUT_CSS, generate_stylesheet};
use crate::delimiters::MathConfig;
use crate::dom::Fragment;
use crate::download::{HTML_MIME, export_file_name};
use crate::enhance::{
    IMAGE_BUTTON_CLASS, IMAGE_BUTTON_MARKUP, IMAGE_WRAPPER_CLASS, INITIALIZED_ATTR,
    PLACEHOLDER_CLASS, VIDEO_SRC_ATTR,
};
use crate::loader::{KATEX_AUTO_RENDER_URL, KATEX_CSS_URL, KATEX_JS_URL};
use crate::math::render_math_in;
use crate::player::{PLAYER_MARKUP, selectors};
use crate::theme::{FONT_IMPORT_URL, ICON_FONT_URL, Theme};

const ENHANCE_SCRIPT: &str = include_str!("export/enhance.js");
const CONFIG_ELEMENT_ID: &str = "notewright-config";

pub const BRAND_NAME: &str = "Notewright";
pub const BRAND_TAGLINE: &str = "Generated Multimodal Study Material";
pub const FOOTER_TEXT: &str = "© 2024 Notewright. Generated content.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MathDelivery {
    /// Link KaTeX from its CDN and typeset when the file is opened
    #[default]
    Cdn,
    /// Typeset to MathML now; the file needs no network for math
    Prerendered,
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub math: MathDelivery,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime: &'static str,
    pub contents: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptSelectors {
    container: &'static str,
    center_play: &'static str,
    controls: &'static str,
    progress_bar: &'static str,
    progress_filled: &'static str,
    play_pause: &'static str,
    volume_button: &'static str,
    volume_slider: &'static str,
    current_time: &'static str,
    duration: &'static str,
    download: &'static str,
    fullscreen: &'static str,
    hidden: &'static str,
}

impl ScriptSelectors {
    fn new() -> Self {
        Self {
            container: selectors::CONTAINER,
            center_play: selectors::CENTER_PLAY,
            controls: selectors::CONTROLS,
            progress_bar: selectors::PROGRESS_BAR,
            progress_filled: selectors::PROGRESS_FILLED,
            play_pause: selectors::PLAY_PAUSE,
            volume_button: selectors::VOLUME_BUTTON,
            volume_slider: selectors::VOLUME_SLIDER,
            current_time: selectors::CURRENT_TIME,
            duration: selectors::DURATION,
            download: selectors::DOWNLOAD,
            fullscreen: selectors::FULLSCREEN,
            hidden: selectors::HIDDEN,
        }
    }
}

/// What the embedded script reads at startup.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptConfig<'a> {
    #[serde(flatten)]
    math: &'a MathConfig,
    render_math: bool,
    placeholder_class: &'static str,
    source_attr: &'static str,
    initialized_attr: &'static str,
    player_markup: &'static str,
    image_wrapper_class: &'static str,
    image_button_class: &'static str,
    image_button_markup: &'static str,
    selectors: ScriptSelectors,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = escape_html(FmtWriter(&mut out), text);
    out
}

/// JSON that can sit inside a `<script>` element.
fn script_safe_json(value: &impl Serialize) -> miette::Result<String> {
    let json = serde_json::to_string(value).into_diagnostic()?;
    Ok(json.replace("</", r"<\/"))
}

pub fn export_document(
    doc: &Document,
    options: &ExportOptions,
    now: DateTime<Utc>,
) -> miette::Result<ExportedDocument> {
    let math_config = MathConfig::default();

    let content = match options.math {
        MathDelivery::Cdn => doc.content.clone(),
        MathDelivery::Prerendered => {
            let mut fragment = Fragment::parse(&doc.content);
            let root = fragment.root();
            let stats = render_math_in(&mut fragment, root, &math_config);
            tracing::debug!(rendered = stats.rendered, failed = stats.failed, "prerendered math");
            fragment.to_html()
        }
    };

    let config = ScriptConfig {
        math: &math_config,
        render_math: options.math == MathDelivery::Cdn,
        placeholder_class: PLACEHOLDER_CLASS,
        source_attr: VIDEO_SRC_ATTR,
        initialized_attr: INITIALIZED_ATTR,
        player_markup: PLAYER_MARKUP,
        image_wrapper_class: IMAGE_WRAPPER_CLASS,
        image_button_class: IMAGE_BUTTON_CLASS,
        image_button_markup: IMAGE_BUTTON_MARKUP,
        selectors: ScriptSelectors::new(),
    };
    let config_json = script_safe_json(&config)?;

    let mut html = String::with_capacity(content.len() + 32 * 1024);
    write_head(&mut html, doc, options).into_diagnostic()?;
    write_body(&mut html, &content, &config_json, options.math).into_diagnostic()?;

    let file_name = export_file_name(now);
    tracing::info!(id = %doc.id, file_name = %file_name, bytes = html.len(), math = ?options.math, "exported document");
    Ok(ExportedDocument {
        file_name,
        mime: HTML_MIME,
        contents: html,
    })
}

fn write_head(out: &mut String, doc: &Document, options: &ExportOptions) -> std::fmt::Result {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    writeln!(
        out,
        "  <title>{} - {BRAND_NAME}</title>",
        escape(doc.display_title())
    )?;

    out.push_str("  <link rel=\"preconnect\" href=\"https://fonts.googleapis.com\">\n");
    out.push_str("  <link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin>\n");
    writeln!(out, "  <link rel=\"stylesheet\" href=\"{FONT_IMPORT_URL}\">")?;
    writeln!(out, "  <link rel=\"stylesheet\" href=\"{ICON_FONT_URL}\">")?;
    if options.math == MathDelivery::Cdn {
        writeln!(out, "  <link rel=\"stylesheet\" href=\"{KATEX_CSS_URL}\">")?;
    }

    out.push_str("  <style>\n");
    out.push_str(&generate_stylesheet(&options.theme));
    out.push_str(EXPORT_LAYOUT_CSS);
    out.push_str("  </style>\n</head>\n");
    Ok(())
}

fn write_body(
    out: &mut String,
    content: &str,
    config_json: &str,
    math: MathDelivery,
) -> std::fmt::Result {
    out.push_str("<body>\n  <div class=\"page\">\n");
    writeln!(
        out,
        r#"    <header class="page-header">
      <div class="page-brand">
        <div class="page-logo"><span class="material-symbols-outlined">school</span></div>
        <h1 class="page-title">{BRAND_NAME}</h1>
      </div>
      <p class="page-subtitle">{BRAND_TAGLINE}</p>
    </header>"#
    )?;

    out.push_str("    <main class=\"page-content prose\">\n");
    out.push_str(content);
    out.push_str("\n    </main>\n");

    writeln!(
        out,
        "    <footer class=\"page-footer\"><p>{FOOTER_TEXT}</p></footer>\n  </div>"
    )?;

    if math == MathDelivery::Cdn {
        writeln!(out, "  <script src=\"{KATEX_JS_URL}\"></script>")?;
        writeln!(out, "  <script src=\"{KATEX_AUTO_RENDER_URL}\"></script>")?;
    }
    writeln!(
        out,
        "  <script type=\"application/json\" id=\"{CONFIG_ELEMENT_ID}\">{config_json}</script>"
    )?;
    out.push_str("  <script>\n");
    out.push_str(ENHANCE_SCRIPT);
    out.push_str("  </script>\n</body>\n</html>\n");
    Ok(())
}

#[cfg(test)]
mod tests;
