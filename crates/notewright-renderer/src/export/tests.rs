use std::collections::BTreeSet;

use chrono::TimeZone;
use notewright_common::DocumentId;

use super::*;
use crate::enhance::{EnhanceTarget, INITIALIZED_ATTR};

fn doc(content: &str) -> Document {
    Document {
        id: DocumentId::new("42"),
        title: "Waves & <Oscillation>".into(),
        subtitle: "Simple harmonic motion".into(),
        subject: "Physics".into(),
        content: content.into(),
        date_created: None,
    }
}

fn two_videos_one_equation() -> Document {
    doc(concat!(
        r#"<section><h2>Springs</h2>"#,
        r#"<div class="custom-video-player" data-video-src="/media/spring.mp4"></div>"#,
        r#"<p>Newton: $$F = ma$$</p>"#,
        r#"<div class="custom-video-player" data-video-src="/media/pendulum.mp4"></div>"#,
        r#"<img src="/media/diagram.png" alt="diagram"></section>"#,
    ))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 5, 8, 30, 0).unwrap()
}

/// The JSON config embedded in the exported page.
fn embedded_config(html: &str) -> serde_json::Value {
    let marker = format!(r#"id="{CONFIG_ELEMENT_ID}">"#);
    let start = html.find(&marker).unwrap() + marker.len();
    let end = start + html[start..].find("</script>").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

#[test]
fn file_name_and_mime() {
    let exported = export_document(&doc("<p>hi</p>"), &ExportOptions::default(), now()).unwrap();
    assert_eq!(exported.file_name, "concept-2024-11-05.html");
    assert_eq!(exported.mime, "text/html");
}

/// The page with its three large bodies (stylesheet, config, script)
/// replaced by short markers.
fn outline(html: &str) -> String {
    let html = elide(html, "  <style>\n", "  </style>", "    /* stylesheet */\n");
    let html = elide(&html, &format!(r#"id="{CONFIG_ELEMENT_ID}">"#), "</script>", "{...}");
    elide(&html, "  <script>\n", "  </script>", "    /* enhance.js */\n")
}

fn elide(html: &str, open: &str, close: &str, marker: &str) -> String {
    let start = html.find(open).unwrap() + open.len();
    let end = start + html[start..].find(close).unwrap();
    format!("{}{marker}{}", &html[..start], &html[end..])
}

#[test]
fn document_frame() {
    let exported = export_document(&two_videos_one_equation(), &ExportOptions::default(), now()).unwrap();
    let html = &exported.contents;
    assert!(html.contains(".video-container"));
    assert!(html.contains(".image-download-btn"));
    assert!(html.ends_with("</html>\n"));
}

#[test]
fn cdn_export_outline() {
    let exported = export_document(&two_videos_one_equation(), &ExportOptions::default(), now()).unwrap();
    insta::assert_snapshot!(outline(&exported.contents));
}

#[test]
fn prerendered_export_outline() {
    let options = ExportOptions {
        math: MathDelivery::Prerendered,
        ..Default::default()
    };
    let exported = export_document(&two_videos_one_equation(), &options, now()).unwrap();
    insta::assert_snapshot!(outline(&exported.contents));
}

#[test]
fn two_videos_and_an_equation_with_cdn_math() {
    let exported = export_document(&two_videos_one_equation(), &ExportOptions::default(), now()).unwrap();
    let html = &exported.contents;

    // content goes out as served; the script does the enhancing
    assert!(html.contains(r#"data-video-src="/media/spring.mp4""#));
    assert!(html.contains(r#"data-video-src="/media/pendulum.mp4""#));
    assert!(html.contains("$$F = ma$$"));
    assert!(html.contains(KATEX_CSS_URL));
    assert!(html.contains(KATEX_JS_URL));
    assert!(html.contains(KATEX_AUTO_RENDER_URL));

    // KaTeX scripts must be in place before the enhancement script runs
    let katex = html.find(KATEX_AUTO_RENDER_URL).unwrap();
    let script = html.find("renderMathInElement(root").unwrap();
    assert!(katex < script);

    let config = embedded_config(html);
    assert_eq!(config["renderMath"], true);
    assert_eq!(config["placeholderClass"], "custom-video-player");
    assert_eq!(config["sourceAttr"], "data-video-src");
    assert_eq!(config["delimiters"][0]["left"], "$$");
    assert_eq!(config["delimiters"][1]["left"], r"\[");
    assert_eq!(config["ignoredTags"].as_array().unwrap().len(), 6);
    assert_eq!(config["playerMarkup"], PLAYER_MARKUP);
    assert_eq!(config["selectors"]["centerPlay"], "play-button-center");
}

#[test]
fn prerendered_math_needs_no_katex() {
    let options = ExportOptions {
        math: MathDelivery::Prerendered,
        ..Default::default()
    };
    let exported = export_document(&two_videos_one_equation(), &options, now()).unwrap();
    let html = &exported.contents;

    assert!(!html.contains("katex.min.js"));
    assert!(!html.contains(KATEX_CSS_URL));
    assert!(!html.contains("$$F = ma$$"));
    assert!(html.contains(r#"<span class="math math-display"><math"#));
    assert_eq!(embedded_config(html)["renderMath"], false);
}

#[test]
fn exported_content_still_enhances() {
    // The placeholders in the export are the same ones the live pass claims.
    let exported = export_document(&two_videos_one_equation(), &ExportOptions::default(), now()).unwrap();
    let start = exported.contents.find("<main").unwrap();
    let end = exported.contents.find("</main>").unwrap() + "</main>".len();
    let fragment = Fragment::parse(&exported.contents[start..end]);
    assert_eq!(fragment.unclaimed_placeholders().len(), 2);
    assert!(!exported.contents[start..end].contains(INITIALIZED_ATTR));
}

#[test]
fn config_cannot_close_its_script_element() {
    let exported = export_document(&doc(""), &ExportOptions::default(), now()).unwrap();
    let marker = format!(r#"id="{CONFIG_ELEMENT_ID}">"#);
    let start = exported.contents.find(&marker).unwrap() + marker.len();
    let block_end = start + exported.contents[start..].find("</script>").unwrap();
    // the player markup is full of closing tags; they must all be escaped
    assert!(exported.contents[start..block_end].contains(r"<\/div>"));
    assert!(embedded_config(&exported.contents)["playerMarkup"]
        .as_str()
        .unwrap()
        .ends_with("</div>"));
}

#[test]
fn theme_flows_into_the_export() {
    let mut options = ExportOptions::default();
    options.theme.colors.foreground = "#101010".into();
    let exported = export_document(&doc("<p>x</p>"), &options, now()).unwrap();
    assert!(exported.contents.contains("--color-text: #101010;"));
}

/// Property names the enhancement script reads off `object`.
fn script_reads(object: &str) -> BTreeSet<String> {
    let needle = format!("{object}.");
    ENHANCE_SCRIPT
        .match_indices(&needle)
        .filter(|(at, _)| {
            !ENHANCE_SCRIPT[..*at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        })
        .map(|(at, _)| {
            ENHANCE_SCRIPT[at + needle.len()..]
                .chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect()
        })
        .collect()
}

#[test]
fn enhancement_script_agrees_with_its_config() {
    let exported = export_document(&doc(""), &ExportOptions::default(), now()).unwrap();
    let config = embedded_config(&exported.contents);

    assert!(ENHANCE_SCRIPT.contains(&format!("getElementById('{CONFIG_ELEMENT_ID}')")));
    assert!(ENHANCE_SCRIPT.contains("host.innerHTML = config.playerMarkup;"));

    let keys = script_reads("config");
    assert!(keys.contains("playerMarkup"));
    for key in &keys {
        assert!(config.get(key).is_some(), "script reads config.{key} but the export never writes it");
    }

    let written: BTreeSet<String> = config["selectors"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(script_reads("sel"), written);

    let player = Fragment::parse(PLAYER_MARKUP);
    for (key, class) in config["selectors"].as_object().unwrap() {
        let class = class.as_str().unwrap();
        if class == selectors::HIDDEN {
            continue;
        }
        assert!(
            !player.elements_with_class(player.root(), class).is_empty(),
            "selector {key} = .{class} is missing from the player markup"
        );
    }
}
