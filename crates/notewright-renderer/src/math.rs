//! Server-side typesetting: TeX between delimiters becomes MathML spans.

use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};

use crate::delimiters::{MathConfig, Segment, split_at_delimiters};
use crate::dom::{Fragment, NodeId, decode_entities};

/// Class carried by every rendered math span; such spans are never rescanned.
pub const MATH_CLASS: &str = "math";

/// Typeset one expression (delimiters already stripped) as MathML.
pub fn tex_to_mathml(tex: &str, display: bool) -> Result<String, String> {
    let storage = Storage::new();
    let events: Vec<_> = Parser::new(tex, &storage).collect();

    let problems: Vec<String> = events
        .iter()
        .filter_map(|event| event.as_ref().err())
        .map(ToString::to_string)
        .collect();
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let config = RenderConfig {
        display_mode: match display {
            true => DisplayMode::Block,
            false => DisplayMode::Inline,
        },
        ..Default::default()
    };
    let mut out = String::new();
    push_mathml(&mut out, events.into_iter(), config).map_err(|err| err.to_string())?;
    Ok(out)
}

/// Wrap rendered MathML the way the auto-render scanner would place it.
pub fn math_span(mathml: &str, display_mode: bool) -> String {
    let mode_class = if display_mode {
        "math-display"
    } else {
        "math-inline"
    };
    format!(r#"<span class="{MATH_CLASS} {mode_class}">{mathml}</span>"#)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MathStats {
    /// Expressions typeset
    pub rendered: usize,
    /// Expressions left as literal text because they did not parse
    pub failed: usize,
}

/// Typeset every delimited expression in text below `scope`.
///
/// Text inside ignored tags or already rendered math is skipped. An
/// expression that fails to parse keeps its original text, delimiters
/// included.
pub fn render_math_in(fragment: &mut Fragment, scope: NodeId, config: &MathConfig) -> MathStats {
    let mut stats = MathStats::default();

    let text_nodes: Vec<NodeId> = fragment
        .descendants(scope)
        .into_iter()
        .filter(|node| fragment.text(*node).is_some())
        .filter(|node| {
            !fragment
                .ancestors(*node)
                .take_while(|a| *a != scope)
                .any(|a| {
                    fragment.has_class(a, MATH_CLASS)
                        || fragment.tag_name(a).is_some_and(|tag| config.is_ignored(tag))
                })
        })
        .collect();

    for node in text_nodes {
        let Some(text) = fragment.text(node).map(str::to_owned) else {
            continue;
        };
        let segments = split_at_delimiters(&text, &config.delimiters);
        if !segments.iter().any(|s| matches!(s, Segment::Math { .. })) {
            continue;
        }

        let mut replacements = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(literal) => replacements.push(fragment.create_text(literal)),
                Segment::Math { tex, raw, display } => {
                    match tex_to_mathml(&decode_entities(tex), display) {
                        Ok(mathml) => {
                            stats.rendered += 1;
                            replacements.extend(fragment.parse_detached(&math_span(&mathml, display)));
                        }
                        Err(message) => {
                            stats.failed += 1;
                            tracing::debug!(tex, %message, "leaving math as text");
                            replacements.push(fragment.create_text(raw));
                        }
                    }
                }
            }
        }
        fragment.replace_with(node, &replacements);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superscript_and_fraction_become_mathml() {
        let inline = tex_to_mathml("x^2", false).unwrap();
        assert!(inline.starts_with("<math"));
        assert!(inline.contains("<msup>"));

        let block = tex_to_mathml(r"\frac{1}{2}", true).unwrap();
        assert!(block.contains("<mfrac"));
        assert!(block.contains(r#"display="block""#));
    }

    #[test]
    fn unbalanced_group_reports_an_error() {
        let message = tex_to_mathml(r"\sqrt{a", false).unwrap_err();
        assert!(!message.is_empty());
    }

    #[test]
    fn renders_inline_math_inside_paragraph() {
        let mut fragment = Fragment::parse(r"<p>Area is $A = \pi r^2$.</p>");
        let root = fragment.root();
        let stats = render_math_in(&mut fragment, root, &MathConfig::default());
        assert_eq!(stats, MathStats { rendered: 1, failed: 0 });

        insta::assert_snapshot!(fragment.to_html());
    }

    #[test]
    fn display_equation_span() {
        let mathml = tex_to_mathml("F = ma", true).unwrap();
        insta::assert_snapshot!(math_span(&mathml, true));
    }

    #[test]
    fn skips_code_and_existing_math() {
        let mut fragment =
            Fragment::parse(r#"<pre><code>echo $HOME $PATH</code></pre><p>$x$</p>"#);
        let root = fragment.root();
        let config = MathConfig::default();
        assert_eq!(render_math_in(&mut fragment, root, &config).rendered, 1);
        assert!(fragment.to_html().starts_with("<pre><code>echo $HOME $PATH</code></pre>"));

        // a second run finds nothing left to do
        let before = fragment.to_html();
        assert_eq!(render_math_in(&mut fragment, root, &config), MathStats::default());
        assert_eq!(fragment.to_html(), before);
    }

    #[test]
    fn failed_expression_stays_literal() {
        let mut fragment = Fragment::parse(r"<p>Broken $x^$ but fine $b$</p>");
        let root = fragment.root();
        let stats = render_math_in(&mut fragment, root, &MathConfig::default());
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.rendered, 1);
        assert!(fragment.to_html().contains(r"Broken $x^$ but fine "));
    }

    #[test]
    fn entities_are_decoded_before_typesetting() {
        let mut fragment = Fragment::parse("<p>$a &lt; b$</p>");
        let root = fragment.root();
        let stats = render_math_in(&mut fragment, root, &MathConfig::default());
        assert_eq!(stats.rendered, 1);
        assert!(!fragment.to_html().contains('$'));
    }
}
