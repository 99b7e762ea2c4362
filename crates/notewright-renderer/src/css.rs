//! Stylesheets shared by the app and the exported document.

use crate::theme::Theme;

pub fn generate_base_css(theme: &Theme) -> String {
    let colors = &theme.colors;
    let fonts = &theme.fonts;

    format!(
        r#"/* Variables */
:root {{
    --color-background: {};
    --color-surface: {};
    --color-text: {};
    --color-muted: {};
    --color-border: {};
    --color-link: {};
    --color-link-hover: {};
    --color-code: {};
    --color-code-block-bg: {};
    --color-code-block-text: {};
    --color-emphasis: {};
    --color-subtle: {};

    --font-body: {};
    --font-ui: {};
    --font-mono: {};
}}

body {{
    font-family: var(--font-ui);
    margin: 0;
    padding: 0;
    background: #FFFFFF;
}}

.material-symbols-outlined {{
    font-family: 'Material Symbols Outlined';
    font-weight: normal;
    font-style: normal;
    font-size: 24px;
    line-height: 1;
    letter-spacing: normal;
    text-transform: none;
    display: inline-block;
    white-space: nowrap;
    word-wrap: normal;
    direction: ltr;
    -webkit-font-smoothing: antialiased;
}}

::-webkit-scrollbar {{ width: 6px; }}
::-webkit-scrollbar-track {{ background: transparent; }}
::-webkit-scrollbar-thumb {{ background: #e5e5e5; border-radius: 3px; }}
::-webkit-scrollbar-thumb:hover {{ background: #d4d4d4; }}
::selection {{ background: #e8e6e3; color: #000; }}
"#,
        colors.background,
        colors.surface,
        colors.foreground,
        colors.muted,
        colors.border,
        colors.link,
        colors.link_hover,
        colors.code,
        colors.code_block_background,
        colors.code_block_foreground,
        colors.emphasis,
        colors.subtle,
        fonts.body,
        fonts.ui,
        fonts.monospace,
    )
}

/// Typography for generated content, scoped to `.prose`.
pub const PROSE_CSS: &str = r#"/* Prose */
.prose {
    color: var(--color-text);
    font-family: var(--font-body);
}

.prose p {
    margin-bottom: 1.5em;
    line-height: 1.8;
}

.prose h1, .prose h2, .prose h3, .prose h4 {
    font-family: var(--font-body);
    font-weight: 600;
    color: var(--color-text);
    margin-top: 2em;
    margin-bottom: 0.75em;
    line-height: 1.3;
}

.prose h1 { font-size: 2.25em; }
.prose h2 { font-size: 1.875em; border-bottom: 2px solid var(--color-border); padding-bottom: 0.5em; }
.prose h3 { font-size: 1.5em; }
.prose h4 { font-size: 1.25em; }

.prose strong { font-weight: 600; color: var(--color-emphasis); }
.prose em { font-style: italic; color: var(--color-subtle); }

.prose ul, .prose ol { margin: 1.5em 0; padding-left: 1.75em; }
.prose li { margin: 0.5em 0; line-height: 1.75; }
.prose ul li { list-style-type: disc; }
.prose ol li { list-style-type: decimal; }

.prose code {
    background: var(--color-background);
    border: 1px solid var(--color-border);
    border-radius: 4px;
    padding: 0.2em 0.4em;
    font-family: var(--font-mono);
    font-size: 0.9em;
    color: var(--color-code);
}

.prose pre {
    background: var(--color-code-block-bg);
    color: var(--color-code-block-text);
    border-radius: 8px;
    padding: 1.5em;
    overflow-x: auto;
    margin: 1.5em 0;
    border: 1px solid var(--color-subtle);
}

.prose pre code {
    background: transparent;
    border: none;
    padding: 0;
    color: inherit;
    font-size: 0.95em;
}

.prose blockquote {
    border-left: 4px solid var(--color-text);
    background: var(--color-background);
    padding: 1em 1.5em;
    margin: 1.5em 0;
    font-style: italic;
    border-radius: 4px;
}

.prose blockquote p { margin: 0; }

/* Math */
.prose .math-display {
    display: block;
    overflow-x: auto;
    overflow-y: hidden;
    margin: 2em 0;
    padding: 1.5em;
    background: var(--color-surface);
    border-radius: 8px;
    border: 1px solid var(--color-border);
    text-align: center;
}

.prose .math-inline { display: inline; margin: 0 0.15em; }
.prose .katex { font-size: 1.1em; }
.prose .math-display .katex { font-size: 1.3em; }

.prose a {
    color: var(--color-link);
    text-decoration: underline;
    text-decoration-color: rgba(59, 130, 246, 0.3);
    text-underline-offset: 2px;
    transition: all 0.2s;
}

.prose a:hover {
    color: var(--color-link-hover);
    text-decoration-color: rgba(37, 99, 235, 0.6);
}

.prose table { width: 100%; border-collapse: collapse; margin: 1.5em 0; }
.prose th, .prose td { border: 1px solid var(--color-border); padding: 0.75em; text-align: left; }
.prose th { background: var(--color-background); font-weight: 600; }

.prose hr { border: none; border-top: 2px solid var(--color-border); margin: 2em 0; }
"#;

pub const PLAYER_CSS: &str = r#"/* Video player */
.video-container {
    position: relative;
    width: 100%;
    background: black;
    border-radius: 8px;
    overflow: hidden;
    margin: 2em 0;
    cursor: pointer;
}

.video-container video { width: 100%; height: auto; display: block; cursor: pointer; }

.video-controls {
    position: absolute;
    bottom: 0;
    left: 0;
    right: 0;
    background: linear-gradient(to top, rgba(0,0,0,0.9) 0%, rgba(0,0,0,0.6) 50%, transparent 100%);
    padding: 12px 16px 16px 16px;
    opacity: 0;
    transition: opacity 0.3s;
    cursor: default;
}

.video-container:hover .video-controls { opacity: 1; }

.play-button-center {
    position: absolute;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
    width: 80px;
    height: 80px;
    background: rgba(255, 255, 255, 0.95);
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    transition: all 0.2s;
    pointer-events: none;
    box-shadow: 0 8px 32px rgba(0, 0, 0, 0.3);
}

.play-button-center .material-symbols-outlined { font-size: 48px; color: #2D2A26; margin-left: 4px; }
.play-button-center.hidden { display: none; }

.progress-bar {
    width: 100%;
    height: 20px;
    cursor: pointer;
    margin-bottom: 8px;
    position: relative;
    display: flex;
    align-items: center;
}

.progress-bar-inner {
    width: 100%;
    height: 4px;
    background: rgba(255, 255, 255, 0.3);
    border-radius: 2px;
    position: relative;
    transition: height 0.2s;
}

.progress-bar:hover .progress-bar-inner { height: 6px; }

.progress-filled { height: 100%; background: white; border-radius: 2px; position: relative; }

.progress-filled::after {
    content: '';
    position: absolute;
    right: 0;
    top: 50%;
    transform: translateY(-50%);
    width: 14px;
    height: 14px;
    background: white;
    border-radius: 50%;
    opacity: 0;
    transition: opacity 0.3s;
    box-shadow: 0 0 4px rgba(0,0,0,0.3);
}

.video-container:hover .progress-filled::after { opacity: 1; }

.controls-row { display: flex; align-items: center; justify-content: space-between; gap: 12px; }
.controls-left, .controls-right { display: flex; align-items: center; gap: 12px; }

.control-button {
    color: white;
    cursor: pointer;
    transition: color 0.2s;
    background: none;
    border: none;
    padding: 0;
    display: flex;
    align-items: center;
    justify-content: center;
}

.control-button:hover { color: rgba(255, 255, 255, 0.8); }
.play-pause .material-symbols-outlined { font-size: 28px; }

.time-display { color: white; font-size: 14px; font-weight: 500; letter-spacing: 0.025em; }

.volume-container { display: flex; align-items: center; gap: 8px; }

.volume-slider {
    width: 80px;
    height: 4px;
    background: rgba(255, 255, 255, 0.2);
    border-radius: 2px;
    appearance: none;
    cursor: pointer;
}

.volume-slider::-webkit-slider-thumb {
    appearance: none;
    width: 12px;
    height: 12px;
    background: white;
    border-radius: 50%;
    cursor: pointer;
}

.volume-slider::-moz-range-thumb {
    width: 12px;
    height: 12px;
    background: white;
    border-radius: 50%;
    cursor: pointer;
    border: none;
}
"#;

pub const IMAGE_CSS: &str = r#"/* Image download */
.image-with-download { position: relative; display: inline-block; width: 100%; }
.image-with-download img { display: block; max-width: 100%; height: auto; border-radius: 8px; }

.image-download-btn {
    position: absolute;
    top: 12px;
    right: 12px;
    background: white;
    color: #2D2A26;
    border: none;
    border-radius: 8px;
    padding: 8px;
    display: flex;
    align-items: center;
    justify-content: center;
    cursor: pointer;
    opacity: 0;
    transition: opacity 0.2s;
    box-shadow: 0 2px 8px rgba(0, 0, 0, 0.15);
}

.image-with-download:hover .image-download-btn { opacity: 1; }
.image-download-btn .material-symbols-outlined { font-size: 20px; }
"#;

/// Page frame of the exported document.
pub const EXPORT_LAYOUT_CSS: &str = r#"/* Export layout */
.page { width: 100%; max-width: 800px; margin: 0 auto; padding: 3rem 1.5rem; background: white; min-height: 100vh; }

.page-header { margin-bottom: 3rem; text-align: center; border-bottom: 1px solid #e5e7eb; padding-bottom: 2rem; }
.page-brand { display: flex; align-items: center; justify-content: center; gap: 0.75rem; margin-bottom: 1rem; }
.page-logo {
    display: flex;
    align-items: center;
    justify-content: center;
    width: 3rem;
    height: 3rem;
    border-radius: 0.5rem;
    background: var(--color-text);
    color: white;
}
.page-title { font-family: var(--font-body); font-size: 2.25rem; font-weight: 700; color: var(--color-text); margin: 0; }
.page-subtitle { color: var(--color-muted); font-size: 0.875rem; margin: 0; }

.page-content { display: flex; flex-direction: column; gap: 3rem; }

.page-footer {
    text-align: center;
    padding: 3rem 0;
    color: #9ca3af;
    font-size: 0.75rem;
    margin-top: 2rem;
    border-top: 1px solid #e5e7eb;
}

@media (min-width: 1024px) {
    .page { padding-top: 4rem; padding-bottom: 4rem; }
}
"#;

/// Everything the enhanced content needs: variables, prose, player, images.
pub fn generate_stylesheet(theme: &Theme) -> String {
    let mut css = generate_base_css(theme);
    for part in [PROSE_CSS, PLAYER_CSS, IMAGE_CSS] {
        css.push('\n');
        css.push_str(part);
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::{IMAGE_BUTTON_CLASS, IMAGE_WRAPPER_CLASS};
    use crate::player::selectors;

    #[test]
    fn theme_values_reach_the_variables() {
        let mut theme = Theme::default();
        theme.colors.link = "#ff00ff".into();
        theme.fonts.body = "'Merriweather', serif".into();
        let css = generate_base_css(&theme);
        assert!(css.contains("--color-link: #ff00ff;"));
        assert!(css.contains("--font-body: 'Merriweather', serif;"));
        assert!(css.contains("--color-text: #2D2A26;"));
    }

    #[test]
    fn stylesheet_covers_every_enhanced_class() {
        let css = generate_stylesheet(&Theme::default());
        for class in [
            selectors::CONTAINER,
            selectors::CENTER_PLAY,
            selectors::CONTROLS,
            selectors::PROGRESS_BAR,
            selectors::PROGRESS_FILLED,
            selectors::VOLUME_SLIDER,
            IMAGE_WRAPPER_CLASS,
            IMAGE_BUTTON_CLASS,
            "math-display",
        ] {
            assert!(css.contains(&format!(".{class}")), "missing .{class}");
        }
        assert!(css.contains(".play-button-center.hidden"));
    }

    #[test]
    fn braces_balance() {
        let css = generate_stylesheet(&Theme::default()) + EXPORT_LAYOUT_CSS;
        assert_eq!(css.matches('{').count(), css.matches('}').count());
    }
}
