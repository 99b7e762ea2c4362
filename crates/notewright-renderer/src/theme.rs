use smol_str::SmolStr;

/// Google Fonts stylesheet for the prose and heading faces.
pub const FONT_IMPORT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&family=Lora:ital,wght@0,400;0,500;0,600;1,400&display=swap";
/// Icon font used by the player controls and image buttons.
pub const ICON_FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Material+Symbols+Outlined:opsz,wght,FILL,GRAD@20..48,100..700,0..1,-50..200";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    pub colors: ColorScheme,
    pub fonts: FontScheme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub background: SmolStr,
    pub surface: SmolStr,
    pub foreground: SmolStr,
    pub muted: SmolStr,
    pub border: SmolStr,
    pub link: SmolStr,
    pub link_hover: SmolStr,
    /// Inline `code` text
    pub code: SmolStr,
    pub code_block_background: SmolStr,
    pub code_block_foreground: SmolStr,
    /// `strong` text
    pub emphasis: SmolStr,
    /// `em` text and code block borders
    pub subtle: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontScheme {
    pub body: SmolStr,
    /// Page chrome around the prose
    pub ui: SmolStr,
    pub monospace: SmolStr,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: SmolStr::new("#F9F9F7"),
            surface: SmolStr::new("#FAFAF9"),
            foreground: SmolStr::new("#2D2A26"),
            muted: SmolStr::new("#6E6B65"),
            border: SmolStr::new("#EBEBE8"),
            link: SmolStr::new("#3B82F6"),
            link_hover: SmolStr::new("#2563EB"),
            code: SmolStr::new("#c7254e"),
            code_block_background: SmolStr::new("#2D2A26"),
            code_block_foreground: SmolStr::new("#F9F9F7"),
            emphasis: SmolStr::new("#1a1816"),
            subtle: SmolStr::new("#3d3a36"),
        }
    }
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            body: SmolStr::new("'Lora', Georgia, serif"),
            ui: SmolStr::new(
                "'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif",
            ),
            monospace: SmolStr::new("'Courier New', 'Roboto Mono', Consolas, monospace"),
        }
    }
}
