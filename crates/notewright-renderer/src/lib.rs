//! Notewright renderer
//!
//! Takes generated HTML from the service and upgrades it: math is typeset,
//! video placeholders become players, images get download buttons. The same
//! steps run against the live page in the app and against an in-memory
//! [`dom::Fragment`] here, and [`export`] writes a standalone copy that
//! repeats them with plain DOM scripting.

pub mod css;
pub mod delimiters;
pub mod dom;
pub mod download;
pub mod enhance;
pub mod export;
pub mod loader;
pub mod math;
pub mod player;
pub mod readiness;
pub mod theme;

pub use delimiters::MathConfig;
pub use dom::Fragment;
pub use enhance::{
    EnhanceError, EnhanceReport, EnhanceTarget, EnhancementPass, MathOutcome, PassGuard,
    enhance_html,
};
pub use export::{ExportOptions, ExportedDocument, MathDelivery, export_document};
pub use loader::{LibraryLoader, LoadError, MathStack, ResourceAttacher};
pub use player::PlayerState;
pub use readiness::{Generation, MountReadiness};
pub use theme::Theme;
