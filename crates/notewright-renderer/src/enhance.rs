//! The one-shot pass that upgrades mounted content.
//!
//! Steps run in a fixed order for each ready generation:
//!
//! 1. make sure the math libraries are loaded (failure only skips step 3)
//! 2. replace every unclaimed video placeholder with a player
//! 3. typeset delimited math
//! 4. give every image a download button
//!
//! The same steps run against two surfaces, the in-memory [`Fragment`] and the
//! live browser DOM, through [`EnhanceTarget`].

use miette::Diagnostic;
use pulldown_cmark_escape::{FmtWriter, escape_html};

use crate::delimiters::MathConfig;
use crate::dom::{Fragment, NodeId, decode_entities};
use crate::loader::{LibraryLoader, LoadError, MathStack, Preloaded, ResourceAttacher};
use crate::math::{MathStats, render_math_in};
use crate::player::PLAYER_MARKUP;
use crate::readiness::{Generation, MountReadiness};

pub const PLACEHOLDER_CLASS: &str = "custom-video-player";
pub const VIDEO_SRC_ATTR: &str = "data-video-src";
pub const INITIALIZED_ATTR: &str = "data-initialized";
pub const IMAGE_WRAPPER_CLASS: &str = "image-with-download";
pub const IMAGE_BUTTON_CLASS: &str = "image-download-btn";

pub const IMAGE_BUTTON_MARKUP: &str = r#"<button type="button" class="image-download-btn" title="Download image"><span class="material-symbols-outlined">download</span></button>"#;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum EnhanceError {
    #[error("dom operation failed: {0}")]
    #[diagnostic(code(notewright::enhance::dom))]
    Dom(String),

    /// The content was replaced or unmounted while the pass was suspended
    #[error("content generation {generation} was superseded")]
    #[diagnostic(code(notewright::enhance::stale))]
    Stale { generation: u64 },

    #[error("could not mount player for {src}: {message}")]
    #[diagnostic(code(notewright::enhance::player))]
    PlayerMount { src: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathOutcome {
    /// Typeset in place, with counts
    Rendered(MathStats),
    /// Handed to the loaded auto-render scanner
    Scanned,
    /// Libraries did not load; math stays as text
    Unavailable(LoadError),
    /// The renderer itself threw
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhanceReport {
    pub generation: Generation,
    pub players_mounted: usize,
    pub players_failed: usize,
    pub math: MathOutcome,
    pub images_wrapped: usize,
}

/// A DOM surface the pass can work on.
pub trait EnhanceTarget {
    type Node;

    /// Placeholders with a non-empty source and no initialized flag.
    fn unclaimed_placeholders(&self) -> Vec<Self::Node>;
    fn placeholder_source(&self, node: &Self::Node) -> Option<String>;
    fn mark_initialized(&mut self, node: &Self::Node);
    fn mount_player(&mut self, node: &Self::Node, src: &str) -> Result<(), EnhanceError>;
    fn render_math(&mut self, config: &MathConfig) -> Result<MathOutcome, EnhanceError>;
    /// Images whose parent is not already a download wrapper.
    fn unwrapped_images(&self) -> Vec<Self::Node>;
    fn wrap_image(&mut self, node: &Self::Node) -> Result<(), EnhanceError>;
}

/// Permission to run the pass for one generation.
#[derive(Debug)]
pub struct PassTicket {
    generation: Generation,
}

impl PassTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Hands out at most one ticket per generation, and none for a generation
/// older than one already started.
#[derive(Debug, Default)]
pub struct PassGuard {
    last_started: Option<Generation>,
}

impl PassGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, generation: Generation) -> Option<PassTicket> {
        if self.last_started.is_some_and(|last| generation <= last) {
            tracing::debug!(generation = generation.get(), "pass already ran for this content");
            return None;
        }
        self.last_started = Some(generation);
        Some(PassTicket { generation })
    }
}

pub struct EnhancementPass<'a, A> {
    pub loader: &'a LibraryLoader<A>,
    pub stack: &'a MathStack,
    pub config: &'a MathConfig,
}

impl<A: ResourceAttacher> EnhancementPass<'_, A> {
    /// Run all four steps. `is_current` is asked after each suspension; once
    /// it says no, the pass stops without touching `target` again.
    pub async fn run<T, F>(
        &self,
        target: &mut T,
        ticket: PassTicket,
        is_current: F,
    ) -> Result<EnhanceReport, EnhanceError>
    where
        T: EnhanceTarget,
        F: Fn(Generation) -> bool,
    {
        let generation = ticket.generation;
        let stale = || EnhanceError::Stale {
            generation: generation.get(),
        };
        if !is_current(generation) {
            return Err(stale());
        }
        tracing::debug!(generation = generation.get(), "enhancement pass started");

        let libraries = self.loader.ensure_math_stack(self.stack).await;
        if !is_current(generation) {
            tracing::debug!(generation = generation.get(), "content replaced while loading, abandoning pass");
            return Err(stale());
        }
        if let Err(err) = &libraries {
            tracing::error!(error = %err, "math libraries unavailable, continuing without math");
        }

        let mut players_mounted = 0;
        let mut players_failed = 0;
        let placeholders = target.unclaimed_placeholders();
        tracing::debug!(count = placeholders.len(), "found video placeholders");
        for node in placeholders {
            let Some(src) = target.placeholder_source(&node) else {
                continue;
            };
            target.mark_initialized(&node);
            match target.mount_player(&node, &src) {
                Ok(()) => players_mounted += 1,
                Err(err) => {
                    players_failed += 1;
                    tracing::warn!(error = %err, "video player failed to mount");
                }
            }
        }

        let math = match libraries {
            Err(err) => MathOutcome::Unavailable(err),
            Ok(()) => match target.render_math(self.config) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(error = %err, "math rendering failed");
                    MathOutcome::Failed(err.to_string())
                }
            },
        };

        let mut images_wrapped = 0;
        for node in target.unwrapped_images() {
            match target.wrap_image(&node) {
                Ok(()) => images_wrapped += 1,
                Err(err) => tracing::warn!(error = %err, "could not add image download button"),
            }
        }

        tracing::info!(
            generation = generation.get(),
            players_mounted,
            players_failed,
            images_wrapped,
            math = ?math,
            "enhancement pass finished"
        );
        Ok(EnhanceReport {
            generation,
            players_mounted,
            players_failed,
            math,
            images_wrapped,
        })
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    // writing into a String cannot fail
    let _ = escape_html(FmtWriter(&mut out), value);
    out
}

impl EnhanceTarget for Fragment {
    type Node = NodeId;

    fn unclaimed_placeholders(&self) -> Vec<NodeId> {
        self.elements_with_class(self.root(), PLACEHOLDER_CLASS)
            .into_iter()
            .filter(|node| self.attr(*node, INITIALIZED_ATTR).is_none())
            .filter(|node| {
                self.attr(*node, VIDEO_SRC_ATTR)
                    .is_some_and(|src| !src.trim().is_empty())
            })
            .collect()
    }

    fn placeholder_source(&self, node: &NodeId) -> Option<String> {
        self.attr(*node, VIDEO_SRC_ATTR)
            .map(|raw| decode_entities(raw).into_owned())
            .filter(|src| !src.trim().is_empty())
    }

    fn mark_initialized(&mut self, node: &NodeId) {
        self.set_attr(*node, INITIALIZED_ATTR, "true");
    }

    fn mount_player(&mut self, node: &NodeId, src: &str) -> Result<(), EnhanceError> {
        self.set_inner_html(*node, PLAYER_MARKUP);
        let source = self
            .elements_named(*node, "source")
            .into_iter()
            .next()
            .ok_or_else(|| EnhanceError::PlayerMount {
                src: src.to_string(),
                message: "player markup has no <source>".into(),
            })?;
        self.set_attr(source, "src", &escape_attr(src));
        Ok(())
    }

    fn render_math(&mut self, config: &MathConfig) -> Result<MathOutcome, EnhanceError> {
        let root = self.root();
        Ok(MathOutcome::Rendered(render_math_in(self, root, config)))
    }

    fn unwrapped_images(&self) -> Vec<NodeId> {
        self.elements_named(self.root(), "img")
            .into_iter()
            .filter(|img| {
                !self
                    .parent(*img)
                    .is_some_and(|parent| self.has_class(parent, IMAGE_WRAPPER_CLASS))
            })
            .collect()
    }

    fn wrap_image(&mut self, node: &NodeId) -> Result<(), EnhanceError> {
        if self.parent(*node).is_none() {
            return Err(EnhanceError::Dom("image is not attached".into()));
        }
        let wrapper = self.create_element("div", &[("class", IMAGE_WRAPPER_CLASS)]);
        self.wrap(*node, wrapper);
        for button in self.parse_detached(IMAGE_BUTTON_MARKUP) {
            self.append_child(wrapper, button);
        }
        Ok(())
    }
}

/// Run the full pass over `html` in memory, with the math engine linked in.
pub async fn enhance_html(html: &str) -> Result<(Fragment, EnhanceReport), EnhanceError> {
    let mut fragment = Fragment::parse(html);
    let loader = LibraryLoader::new(Preloaded);
    let stack = MathStack::default();
    let config = MathConfig::default();

    let mut readiness = MountReadiness::new();
    let generation = readiness.watch();
    let has_children = !fragment.children(fragment.root()).is_empty();
    if readiness.on_mutation(generation, has_children).is_none() {
        readiness.on_timeout(generation);
    }

    let mut guard = PassGuard::new();
    let ticket = guard.begin(generation).ok_or(EnhanceError::Stale {
        generation: generation.get(),
    })?;
    let pass = EnhancementPass {
        loader: &loader,
        stack: &stack,
        config: &config,
    };
    let report = pass
        .run(&mut fragment, ticket, |g| readiness.is_current(g))
        .await?;
    Ok((fragment, report))
}

#[cfg(test)]
mod tests;
