//! Client-side hydration engine
//!
//! Drives the static-to-live swap for one widget instance: wait for the
//! first interaction, capture where the user's focus was, build the live
//! subtree off-screen through the widget library, swap it in whole, then
//! put focus back.

mod widget;

use std::time::Duration;

use tabledom::capture_path;
use tabledom::find_by_html_id;
use tabledom::find_node;
use tabledom::find_node_mut;
use tabledom::for_each_element_mut;
use tabledom::parent_of;
use tabledom::replace_node;
use tabledom::resolve_path;
use tabledom::Element;
use tabledom::FocusState;
use tabledom::NodeId;

pub use widget::WidgetLibrary;

use crate::error::HydrateError;
use crate::model::RenderOptions;
use crate::prerender::TABLE_CLASS;
use crate::prerender::WRAPPER_CLASS;

// =============================================================================
// Phases and events
// =============================================================================

/// Lifecycle of one widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    /// Bound to the static markup, not yet listening.
    Idle,
    /// Listening for the first qualifying interaction.
    Armed,
    /// Waiting on the widget library's init signal.
    Hydrating,
    /// The live widget owns the markup. Terminal.
    Live,
    /// The widget library never signaled; the static table was forced
    /// visible. Terminal.
    TimedOut,
}

/// A user interaction observed on the static markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Pointer click; `target` is the element under the pointer when known.
    Click { target: Option<NodeId> },
    /// Key release; `target` is the focused element when known.
    KeyUp { target: Option<NodeId> },
}

impl Interaction {
    fn target(&self) -> Option<NodeId> {
        match self {
            Interaction::Click { target } | Interaction::KeyUp { target } => *target,
        }
    }
}

/// What one interaction did to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Nothing happened: the hydrator was not armed, or the markup is gone.
    Ignored,
    /// The live widget is in the page; `focused` names the element that got
    /// the user's focus back, when one was found.
    Live { focused: Option<NodeId> },
    /// The widget library never signaled readiness within the configured
    /// wait; the static table stays, all rows visible.
    TimedOut,
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for hydration timing.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use livetable_lib::hydrate::HydratorConfig;
///
/// let config = HydratorConfig::default().with_init_timeout(Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct HydratorConfig {
    /// How long to wait for the widget library's init signal before giving
    /// up and forcing the static table visible. `None` waits forever.
    ///
    /// Default: 10 seconds
    pub init_timeout: Option<Duration>,
}

impl Default for HydratorConfig {
    fn default() -> Self {
        Self {
            init_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl HydratorConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the init-signal wait limit.
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }

    /// Creates a config that waits for the widget indefinitely.
    pub fn without_init_timeout() -> Self {
        Self { init_timeout: None }
    }
}

// =============================================================================
// Hydrator
// =============================================================================

/// Hydrates one prerendered widget.
///
/// Bound to the page tree by the table's `id` attribute; the table's
/// grandparent must be the widget wrapper, which is what the swap replaces.
pub struct Hydrator<W> {
    widget: W,
    options: RenderOptions,
    config: HydratorConfig,
    phase: HydrationPhase,
    focus: FocusState,
    widget_id: String,
    table_id: NodeId,
    wrapper_id: NodeId,
    host_id: NodeId,
}

impl<W: WidgetLibrary> Hydrator<W> {
    /// Bind to the prerendered markup for `widget_id`.
    ///
    /// Fails with [`HydrateError::MarkupMissing`] when the table is absent
    /// or not sitting inside the expected wrapper chrome.
    pub fn bind(
        root: &Element,
        widget_id: &str,
        options: RenderOptions,
        widget: W,
    ) -> Result<Self, HydrateError> {
        let missing = || HydrateError::MarkupMissing {
            widget_id: widget_id.to_string(),
        };

        let table = find_by_html_id(root, widget_id).ok_or_else(missing)?;
        let table_id = table.node_id();
        let container = parent_of(root, table_id).ok_or_else(missing)?;
        let wrapper = parent_of(root, container.node_id()).ok_or_else(missing)?;
        if !wrapper.has_class(WRAPPER_CLASS) {
            return Err(missing());
        }
        let wrapper_id = wrapper.node_id();
        let host_id = parent_of(root, wrapper_id).ok_or_else(missing)?.node_id();

        Ok(Self {
            widget,
            options,
            config: HydratorConfig::default(),
            phase: HydrationPhase::Idle,
            focus: FocusState::new(),
            widget_id: widget_id.to_string(),
            table_id,
            wrapper_id,
            host_id,
        })
    }

    pub fn with_config(mut self, config: HydratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self) -> HydrationPhase {
        self.phase
    }

    /// The element holding the user's restored focus, once live.
    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Start listening for interactions. Only an idle hydrator can arm.
    pub fn arm(&mut self) -> bool {
        if self.phase != HydrationPhase::Idle {
            return false;
        }
        self.phase = HydrationPhase::Armed;
        log::debug!("[hydrate] {} armed", self.widget_id);
        true
    }

    /// Feed one interaction to the widget.
    ///
    /// The first interaction while armed runs the whole hydration: capture
    /// focus, build the live subtree off-screen, swap it in, restore focus.
    /// The phase leaves `Armed` before the first await point, so a second
    /// interaction arriving mid-hydration is ignored rather than starting a
    /// second run.
    pub async fn handle_interaction(
        &mut self,
        root: &mut Element,
        interaction: Interaction,
    ) -> HydrationOutcome {
        if self.phase != HydrationPhase::Armed {
            return HydrationOutcome::Ignored;
        }
        self.phase = HydrationPhase::Hydrating;
        log::debug!(
            "[hydrate] {} hydrating on {:?}",
            self.widget_id,
            interaction
        );

        // Capture where focus is before the tree changes.
        let captured = interaction.target().and_then(|target| {
            let host = find_node(root, self.host_id)?;
            let path = capture_path(host, target)?;
            Some((target, path))
        });

        // Build the live subtree off-screen from an identity-preserving
        // clone of the table, with the widget treatment undone.
        let Some(table) = find_node(root, self.table_id) else {
            log::warn!("[hydrate] {} table vanished before hydration", self.widget_id);
            return HydrationOutcome::Ignored;
        };
        let mut bare = table.clone();
        bare.remove_class(TABLE_CLASS);
        unhide_rows(&mut bare);

        let attach = self.widget.attach(bare, &self.options);
        let live = match self.config.init_timeout {
            Some(limit) => match tokio::time::timeout(limit, attach).await {
                Ok(live) => live,
                Err(_) => {
                    log::warn!(
                        "[hydrate] {} widget never signaled within {:?}, forcing static table",
                        self.widget_id,
                        limit
                    );
                    self.force_display(root);
                    self.phase = HydrationPhase::TimedOut;
                    return HydrationOutcome::TimedOut;
                }
            },
            None => attach.await,
        };

        // One swap; the page never holds a half-transformed table.
        if replace_node(root, self.wrapper_id, live).is_none() {
            log::warn!("[hydrate] {} wrapper vanished during hydration", self.widget_id);
            return HydrationOutcome::Ignored;
        }
        self.phase = HydrationPhase::Live;

        let focused = captured.and_then(|(target, path)| {
            let host = find_node(root, self.host_id)?;
            // Cheap path: the widget kept the node attached by reference.
            if let Some(node) = find_node(host, target) {
                return Some(node.node_id());
            }
            resolve_path(host, &path).map(Element::node_id)
        });
        match focused {
            Some(node) => {
                self.focus.focus(node);
                log::debug!("[hydrate] {} live, focus restored to {}", self.widget_id, node);
            }
            None => log::debug!("[hydrate] {} live", self.widget_id),
        }
        HydrationOutcome::Live { focused }
    }

    /// Undo the pagination pre-slicing in place; the static table is all
    /// the user is going to get.
    fn force_display(&self, root: &mut Element) {
        if let Some(table) = find_node_mut(root, self.table_id) {
            unhide_rows(table);
        }
    }
}

impl<W> std::fmt::Debug for Hydrator<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("widget_id", &self.widget_id)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

fn unhide_rows(table: &mut Element) {
    for_each_element_mut(table, &mut |element| {
        if element.tag() == "tr" {
            element.remove_attribute("hidden");
        }
    });
}
