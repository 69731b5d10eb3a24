//! Scroll/anchor controller
//!
//! Jumping to an anchor in a virtualized document is a two-step affair: scroll
//! near the owning block so its window mounts, then wait (bounded) for the
//! anchor to show up in the mounted blocks and fine-tune onto it. The second
//! step can't happen synchronously because mounting occurs on the next frame.

use super::virtualizer::{ScrollAlign, ScrollCommand, ScrollToOptions};
use crate::services::retry::{retry, RetryPolicy};
use std::cell::RefCell;
use std::rc::Rc;

/// Whatever owns the viewport
pub trait ScrollSurface {
    fn is_virtualized(&self) -> bool;

    /// Scroll by estimated/measured offsets; `None` for an empty document
    fn scroll_to_block_index(&mut self, index: usize, options: ScrollToOptions) -> Option<ScrollCommand>;

    /// Top-level block owning an anchor id
    fn anchor_owner(&self, id: &str) -> Option<usize>;

    /// Whether the anchor's block is currently laid out
    fn is_anchor_mounted(&self, id: &str) -> bool;

    /// Scroll a mounted anchor into view; false if it isn't mounted
    fn scroll_anchor_into_view(&mut self, id: &str, options: ScrollToOptions) -> bool;
}

/// The handle page-level code drives: virtualization flag, jump to block,
/// jump to anchor
pub struct ScrollController<S> {
    surface: Rc<RefCell<S>>,
    policy: RetryPolicy,
}

impl<S> Clone for ScrollController<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Rc::clone(&self.surface),
            policy: self.policy,
        }
    }
}

impl<S: ScrollSurface> ScrollController<S> {
    pub fn new(surface: Rc<RefCell<S>>, policy: RetryPolicy) -> Self {
        Self { surface, policy }
    }

    pub fn surface(&self) -> &Rc<RefCell<S>> {
        &self.surface
    }

    pub fn is_virtualized(&self) -> bool {
        self.surface.borrow().is_virtualized()
    }

    /// Only meaningful when virtualized; a no-op otherwise
    pub fn scroll_to_block_index(&self, index: usize, options: ScrollToOptions) -> Option<ScrollCommand> {
        let mut surface = self.surface.borrow_mut();
        if !surface.is_virtualized() {
            return None;
        }
        surface.scroll_to_block_index(index, options)
    }

    /// Bring an anchor into view, best effort
    ///
    /// Returns whether the anchor was found within the attempt budget. Giving
    /// up is silent apart from a log line. Concurrent calls are not cancelled;
    /// the last one to resolve decides the final position.
    pub async fn scroll_to_anchor(&self, id: &str, options: ScrollToOptions) -> bool {
        let owner = self.surface.borrow().anchor_owner(id);
        if let Some(index) = owner {
            let coarse = ScrollToOptions {
                align: ScrollAlign::Start,
                behavior: options.behavior,
            };
            self.scroll_to_block_index(index, coarse);
        }

        let found = retry(self.policy, |attempt| {
            let mut surface = self.surface.borrow_mut();
            if !surface.is_anchor_mounted(id) {
                return None;
            }
            surface
                .scroll_anchor_into_view(id, options)
                .then_some(attempt)
        })
        .await;

        match found {
            Some(attempt) => {
                tracing::debug!("anchor {:?} resolved after {} attempt(s)", id, attempt + 1);
                true
            }
            None => {
                tracing::warn!(
                    "anchor {:?} not found after {} attempts, giving up",
                    id,
                    self.policy.max_attempts
                );
                false
            }
        }
    }
}
