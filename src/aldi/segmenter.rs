//! Splits a search page into candidate product cards.

use crate::aldi::selectors::card;
use scraper::{ElementRef, Html};
use tracing::debug;

/// How the cards of a page were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmentation {
    /// Known card containers matched.
    Containers,
    /// No container matched; cards were synthesized from title elements.
    TitleParents,
}

/// Candidate product regions of one page, in document order.
#[derive(Debug)]
pub struct Cards<'a> {
    pub mode: Segmentation,
    pub cards: Vec<ElementRef<'a>>,
}

impl<'a> Cards<'a> {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Finds the product cards of a page.
///
/// Known article containers win. When none exist, every recognized title
/// element contributes its parent element as a synthetic card (or itself,
/// when it has no parent element).
pub fn segment(document: &Html) -> Cards<'_> {
    let cards: Vec<_> = document.select(&card::CONTAINER).collect();
    if !cards.is_empty() {
        debug!("Found {} card containers", cards.len());
        return Cards { mode: Segmentation::Containers, cards };
    }

    let cards: Vec<_> = document
        .select(&card::FALLBACK_TITLE)
        .map(|title| title.parent().and_then(ElementRef::wrap).unwrap_or(title))
        .collect();

    debug!("No card containers, synthesized {} cards from titles", cards.len());
    Cards { mode: Segmentation::TitleParents, cards }
}
