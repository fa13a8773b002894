//! Field locators: ordered fallback chains of independent matchers.
//!
//! Each locator tries its strategies in order and returns the first hit.
//! Later strategies run only when every earlier one found nothing, so a
//! markup change in one variant degrades to the next instead of failing.

use crate::aldi::selectors::{link, price, title, unit_price};
use scraper::{ElementRef, Selector};
use tracing::trace;
use url::Url;

/// A located field: a matched element or a bare text node.
#[derive(Debug, Clone, Copy)]
pub enum Hit<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

impl<'a> Hit<'a> {
    /// Returns the visible text, whitespace-trimmed per text node and
    /// joined with single spaces.
    pub fn text(&self) -> String {
        match self {
            Hit::Element(element) => element_text(*element),
            Hit::Text(text) => text.trim().to_string(),
        }
    }

    /// Returns the matched element, if this hit is one.
    pub fn element(&self) -> Option<ElementRef<'a>> {
        match self {
            Hit::Element(element) => Some(*element),
            Hit::Text(_) => None,
        }
    }
}

/// Collects the stripped text nodes of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Signature shared by every matcher.
pub type Matcher = for<'a> fn(ElementRef<'a>) -> Option<Hit<'a>>;

/// One named matching strategy.
pub struct Strategy {
    pub name: &'static str,
    pub matcher: Matcher,
}

impl Strategy {
    const fn new(name: &'static str, matcher: Matcher) -> Self {
        Self { name, matcher }
    }

    /// Runs this strategy against a scope.
    pub fn find<'a>(&self, scope: ElementRef<'a>) -> Option<Hit<'a>> {
        (self.matcher)(scope)
    }
}

/// An ordered fallback chain for one field.
pub struct Locator {
    field: &'static str,
    strategies: &'static [Strategy],
}

impl Locator {
    /// Returns the first hit across all strategies, in order.
    pub fn locate<'a>(&self, scope: ElementRef<'a>) -> Option<Hit<'a>> {
        self.strategies.iter().find_map(|strategy| {
            let hit = strategy.find(scope)?;
            trace!("{} located via {}", self.field, strategy.name);
            Some(hit)
        })
    }

    /// Field this locator extracts.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<Hit<'a>> {
    scope.select(selector).next().map(Hit::Element)
}

fn first_text<'a>(scope: ElementRef<'a>, accept: impl Fn(&str) -> bool) -> Option<Hit<'a>> {
    scope
        .descendants()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .find(|text| accept(text))
        .map(Hit::Text)
}

// Title

fn title_name_label(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &title::NAME_LABEL)
}

fn title_tile_attr(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &title::TILE_TITLE)
}

fn title_heading(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &title::HEADING)
}

/// Product title. Mandatory: cards without one are dropped.
pub static TITLE: Locator = Locator {
    field: "title",
    strategies: &[
        Strategy::new("name label class", title_name_label),
        Strategy::new("tile title attribute", title_tile_attr),
        Strategy::new("any heading", title_heading),
    ],
};

// Price

fn price_label(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &price::PRICE_LABEL)
}

fn price_part_inline(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &price::PRICE_PART_INLINE)
}

fn price_part_block(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &price::PRICE_PART_BLOCK)
}

fn price_currency_text(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first_text(scope, |text| text.contains(price::CURRENCY_SYMBOL))
}

/// Product price. Mandatory: cards without one are dropped.
pub static PRICE: Locator = Locator {
    field: "price",
    strategies: &[
        Strategy::new("price label class", price_label),
        Strategy::new("price part span", price_part_inline),
        Strategy::new("price part div", price_part_block),
        Strategy::new("currency text", price_currency_text),
    ],
};

// Unit price

fn unit_price_text(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first_text(scope, |text| unit_price::TEXT.is_match(text))
}

fn classed<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<Hit<'a>> {
    scope
        .select(selector)
        .find(|el| el.value().classes().any(|class| unit_price::CLASS.is_match(class)))
        .map(Hit::Element)
}

fn unit_price_class_inline(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    classed(scope, &unit_price::INLINE)
}

fn unit_price_class_block(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    classed(scope, &unit_price::BLOCK)
}

/// Base price per unit. Optional.
pub static UNIT_PRICE: Locator = Locator {
    field: "unit price",
    strategies: &[
        Strategy::new("per-unit text", unit_price_text),
        Strategy::new("base price span", unit_price_class_inline),
        Strategy::new("base price div", unit_price_class_block),
    ],
};

// Link

fn link_detail(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &link::DETAIL)
}

fn link_any(scope: ElementRef<'_>) -> Option<Hit<'_>> {
    first(scope, &link::ANY)
}

/// Product detail link. Optional.
pub static LINK: Locator = Locator {
    field: "link",
    strategies: &[
        Strategy::new("detail path anchor", link_detail),
        Strategy::new("any anchor", link_any),
    ],
};

/// Locates the product link and resolves it against `base`.
pub fn resolve_link(scope: ElementRef<'_>, base: &Url) -> Option<String> {
    let anchor = LINK.locate(scope)?.element()?;
    let href = anchor.value().attr("href")?;

    base.join(href).ok().map(String::from)
}
