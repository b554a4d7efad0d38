//! Safe DOM query helpers.
//!
//! Accessors run on every poll and must never fail, so every lookup here
//! takes a default and swallows misses. The `_report` variants log the miss
//! at debug level, which is the first place to look when a site redesign
//! breaks extraction.
//!
//! Selectors are plain CSS selectors, or `(selector)[n]` to pick the n-th
//! match (0-based) instead of the first.

use crate::page::{Element, Page};
use std::sync::Arc;
use tracing::debug;

/// Resolve a selector, honoring the `(selector)[n]` index form
pub fn find(page: &dyn Page, selector: &str) -> Option<Arc<dyn Element>> {
    match split_indexed(selector) {
        Some((inner, index)) => page.query_all(inner).into_iter().nth(index),
        None => page.query(selector),
    }
}

fn split_indexed(selector: &str) -> Option<(&str, usize)> {
    let rest = selector.strip_prefix('(')?;
    let (inner, tail) = rest.rsplit_once(")[")?;
    let index = tail.strip_suffix(']')?.trim().parse().ok()?;
    Some((inner, index))
}

/// Extract a value from the element, or `default` when it is absent or the
/// extractor gives up
pub fn query<T, F>(page: &dyn Page, selector: &str, extract: F, default: T) -> T
where
    F: FnOnce(&dyn Element) -> Option<T>,
{
    find(page, selector)
        .and_then(|el| extract(el.as_ref()))
        .unwrap_or(default)
}

/// Like [`query`] but logs the miss, tagged with the field being read
pub fn query_report<T, F>(page: &dyn Page, selector: &str, extract: F, default: T, name: &str) -> T
where
    F: FnOnce(&dyn Element) -> Option<T>,
{
    let Some(el) = find(page, selector) else {
        debug!("[{}] no element for selector '{}'", name, selector);
        return default;
    };

    match extract(el.as_ref()) {
        Some(value) => value,
        None => {
            debug!("[{}] extraction failed for selector '{}'", name, selector);
            default
        }
    }
}

/// Run `action` on the element if present. Returns whether it ran.
pub fn query_event<F>(page: &dyn Page, selector: &str, action: F) -> bool
where
    F: FnOnce(&dyn Element),
{
    match find(page, selector) {
        Some(el) => {
            action(el.as_ref());
            true
        }
        None => false,
    }
}

/// Like [`query_event`] but logs the miss, tagged with the event name
pub fn query_event_report<F>(page: &dyn Page, selector: &str, action: F, name: &str) -> bool
where
    F: FnOnce(&dyn Element),
{
    let fired = query_event(page, selector, action);
    if !fired {
        debug!("[{}] no element for selector '{}'", name, selector);
    }
    fired
}

/// Click the element if present
pub fn click(page: &dyn Page, selector: &str, name: &str) -> bool {
    query_event_report(page, selector, |el| el.click(), name)
}
