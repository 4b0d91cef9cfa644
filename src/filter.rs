//! Derivation of the visible list: base ordering (optionally sorted) restricted
//! by the caller's predicate for the current query.

use std::rc::Rc;

use crate::model::SortFn;

/// Applies the sort once to obtain the base ordering. Without a sort the base
/// is the caller's list itself (same `Rc`).
pub fn derive_base<T>(source: &Rc<Vec<T>>, sort: Option<&SortFn<T>>) -> Rc<Vec<T>> {
    match sort {
        Some(sort) => Rc::new(sort(source.as_slice())),
        None => Rc::clone(source),
    }
}

/// Indices into `base` of the items that match `query`, in base order.
///
/// An empty query keeps every item and never calls the predicate.
pub fn visible_indices<T>(
    base: &[T],
    predicate: &dyn Fn(&T, &str) -> bool,
    query: &str,
) -> Vec<usize> {
    if query.is_empty() {
        return (0..base.len()).collect();
    }
    base.iter()
        .enumerate()
        .filter(|(_, item)| predicate(item, query))
        .map(|(idx, _)| idx)
        .collect()
}

/// Same as [`visible_indices`] but yields the items themselves.
pub fn compute_visible<'a, T>(
    base: &'a [T],
    predicate: &dyn Fn(&T, &str) -> bool,
    query: &str,
) -> Vec<&'a T> {
    visible_indices(base, predicate, query)
        .into_iter()
        .map(|idx| &base[idx])
        .collect()
}

/// Holds the caller's list, the derived base ordering and the visible subset.
pub struct FilterEngine<T> {
    source: Rc<Vec<T>>,
    base: Rc<Vec<T>>,
    visible: Vec<usize>,
}

impl<T> FilterEngine<T> {
    pub fn new(
        source: Rc<Vec<T>>,
        sort: Option<&SortFn<T>>,
        predicate: &dyn Fn(&T, &str) -> bool,
        query: &str,
    ) -> Self {
        let base = derive_base(&source, sort);
        let visible = visible_indices(&base, predicate, query);
        Self {
            source,
            base,
            visible,
        }
    }

    /// Swaps in a new caller list. Returns `false` without doing anything when
    /// `source` is the same allocation as the current one.
    pub fn replace_source(
        &mut self,
        source: Rc<Vec<T>>,
        sort: Option<&SortFn<T>>,
        predicate: &dyn Fn(&T, &str) -> bool,
        query: &str,
    ) -> bool {
        if Rc::ptr_eq(&self.source, &source) {
            return false;
        }
        self.base = derive_base(&source, sort);
        self.source = source;
        self.refilter(predicate, query);
        true
    }

    pub fn refilter(&mut self, predicate: &dyn Fn(&T, &str) -> bool, query: &str) {
        self.visible = visible_indices(&self.base, predicate, query);
    }

    pub fn source(&self) -> &Rc<Vec<T>> {
        &self.source
    }

    /// Emptiness of the caller's list, not of the filtered view.
    pub fn source_is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn base(&self) -> &[T] {
        &self.base
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_item(&self, visible_idx: usize) -> Option<&T> {
        self.visible
            .get(visible_idx)
            .and_then(|&idx| self.base.get(idx))
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().map(|&idx| &self.base[idx])
    }
}

/// Upper-cases the first letter of every whitespace-separated word and
/// lower-cases the rest. Whitespace is preserved as-is.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    capitalize_into(text, &mut out, &mut at_word_start);
    out
}

/// Streaming form of [`capitalize_words`] so a word split across styled
/// spans is treated as one word.
pub(crate) fn capitalize_into(text: &str, out: &mut String, at_word_start: &mut bool) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            *at_word_start = true;
            out.push(ch);
        } else if *at_word_start {
            *at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
}
