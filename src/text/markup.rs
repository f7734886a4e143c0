//! Markup synchronizer
//!
//! Applies and reverts mark nodes in the live tree. Wrapping splits a leaf
//! into `[pre][mark][post]`; unwrapping turns the mark back into text and
//! merges it with neighbouring text so repeated mark/unmark cycles do not
//! fragment the document.

use super::tree::MarkupTree;
use crate::errors::MarkupError;
use crate::models::{Annotation, MarkupHandle, Segment};

#[derive(Debug, Clone)]
pub struct MarkupSynchronizer {
    class: String,
}

impl MarkupSynchronizer {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Wrap `segment` in a new mark carrying `mark_id`.
    ///
    /// Fails with `WrapConflict` if the leaf was consumed by an earlier wrap
    /// or already lies inside a mark; marks are never layered.
    pub fn wrap<T: MarkupTree + ?Sized>(
        &self,
        tree: &mut T,
        segment: &Segment,
        mark_id: &str,
    ) -> Result<Annotation, MarkupError> {
        let leaf = segment.leaf;
        let len = tree
            .leaf_len(leaf)
            .ok_or(MarkupError::WrapConflict { leaf })?;
        if tree.enclosing_mark(leaf).is_some() {
            return Err(MarkupError::WrapConflict { leaf });
        }
        if segment.is_empty() || segment.end > len {
            return Err(MarkupError::InvalidSegment {
                leaf,
                start: segment.start,
                end: segment.end,
            });
        }

        let text: String = tree
            .leaf_text(leaf)
            .unwrap_or_default()
            .chars()
            .skip(segment.start)
            .take(segment.len())
            .collect();

        tree.splice_mark(leaf, segment.start, segment.end, mark_id, &self.class)?;
        log::debug!("Wrapped {}..{} of {} as '{}'", segment.start, segment.end, leaf, mark_id);

        Ok(Annotation::new(mark_id, text, *segment))
    }

    /// Revert the mark behind `annotation` to plain text.
    ///
    /// Fails with `StaleReference` if the mark is no longer in the tree.
    pub fn unwrap<T: MarkupTree + ?Sized>(
        &self,
        tree: &mut T,
        annotation: &Annotation,
    ) -> Result<(), MarkupError> {
        self.unwrap_handle(tree, &annotation.markup)
    }

    /// Revert whatever mark `handle` points at
    pub fn unwrap_handle<T: MarkupTree + ?Sized>(
        &self,
        tree: &mut T,
        handle: &MarkupHandle,
    ) -> Result<(), MarkupError> {
        let mark = handle
            .resolve(&*tree)
            .ok_or_else(|| MarkupError::StaleReference(handle.mark_id().to_string()))?;

        if let Some(leaf) = tree.replace_with_text(mark)? {
            tree.merge_adjacent_text(leaf)?;
        }
        log::debug!("Unwrapped '{}'", handle.mark_id());
        Ok(())
    }

    /// Re-point `segment` after `wrapped` was spliced out as `mark_id`.
    ///
    /// The wrapped leaf no longer exists; a segment on it that lies wholly
    /// before or after the wrapped span moves onto the leading or trailing
    /// piece. Overlapping segments and segments on other leaves come back
    /// unchanged.
    pub fn rebase<T: MarkupTree + ?Sized>(
        &self,
        tree: &T,
        wrapped: &Segment,
        mark_id: &str,
        segment: Segment,
    ) -> Segment {
        if segment.leaf != wrapped.leaf {
            return segment;
        }
        let Some(mark) = tree.find_mark(mark_id) else {
            return segment;
        };
        let Some(parent) = tree.parent(mark) else {
            return segment;
        };
        let siblings = tree.children(parent);
        let Some(index) = siblings.iter().position(|&n| n == mark) else {
            return segment;
        };
        let piece = |i: Option<usize>| {
            i.and_then(|i| siblings.get(i).copied())
                .filter(|&n| tree.leaf_text(n).is_some())
        };

        if segment.start >= wrapped.end {
            match piece(index.checked_add(1)) {
                Some(post) => Segment::new(
                    post,
                    segment.start - wrapped.end,
                    segment.end - wrapped.end,
                ),
                None => segment,
            }
        } else if segment.end <= wrapped.start {
            match piece(index.checked_sub(1)) {
                Some(pre) => Segment::new(pre, segment.start, segment.end),
                None => segment,
            }
        } else {
            segment
        }
    }

    /// Unwrap `annotations` newest first. Returns how many marks were
    /// actually removed; stale ones are skipped.
    pub fn unwrap_all<'a, T, I>(&self, tree: &mut T, annotations: I) -> usize
    where
        T: MarkupTree + ?Sized,
        I: DoubleEndedIterator<Item = &'a Annotation>,
    {
        let mut removed = 0;
        for annotation in annotations.rev() {
            match self.unwrap(tree, annotation) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Skipping '{}' during clear: {}", annotation.id, e),
            }
        }
        removed
    }
}
