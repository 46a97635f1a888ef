// Batch validation — rejects malformed records before feature extraction.
//
// A skipped record is reported, never silently dropped, and never aborts the
// run. The kept records keep their original input positions so the pipeline
// can emit output in input order.

use std::collections::HashSet;

use tracing::debug;

use super::models::Comment;
use crate::error::{SkipReason, SkippedRecord};

/// A comment that passed validation, tagged with its input position.
#[derive(Debug, Clone)]
pub struct IndexedComment {
    pub index: usize,
    pub comment: Comment,
}

/// Split a batch into valid comments and skip reports.
///
/// Rules, checked in order:
/// - empty or whitespace-only text → `EmptyText`
/// - a `comment_id` already seen among the kept records → `DuplicateCommentId`
///   (the first occurrence wins)
pub fn validate_batch(comments: Vec<Comment>) -> (Vec<IndexedComment>, Vec<SkippedRecord>) {
    let mut kept = Vec::with_capacity(comments.len());
    let mut skipped = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, comment) in comments.into_iter().enumerate() {
        let reason = if comment.is_blank() {
            Some(SkipReason::EmptyText)
        } else if !seen_ids.insert(comment.comment_id.clone()) {
            Some(SkipReason::DuplicateCommentId)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(index, comment_id = %comment.comment_id, %reason, "Skipping record");
                skipped.push(SkippedRecord {
                    index,
                    comment_id: comment.comment_id,
                    reason,
                });
            }
            None => kept.push(IndexedComment { index, comment }),
        }
    }

    (kept, skipped)
}
