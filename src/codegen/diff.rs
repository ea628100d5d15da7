// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Line-based unified diffs between the base code and a new generation.
//!
//! Output follows the classic `diff -u` layout with `before<ext>` /
//! `after<ext>` labels. Pure: no IO.

use std::ops::Range;

/// Context lines around each change.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Largest changed middle, in DP cells, that gets an exact LCS. Bigger
/// rewrites are reported as a whole-block replacement.
const MAX_LCS_CELLS: usize = 4_000_000;

/// A line in a diff hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Context line (unchanged).
    Context(String),
    /// Added line (starts with +).
    Added(String),
    /// Removed line (starts with -).
    Removed(String),
}

impl DiffLine {
    /// Get the content of the line (without the +/- prefix).
    pub fn content(&self) -> &str {
        match self {
            DiffLine::Context(s) | DiffLine::Added(s) | DiffLine::Removed(s) => s.as_str(),
        }
    }

    /// Get the line prefix character.
    pub fn prefix(&self) -> char {
        match self {
            DiffLine::Context(_) => ' ',
            DiffLine::Added(_) => '+',
            DiffLine::Removed(_) => '-',
        }
    }
}

/// A hunk in a diff (a section of changes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Zero-based index of the first old line covered.
    pub old_start: usize,
    /// Number of old lines covered.
    pub old_lines: usize,
    /// Zero-based index of the first new line covered.
    pub new_start: usize,
    /// Number of new lines covered.
    pub new_lines: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_lines),
            format_range(self.new_start, self.new_lines)
        )
    }
}

/// A computed unified diff.
#[derive(Debug, Clone)]
pub struct UnifiedDiff {
    pub old_label: String,
    pub new_label: String,
    pub hunks: Vec<DiffHunk>,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl UnifiedDiff {
    /// True when the inputs were line-identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Added/removed counts.
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            lines_added: self.lines_added,
            lines_removed: self.lines_removed,
        }
    }
}

/// Added/removed line counts for captions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.lines_added == 0 && self.lines_removed == 0 {
            write!(f, "no changes")
        } else {
            write!(f, "+{} -{}", self.lines_added, self.lines_removed)
        }
    }
}

/// Diff `before` against `after` and render it, labelled with the
/// artifact's extension hint (e.g. `.py`). Empty when line-identical.
pub fn unified_diff(before: &str, after: &str, ext_hint: &str) -> String {
    let diff = generate_unified_diff(
        before,
        after,
        &format!("before{ext_hint}"),
        &format!("after{ext_hint}"),
        DEFAULT_CONTEXT_LINES,
    );
    render_diff_to_string(&diff)
}

/// Compute a unified diff between two texts.
pub fn generate_unified_diff(
    old_content: &str,
    new_content: &str,
    old_label: &str,
    new_label: &str,
    context_lines: usize,
) -> UnifiedDiff {
    let old_lines: Vec<&str> = old_content.lines().collect();
    let new_lines: Vec<&str> = new_content.lines().collect();

    let changes = compute_diff(&old_lines, &new_lines);
    let hunks = group_changes(&changes, context_lines)
        .into_iter()
        .map(|range| build_hunk(&changes, range, &old_lines, &new_lines))
        .collect();

    let lines_added = changes.iter().filter(|c| matches!(c, Change::Add(_))).count();
    let lines_removed = changes.iter().filter(|c| matches!(c, Change::Delete(_))).count();

    UnifiedDiff {
        old_label: old_label.to_string(),
        new_label: new_label.to_string(),
        hunks,
        lines_added,
        lines_removed,
    }
}

/// Render a diff in unified format, one line per entry, no trailing newline.
pub fn render_diff_to_string(diff: &UnifiedDiff) -> String {
    if diff.is_empty() {
        return String::new();
    }

    let mut out: Vec<String> = Vec::new();
    out.push(format!("--- {}", diff.old_label));
    out.push(format!("+++ {}", diff.new_label));

    for hunk in &diff.hunks {
        out.push(hunk.header());
        for line in &hunk.lines {
            out.push(format!("{}{}", line.prefix(), line.content()));
        }
    }

    out.join("\n")
}

/// A change operation from the diff algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// Line kept (old index, new index).
    Keep(usize, usize),
    /// Line deleted from old.
    Delete(usize),
    /// Line added from new.
    Add(usize),
}

/// LCS diff. Common prefix and suffix are peeled off first so the DP table
/// only covers the changed middle. A middle larger than [`MAX_LCS_CELLS`]
/// becomes a delete-all then add-all block.
fn compute_diff(old: &[&str], new: &[&str]) -> Vec<Change> {
    let prefix = old.iter().zip(new.iter()).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    let m = old_mid.len();
    let n = new_mid.len();

    let mut changes: Vec<Change> = (0..prefix).map(|i| Change::Keep(i, i)).collect();
    let old_tail = old.len() - suffix;
    let new_tail = new.len() - suffix;

    if m.saturating_mul(n) > MAX_LCS_CELLS {
        changes.extend((prefix..old_tail).map(Change::Delete));
        changes.extend((prefix..new_tail).map(Change::Add));
        changes.extend((0..suffix).map(|k| Change::Keep(old_tail + k, new_tail + k)));
        return changes;
    }

    // dp[i][j] = length of LCS of old_mid[i..] and new_mid[j..]
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            dp[i][j] = if old_mid[i] == new_mid[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i][j + 1].max(dp[i + 1][j])
            };
        }
    }

    let (mut i, mut j) = (0usize, 0usize);
    while i < m || j < n {
        if i < m && j < n && old_mid[i] == new_mid[j] {
            changes.push(Change::Keep(prefix + i, prefix + j));
            i += 1;
            j += 1;
        } else if i < m && (j >= n || dp[i + 1][j] >= dp[i][j + 1]) {
            changes.push(Change::Delete(prefix + i));
            i += 1;
        } else {
            changes.push(Change::Add(prefix + j));
            j += 1;
        }
    }

    changes.extend((0..suffix).map(|k| Change::Keep(old_tail + k, new_tail + k)));

    changes
}

/// Group change indices into hunk ranges over `changes`, merging groups
/// whose context would overlap.
fn group_changes(changes: &[Change], context_lines: usize) -> Vec<Range<usize>> {
    let mut groups: Vec<Range<usize>> = Vec::new();

    for (idx, change) in changes.iter().enumerate() {
        if matches!(change, Change::Keep(..)) {
            continue;
        }
        let start = idx.saturating_sub(context_lines);
        let end = (idx + 1 + context_lines).min(changes.len());
        match groups.last_mut() {
            Some(last) if start <= last.end => last.end = end,
            _ => groups.push(start..end),
        }
    }

    groups
}

fn build_hunk(changes: &[Change], range: Range<usize>, old: &[&str], new: &[&str]) -> DiffHunk {
    // Old/new positions before the first op of the hunk.
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for change in &changes[..range.start] {
        match change {
            Change::Keep(..) => {
                old_pos += 1;
                new_pos += 1;
            }
            Change::Delete(_) => old_pos += 1,
            Change::Add(_) => new_pos += 1,
        }
    }

    let mut hunk = DiffHunk {
        old_start: old_pos,
        old_lines: 0,
        new_start: new_pos,
        new_lines: 0,
        lines: Vec::with_capacity(range.len()),
    };

    for change in &changes[range] {
        match *change {
            Change::Keep(i, _) => {
                hunk.lines.push(DiffLine::Context(old[i].to_string()));
                hunk.old_lines += 1;
                hunk.new_lines += 1;
            }
            Change::Delete(i) => {
                hunk.lines.push(DiffLine::Removed(old[i].to_string()));
                hunk.old_lines += 1;
            }
            Change::Add(j) => {
                hunk.lines.push(DiffLine::Added(new[j].to_string()));
                hunk.new_lines += 1;
            }
        }
    }

    hunk
}

/// `diff -u` range: one-based start, count omitted when 1, start points at
/// the preceding line when the range is empty.
fn format_range(start: usize, count: usize) -> String {
    match count {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, count),
    }
}
