//! Match ranges over plain text and the highlight mark model
//!
//! Highlighting is expressed independently of any renderer: a string plus an
//! ordered list of non-overlapping `(Range, HighlightKind)` marks. Renderers
//! walk [`MarkedText::segments`] and decide how to paint each kind.
//!
//! Offsets are byte offsets into the original string and always fall on char
//! boundaries, so slicing with them is safe.

use regex::{Regex, RegexBuilder};

/// Half-open byte range `[start, end)` into one string, `end > start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// What a highlighted range represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    /// An occurrence of the find query
    Find,
    /// The find occurrence the user navigated to
    CurrentFind,
    /// An occurrence of a focused option flag
    Option,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkedRange {
    pub range: Range,
    pub kind: HighlightKind,
}

/// Extra acceptance rule applied to each raw regex match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermBoundary {
    None,
    /// The match must stand alone as a flag: not glued to word characters or
    /// dashes on the left, not glued to word characters or dashes on the right
    OptionFlag,
}

/// A compiled pattern usable with [`get_ranges`]
#[derive(Debug, Clone)]
pub struct RangePattern {
    regex: Regex,
    boundary: TermBoundary,
}

impl RangePattern {
    /// Case-insensitive literal substring pattern; `None` for an empty needle
    pub fn literal(needle: &str) -> Option<Self> {
        if needle.is_empty() {
            return None;
        }
        let regex = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self {
            regex,
            boundary: TermBoundary::None,
        })
    }

    /// Case-sensitive alternation of literal option tokens
    ///
    /// Longer tokens are tried first so `--recursive` wins over `-r` at the
    /// same position.
    pub fn option_terms<S: AsRef<str>>(terms: &[S]) -> Option<Self> {
        let mut tokens: Vec<&str> = terms
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return None;
        }
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();
        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&alternation).ok()?;
        Some(Self {
            regex,
            boundary: TermBoundary::OptionFlag,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        match self.boundary {
            TermBoundary::None => true,
            TermBoundary::OptionFlag => {
                let glued = |c: char| c.is_alphanumeric() || c == '_' || c == '-';
                let before_ok = text[..start].chars().next_back().map_or(true, |c| !glued(c));
                let after_ok = text[end..].chars().next().map_or(true, |c| !glued(c));
                before_ok && after_ok
            }
        }
    }
}

/// Byte index just past the char starting at `index` (or past the end)
fn step_past(text: &str, index: usize) -> usize {
    match text[index..].chars().next() {
        Some(c) => index + c.len_utf8(),
        None => text.len() + 1,
    }
}

/// All non-overlapping occurrences of `pattern` in `text`, left to right
///
/// Always makes progress: a zero-length match advances the scan by one char.
pub fn get_ranges(text: &str, pattern: &RangePattern) -> Vec<Range> {
    let mut ranges = Vec::new();
    let mut pos = 0;
    while pos <= text.len() {
        let Some(m) = pattern.regex.find_at(text, pos) else {
            break;
        };
        if m.start() == m.end() {
            pos = step_past(text, m.end());
            continue;
        }
        if !pattern.accepts(text, m.start(), m.end()) {
            pos = step_past(text, m.start());
            continue;
        }
        ranges.push(Range::new(m.start(), m.end()));
        pos = m.end();
    }
    ranges
}

/// Number of ranges [`get_ranges`] would return
pub fn count_ranges(text: &str, pattern: &RangePattern) -> usize {
    get_ranges(text, pattern).len()
}

/// Sort a range set and keep a greedy non-overlapping subset
fn normalize(ranges: &[Range]) -> Vec<Range> {
    let mut sorted: Vec<Range> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    sorted.sort();
    let mut kept: Vec<Range> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if kept.last().map_or(true, |last| last.end <= range.start) {
            kept.push(range);
        }
    }
    kept
}

/// Combine find ranges with option ranges, find ranges taking priority
///
/// An option range overlapping any find range is dropped whole, never
/// trimmed. Only the options that survive are then de-overlapped among
/// themselves. The result is sorted by start and pairwise non-overlapping.
pub fn merge_ranges(find_ranges: &[Range], option_ranges: &[Range]) -> Vec<MarkedRange> {
    let mut blockers: Vec<Range> = find_ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    blockers.sort_by_key(|r| r.start);

    let free: Vec<Range> = option_ranges
        .iter()
        .copied()
        .filter(|option| {
            // blockers starting before the option's end are the only candidates
            let candidates = blockers.partition_point(|f| f.start < option.end);
            !blockers[..candidates].iter().any(|f| f.overlaps(option))
        })
        .collect();

    let mut merged: Vec<MarkedRange> = normalize(find_ranges)
        .into_iter()
        .map(|range| MarkedRange {
            range,
            kind: HighlightKind::Find,
        })
        .chain(normalize(&free).into_iter().map(|range| MarkedRange {
            range,
            kind: HighlightKind::Option,
        }))
        .collect();

    merged.sort_by_key(|m| (m.range.start, m.range.end));
    merged
}

/// A string together with its highlight marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText<'a> {
    pub text: &'a str,
    pub marks: Vec<MarkedRange>,
}

/// A contiguous piece of a [`MarkedText`], either marked or not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub range: Range,
    pub kind: Option<HighlightKind>,
}

impl<'a> MarkedText<'a> {
    pub fn plain(text: &'a str) -> Self {
        Self {
            text,
            marks: Vec::new(),
        }
    }

    /// Number of find marks (current or not)
    pub fn find_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| matches!(m.kind, HighlightKind::Find | HighlightKind::CurrentFind))
            .count()
    }

    /// Split the text into marked and unmarked pieces covering it verbatim
    pub fn segments(&self) -> Vec<Segment<'a>> {
        let mut segments = Vec::with_capacity(self.marks.len() * 2 + 1);
        let mut cursor = 0;
        for mark in &self.marks {
            if mark.range.start > cursor {
                segments.push(Segment {
                    text: &self.text[cursor..mark.range.start],
                    range: Range::new(cursor, mark.range.start),
                    kind: None,
                });
            }
            segments.push(Segment {
                text: &self.text[mark.range.start..mark.range.end],
                range: mark.range,
                kind: Some(mark.kind),
            });
            cursor = mark.range.end;
        }
        if cursor < self.text.len() {
            segments.push(Segment {
                text: &self.text[cursor..],
                range: Range::new(cursor, self.text.len()),
                kind: None,
            });
        }
        segments
    }
}

/// Highlight one string
///
/// `current` is the index, among this string's find occurrences, of the one to
/// mark as [`HighlightKind::CurrentFind`].
pub fn mark_text<'a>(
    text: &'a str,
    find: Option<&RangePattern>,
    option: Option<&RangePattern>,
    current: Option<usize>,
) -> MarkedText<'a> {
    let find_ranges = find.map(|p| get_ranges(text, p)).unwrap_or_default();
    let option_ranges = option.map(|p| get_ranges(text, p)).unwrap_or_default();
    let mut marks = merge_ranges(&find_ranges, &option_ranges);
    if let Some(current) = current {
        if let Some(mark) = marks
            .iter_mut()
            .filter(|m| m.kind == HighlightKind::Find)
            .nth(current)
        {
            mark.kind = HighlightKind::CurrentFind;
        }
    }
    MarkedText { text, marks }
}

/// Marks successive text runs of one block
///
/// Keeps a running count of find occurrences so that the block's current
/// match (an index within the whole block) lands on the right run.
#[derive(Debug, Clone, Copy)]
pub struct RunMarker<'p> {
    find: Option<&'p RangePattern>,
    option: Option<&'p RangePattern>,
    current_within_block: Option<usize>,
    seen: usize,
}

impl<'p> RunMarker<'p> {
    pub fn new(
        find: Option<&'p RangePattern>,
        option: Option<&'p RangePattern>,
        current_within_block: Option<usize>,
    ) -> Self {
        Self {
            find,
            option,
            current_within_block,
            seen: 0,
        }
    }

    /// A marker that never highlights anything
    pub fn none() -> Self {
        Self::new(None, None, None)
    }

    pub fn mark<'a>(&mut self, text: &'a str) -> MarkedText<'a> {
        if self.find.is_none() && self.option.is_none() {
            return MarkedText::plain(text);
        }
        let current = self
            .current_within_block
            .and_then(|c| c.checked_sub(self.seen));
        let marked = mark_text(text, self.find, self.option, current);
        self.seen += marked.find_count();
        marked
    }

    /// Find occurrences marked so far
    pub fn seen(&self) -> usize {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: usize, end: usize) -> Range {
        Range::new(start, end)
    }

    #[test]
    fn test_get_ranges_case_insensitive_non_overlapping() {
        let pattern = RangePattern::literal("tar").unwrap();
        assert_eq!(
            get_ranges("Tar tarball untar", &pattern),
            vec![r(0, 3), r(4, 7), r(14, 17)]
        );

        let aa = RangePattern::literal("aa").unwrap();
        assert_eq!(get_ranges("aaaa a", &aa), vec![r(0, 2), r(2, 4)]);
    }

    #[test]
    fn test_get_ranges_escapes_metacharacters() {
        let pattern = RangePattern::literal("a.b(").unwrap();
        assert_eq!(get_ranges("axb( a.b(", &pattern), vec![r(5, 9)]);
        assert!(RangePattern::literal("").is_none());
    }

    #[test]
    fn test_get_ranges_multibyte_offsets_are_char_boundaries() {
        let pattern = RangePattern::literal("é").unwrap();
        let text = "café CAFÉ";
        let ranges = get_ranges(text, &pattern);
        assert_eq!(ranges.len(), 2);
        for range in ranges {
            assert_eq!(text[range.start..range.end].to_lowercase(), "é");
        }
    }

    #[test]
    fn test_option_terms_respect_flag_boundaries() {
        let pattern = RangePattern::option_terms(&["-r", "--recursive"]).unwrap();
        let text = "use -r or --recursive, not -rf or --recursive-ish";
        let found: Vec<&str> = get_ranges(text, &pattern)
            .iter()
            .map(|range| &text[range.start..range.end])
            .collect();
        assert_eq!(found, vec!["-r", "--recursive"]);
        assert!(RangePattern::option_terms::<&str>(&[]).is_none());
    }

    #[test]
    fn test_merge_drops_overlapping_option_ranges_whole() {
        let merged = merge_ranges(&[r(5, 10)], &[r(0, 3), r(8, 12), r(10, 14)]);
        assert_eq!(
            merged,
            vec![
                MarkedRange { range: r(0, 3), kind: HighlightKind::Option },
                MarkedRange { range: r(5, 10), kind: HighlightKind::Find },
                MarkedRange { range: r(10, 14), kind: HighlightKind::Option },
            ]
        );
    }

    #[test]
    fn test_merge_keeps_option_whose_neighbour_was_blocked() {
        // 3..8 hits the find, so 6..10 no longer has an option to lose to
        let merged = merge_ranges(&[r(0, 5)], &[r(3, 8), r(6, 10)]);
        assert_eq!(
            merged,
            vec![
                MarkedRange { range: r(0, 5), kind: HighlightKind::Find },
                MarkedRange { range: r(6, 10), kind: HighlightKind::Option },
            ]
        );
    }

    #[test]
    fn test_merge_normalizes_adversarial_input() {
        let merged = merge_ranges(&[r(0, 10), r(2, 4), r(6, 6)], &[r(0, 10), r(12, 20), r(15, 18)]);
        let ranges: Vec<Range> = merged.iter().map(|m| m.range).collect();
        assert_eq!(ranges, vec![r(0, 10), r(12, 20)]);
        for pair in ranges.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_segments_preserve_text_verbatim() {
        let find = RangePattern::literal("tar").unwrap();
        let option = RangePattern::option_terms(&["-x"]).unwrap();
        let text = "tar -x untar -xv";
        let marked = mark_text(text, Some(&find), Some(&option), Some(1));

        let segments = marked.segments();
        let rebuilt: String = segments.iter().map(|s| s.text).collect();
        assert_eq!(rebuilt, text);

        let kinds: Vec<(&str, Option<HighlightKind>)> =
            segments.iter().map(|s| (s.text, s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("tar", Some(HighlightKind::Find)),
                (" ", None),
                ("-x", Some(HighlightKind::Option)),
                (" un", None),
                ("tar", Some(HighlightKind::CurrentFind)),
                (" -xv", None),
            ]
        );
    }

    #[test]
    fn test_run_marker_carries_current_across_runs() {
        let find = RangePattern::literal("ab").unwrap();
        let mut marker = RunMarker::new(Some(&find), None, Some(2));

        let first = marker.mark("ab ab");
        assert!(first.marks.iter().all(|m| m.kind == HighlightKind::Find));
        let second = marker.mark("xx ab ab");
        assert_eq!(second.marks[0].kind, HighlightKind::CurrentFind);
        assert_eq!(second.marks[1].kind, HighlightKind::Find);
        assert_eq!(marker.seen(), 4);

        let mut plain = RunMarker::none();
        assert!(plain.mark("ab").marks.is_empty());
    }
}
