//! Segment-level route matching.
//!
//! # Responsibilities
//! - Split request paths into segment ranges
//! - Align a compiled pattern against those segments
//! - Capture parameter values as ranges into the request path
//!
//! # Design Decisions
//! - Captures are byte ranges, so a match never copies the path
//! - Optional parameters and inner wildcards backtrack through an explicit
//!   stack; depth is bounded by the pattern length, not the request
//! - Each `(pattern, segment)` state is expanded at most once per match, so
//!   backtracking stays polynomial in the request path
//! - Prefix (middleware) matching stops as soon as the pattern is consumed

use std::ops::Range;
use std::sync::Arc;

use crate::routing::pattern::{Pattern, Segment};

/// A request path split into non-empty segments.
#[derive(Debug, Default, Clone)]
pub struct PathSegments {
    ranges: Vec<Range<usize>>,
    trailing_slash: bool,
}

impl PathSegments {
    pub fn parse(path: &str) -> Self {
        let mut segments = Self::default();
        segments.reset(path);
        segments
    }

    /// Re-split `path`, reusing the existing allocation.
    pub fn reset(&mut self, path: &str) {
        self.ranges.clear();
        let mut start = 0;
        for (i, b) in path.bytes().enumerate() {
            if b == b'/' {
                if i > start {
                    self.ranges.push(start..i);
                }
                start = i + 1;
            }
        }
        if path.len() > start {
            self.ranges.push(start..path.len());
        }
        self.trailing_slash = path.len() > 1 && path.ends_with('/');
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Byte range covering `take` segments starting at `start`.
    fn span(&self, start: usize, take: usize, path_len: usize) -> Range<usize> {
        if take == 0 {
            let at = self.ranges.get(start).map_or(path_len, |r| r.start);
            return at..at;
        }
        self.ranges[start].start..self.ranges[start + take - 1].end
    }
}

/// A captured parameter: name plus its byte range in the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: Arc<str>,
    pub value: Range<usize>,
}

enum Retry {
    /// Re-run from an optional parameter, treating it as absent.
    SkipOptional { pi: usize, si: usize },
    /// Re-run from an inner wildcard with one segment fewer.
    ShrinkWildcard { pi: usize, si: usize, take: usize },
}

struct Backtrack {
    retry: Retry,
    captures: usize,
}

/// Align `pattern` against `segments` of `path`.
///
/// With `prefix` set the pattern only has to cover the start of the path.
/// On success the captures are appended to `captures`; on failure `captures`
/// is left as it was.
pub fn match_pattern(
    pattern: &Pattern,
    path: &str,
    segments: &PathSegments,
    prefix: bool,
    captures: &mut Vec<Capture>,
) -> bool {
    let base = captures.len();
    let compiled = pattern.segments();
    let total = segments.len();
    let mut stack: Vec<Backtrack> = Vec::new();
    let mut expanded = can_backtrack(compiled).then(|| Expanded::new(compiled.len(), total));
    let (mut pi, mut si) = (0usize, 0usize);

    loop {
        let advanced = if expanded.as_mut().is_some_and(|e| !e.insert(pi, si)) {
            false
        } else if pi == compiled.len() {
            if prefix || (si == total && slash_agrees(pattern, segments)) {
                return true;
            }
            false
        } else {
            match &compiled[pi] {
                Segment::Static(text) => match segments.ranges.get(si) {
                    Some(r) if pattern.static_eq(text, &path[r.clone()]) => {
                        pi += 1;
                        si += 1;
                        true
                    }
                    _ => false,
                },
                Segment::Param { name, optional } => match segments.ranges.get(si) {
                    Some(r) => {
                        if *optional {
                            stack.push(Backtrack {
                                retry: Retry::SkipOptional { pi, si },
                                captures: captures.len(),
                            });
                        }
                        captures.push(Capture {
                            name: Arc::clone(name),
                            value: r.clone(),
                        });
                        pi += 1;
                        si += 1;
                        true
                    }
                    None if *optional => {
                        pi += 1;
                        true
                    }
                    None => false,
                },
                Segment::Wildcard => {
                    let take = total - si;
                    if take > 0 && pi + 1 < compiled.len() {
                        stack.push(Backtrack {
                            retry: Retry::ShrinkWildcard { pi, si, take },
                            captures: captures.len(),
                        });
                    }
                    captures.push(Capture {
                        name: pattern.wildcard_name(),
                        value: segments.span(si, take, path.len()),
                    });
                    pi += 1;
                    si += take;
                    true
                }
            }
        };

        if advanced {
            continue;
        }

        let Some(point) = stack.pop() else {
            captures.truncate(base);
            return false;
        };
        captures.truncate(point.captures);
        match point.retry {
            Retry::SkipOptional { pi: p, si: s } => {
                pi = p + 1;
                si = s;
            }
            Retry::ShrinkWildcard { pi: p, si: s, take } => {
                let take = take - 1;
                if take > 0 {
                    stack.push(Backtrack {
                        retry: Retry::ShrinkWildcard { pi: p, si: s, take },
                        captures: captures.len(),
                    });
                }
                captures.push(Capture {
                    name: pattern.wildcard_name(),
                    value: segments.span(s, take, path.len()),
                });
                pi = p + 1;
                si = s + take;
            }
        }
    }
}

/// Whether a failed step can ever resume from a saved backtrack point.
fn can_backtrack(compiled: &[Segment]) -> bool {
    compiled.iter().enumerate().any(|(i, s)| match s {
        Segment::Param { optional, .. } => *optional,
        Segment::Wildcard => i + 1 < compiled.len(),
        Segment::Static(_) => false,
    })
}

/// Alignment states `(pattern index, segment index)` already expanded.
///
/// Every step advances the pattern index, so a state never reaches itself.
/// Seeing a state again means its first expansion finished without a match.
struct Expanded {
    bits: Vec<u64>,
    width: usize,
}

impl Expanded {
    fn new(pattern_len: usize, segment_count: usize) -> Self {
        let width = segment_count + 1;
        let states = (pattern_len + 1) * width;
        Self {
            bits: vec![0; states.div_ceil(64)],
            width,
        }
    }

    /// Mark `(pi, si)`; false when it was already marked.
    fn insert(&mut self, pi: usize, si: usize) -> bool {
        let index = pi * self.width + si;
        let (word, bit) = (index / 64, 1u64 << (index % 64));
        let fresh = self.bits[word] & bit == 0;
        self.bits[word] |= bit;
        fresh
    }
}

/// Strict routing distinguishes `/foo` from `/foo/` unless a wildcard ends the pattern.
fn slash_agrees(pattern: &Pattern, segments: &PathSegments) -> bool {
    !pattern.options().strict_routing
        || pattern.ends_with_wildcard()
        || pattern.trailing_slash() == segments.trailing_slash()
}
