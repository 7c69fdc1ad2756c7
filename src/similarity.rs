// 🔤 String similarity - Ratcliff/Obershelp
// ratio = 2·M / (|a| + |b|), M = chars covered by recursive longest matches

use std::collections::HashMap;

/// A run of `size` equal chars starting at `a[a_start]` and `b[b_start]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Precomputed index of `b` so one query can be scored against many strings
struct Indexed {
    chars: Vec<char>,
    positions: HashMap<char, Vec<usize>>,
}

impl Indexed {
    fn new(s: &str) -> Self {
        let chars: Vec<char> = s.chars().collect();
        let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in chars.iter().enumerate() {
            positions.entry(*c).or_default().push(j);
        }
        Indexed { chars, positions }
    }
}

/// Longest common run inside `a[alo..ahi]` × `b[blo..bhi]`.
///
/// Among equally long runs the one starting earliest in `a`, then earliest
/// in `b`, wins.
fn find_longest(
    a: &[char],
    b: &Indexed,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> MatchBlock {
    let mut best = MatchBlock {
        a_start: alo,
        b_start: blo,
        size: 0,
    };

    // run length of the match ending at b[j], for the previous row of a
    let mut prev: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut current: HashMap<usize, usize> = HashMap::new();

        if let Some(js) = b.positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|p| prev.get(&p))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                current.insert(j, k);

                if k > best.size {
                    best = MatchBlock {
                        a_start: i + 1 - k,
                        b_start: j + 1 - k,
                        size: k,
                    };
                }
            }
        }

        prev = current;
    }

    best
}

fn collect_blocks(a: &[char], b: &Indexed) -> Vec<MatchBlock> {
    let mut blocks = Vec::new();
    let mut pending = vec![((0, a.len()), (0, b.chars.len()))];

    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let m = find_longest(a, b, (alo, ahi), (blo, bhi));
        if m.size == 0 {
            continue;
        }

        blocks.push(m);

        if alo < m.a_start && blo < m.b_start {
            pending.push(((alo, m.a_start), (blo, m.b_start)));
        }
        let (a_end, b_end) = (m.a_start + m.size, m.b_start + m.size);
        if a_end < ahi && b_end < bhi {
            pending.push(((a_end, ahi), (b_end, bhi)));
        }
    }

    blocks.sort_by_key(|m| (m.a_start, m.b_start));

    // Adjacent runs found by separate recursion steps are merged
    let mut merged: Vec<MatchBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last)
                if last.a_start + last.size == block.a_start
                    && last.b_start + last.size == block.b_start =>
            {
                last.size += block.size;
            }
            _ => merged.push(block),
        }
    }

    merged
}

/// Longest common run of `a` and `b`; size 0 when they share no char
pub fn longest_match(a: &str, b: &str) -> MatchBlock {
    let a: Vec<char> = a.chars().collect();
    let b = Indexed::new(b);
    find_longest(&a, &b, (0, a.len()), (0, b.chars.len()))
}

/// Non-overlapping matching runs of `a` and `b`, ordered by position
pub fn matching_blocks(a: &str, b: &str) -> Vec<MatchBlock> {
    let a: Vec<char> = a.chars().collect();
    collect_blocks(&a, &Indexed::new(b))
}

/// Similarity in [0.0, 1.0]. Two empty strings are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    ratio_indexed(&a, &Indexed::new(b))
}

fn ratio_indexed(a: &[char], b: &Indexed) -> f64 {
    let total = a.len() + b.chars.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = collect_blocks(a, b).iter().map(|m| m.size).sum();
    2.0 * matched as f64 / total as f64
}

/// Scores one query against many candidates, indexing the query once
pub struct Scorer {
    query: Indexed,
}

impl Scorer {
    pub fn new(query: &str) -> Self {
        Scorer {
            query: Indexed::new(query),
        }
    }

    /// `ratio(candidate, query)`
    pub fn score(&self, candidate: &str) -> f64 {
        let a: Vec<char> = candidate.chars().collect();
        ratio_indexed(&a, &self.query)
    }
}

// ============================================================================
// TESTS
// ============================================================================
