//! ROM name plausibility scoring
//!
//! When an archive holds several files with acceptable extensions, each
//! candidate name is scored and the best one is loaded. The score combines:
//! - Extension strength (unique console extension beats a shared one)
//! - GoodTools dump tags (`[!]` verified, `[b]` bad dump, `[h]` hack, ...)
//! - Region tags (world/USA releases preferred)
//! - Similarity to the name the ROM was requested under (Levenshtein distance)
//! - Penalties for auxiliary files (BIOS images, nested folders)

use romdeck_shared::{ExtensionPolicy, file_stem};

/// Weight of an entry whose extension is in the unique-preferred list.
const UNIQUE_EXTENSION: i32 = 100;
/// Weight of an entry whose extension is only in the non-unique list.
const SHARED_EXTENSION: i32 = 50;
/// Maximum bonus for matching the requested name exactly.
const NAME_SIMILARITY: i32 = 30;
/// Penalty per directory level an entry is nested under.
const NESTING_PENALTY: i32 = 2;

/// Dump and release tags with their score adjustments, matched case-insensitively.
const TAG_WEIGHTS: &[(&str, i32)] = &[
    ("[!]", 20),
    ("[b", -40),
    ("[h", -25),
    ("(hack", -25),
    ("[t", -25),
    ("[o", -20),
    ("[f", -10),
    ("[a", -5),
    ("(beta", -15),
    ("(proto", -15),
    ("(demo", -15),
    ("(sample", -15),
    ("(world", 10),
    ("(usa", 10),
    ("(u)", 10),
    ("(europe", 5),
    ("(e)", 5),
    ("(japan", 2),
    ("(j)", 2),
];

/// Words that mark a file as auxiliary rather than the game itself.
const AUXILIARY_WORDS: &[&str] = &["bios", "boot", "patch", "sample", "readme"];

/// Penalty for an auxiliary file.
const AUXILIARY_PENALTY: i32 = 60;

/// Scores candidate entry names against an extension policy.
pub struct NameScorer<'a> {
    policy: &'a ExtensionPolicy,
    expected: Option<String>,
}

impl<'a> NameScorer<'a> {
    /// `expected_name` is the name the ROM was requested under (usually the
    /// archive's file name); its extension is ignored.
    pub fn new(policy: &'a ExtensionPolicy, expected_name: Option<&str>) -> Self {
        let expected = expected_name
            .map(|n| canonical_title(file_stem(n)))
            .filter(|n| !n.is_empty());
        Self { policy, expected }
    }

    /// Whether the entry is a candidate at all.
    pub fn is_candidate(&self, name: &str) -> bool {
        self.policy.matches_any(name)
    }

    /// Plausibility score of `name`; higher is better.
    ///
    /// Names that are not candidates score `i32::MIN`.
    pub fn score(&self, name: &str) -> i32 {
        if !self.is_candidate(name) {
            return i32::MIN;
        }

        let mut score = if self.policy.unique_match(name).is_some() {
            UNIQUE_EXTENSION
        } else {
            SHARED_EXTENSION
        };

        let lower = name.to_lowercase();
        let base = lower.rsplit(['/', '\\']).next().unwrap_or(&lower);

        for (tag, weight) in TAG_WEIGHTS {
            if base.contains(tag) {
                score += weight;
            }
        }

        let stem = canonical_title(file_stem(base));
        if AUXILIARY_WORDS
            .iter()
            .any(|w| stem.split(' ').any(|word| word == *w))
        {
            score -= AUXILIARY_PENALTY;
        }

        let depth = lower.trim_end_matches('/').matches(['/', '\\']).count() as i32;
        score -= depth * NESTING_PENALTY;

        if let Some(expected) = &self.expected {
            score += similarity_bonus(&stem, expected);
        }

        score
    }
}

/// Bonus in `0..=NAME_SIMILARITY` scaled by normalized edit distance.
fn similarity_bonus(candidate: &str, expected: &str) -> i32 {
    let longest = candidate.chars().count().max(expected.chars().count());
    if longest == 0 {
        return 0;
    }
    let distance = levenshtein_distance(candidate, expected).min(longest);
    let similarity = 1.0 - distance as f64 / longest as f64;
    (similarity * NAME_SIMILARITY as f64).round() as i32
}

/// Lowercase title with bracketed tags removed and punctuation collapsed.
///
/// `"Pokemon - Emerald Version (USA, Europe) [!]"` -> `"pokemon emerald version"`
pub fn canonical_title(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_alphanumeric() => out.extend(c.to_lowercase()),
            _ => out.push(' '),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    // Pre-collect chars to avoid O(n) .chars().nth() calls
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let len1 = chars1.len();
    let len2 = chars2.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Two rolling rows are enough; names can be long in no-intro sets.
    let mut prev: Vec<usize> = (0..=len2).collect();
    let mut curr = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr[0] = i;
        for j in 1..=len2 {
            let cost = if chars1[i - 1] == chars2[j - 1] { 0 } else { 1 };
            curr[j] = std::cmp::min(
                std::cmp::min(prev[j] + 1, curr[j - 1] + 1),
                prev[j - 1] + cost,
            );
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ExtensionPolicy {
        ExtensionPolicy::new(["gba", "gb", "gbc"], ["gba", "gb", "gbc", "bin"])
    }

    #[test]
    fn non_candidates_score_minimum() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, None);
        assert_eq!(scorer.score("readme.txt"), i32::MIN);
        assert_eq!(scorer.score("cover.png"), i32::MIN);
        assert!(scorer.score("game.gba") > i32::MIN);
    }

    #[test]
    fn unique_extension_beats_shared_extension() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, None);
        assert!(scorer.score("game.gba") > scorer.score("game.bin"));
    }

    #[test]
    fn verified_dump_beats_bad_dump() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, None);
        assert!(scorer.score("Tetris (World) [!].gb") > scorer.score("Tetris (World).gb"));
        assert!(scorer.score("Tetris (World).gb") > scorer.score("Tetris (World) [b1].gb"));
        assert!(scorer.score("Tetris (USA).gb") > scorer.score("Tetris (Japan).gb"));
        assert!(scorer.score("Tetris.gb") > scorer.score("Tetris (Beta).gb"));
    }

    #[test]
    fn bios_images_are_penalized() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, None);
        assert!(scorer.score("gba_bios.bin") < scorer.score("game.bin"));
        assert!(scorer.score("bios.gba") < scorer.score("game.gba"));
    }

    #[test]
    fn nested_entries_lose_to_root_entries() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, None);
        assert!(scorer.score("game.gba") > scorer.score("extras/game.gba"));
    }

    #[test]
    fn requested_name_breaks_ties() {
        let policy = policy();
        let scorer = NameScorer::new(&policy, Some("Golden Sun (USA).zip"));
        assert!(scorer.score("Golden Sun (USA).gba") > scorer.score("Advance Wars (USA).gba"));
    }

    #[test]
    fn canonical_title_strips_tags_and_punctuation() {
        assert_eq!(
            canonical_title("Pokemon - Emerald Version (USA, Europe) [!]"),
            "pokemon emerald version"
        );
        assert_eq!(canonical_title("Super_Mario-Land"), "super mario land");
        assert_eq!(canonical_title("((nested) tag) title"), "title");
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", "ab"), 1);
        assert_eq!(levenshtein_distance("abc", "abcd"), 1);
        assert_eq!(levenshtein_distance("abc", "def"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn similarity_bonus_bounds() {
        assert_eq!(similarity_bonus("golden sun", "golden sun"), NAME_SIMILARITY);
        assert_eq!(similarity_bonus("abc", "xyz"), 0);
        assert_eq!(similarity_bonus("", ""), 0);
    }
}
