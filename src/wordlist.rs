//! Human-typable code generation and parsing.
//!
//! The wordlist is a two-column mnemonic list in the spirit of the PGP word
//! list: even positions in the code draw from one column, odd positions
//! from the other, so adjacent words are never drawn from the same set and
//! are harder to confuse when read aloud. This is a compact, self-contained
//! list rather than a literal transcription of the IETF PGP word list.

use crate::error::{RendezvousError, Result};
use rand::Rng;

const SEPARATOR: char = '-';

/// Words used at even positions (0, 2, 4, ...) within a code.
const EVEN_WORDS: &[&str] = &[
    "absorb", "acrobat", "almond", "anchor", "anvil", "apple", "arrow", "ashtray", "aspen",
    "avocado", "badger", "bakery", "balsa", "bamboo", "banjo", "basalt", "beacon", "beaver",
    "birch", "bison", "blanket", "bramble", "brass", "brisket", "bronze", "buckle", "cabin",
    "camel", "canary", "canyon", "cedar", "cello", "chisel", "cinder", "clover", "cobalt",
    "compass", "copper", "coral", "cradle", "cricket", "crimson", "cumin", "cypress", "dahlia",
    "dandelion", "denim", "desert", "domino", "driftwood", "eagle", "ember", "emerald",
    "ferret", "fiddle", "flannel", "flint", "forest", "fossil", "garnet", "ginger", "glacier",
    "granite", "gravel",
];

/// Words used at odd positions (1, 3, 5, ...) within a code.
const ODD_WORDS: &[&str] = &[
    "harbor", "harness", "hazel", "heron", "hickory", "holly", "hornet", "hyacinth", "iguana",
    "indigo", "ivory", "jackal", "jasmine", "jelly", "juniper", "kestrel", "kettle", "kindle",
    "lagoon", "lantern", "larch", "lavender", "lentil", "linen", "lobster", "locust", "magnet",
    "mallow", "mandrel", "maple", "marble", "meadow", "merlin", "mesa", "mistral", "mosaic",
    "nectar", "needle", "nickel", "nimbus", "nutmeg", "oleander", "onyx", "opal", "orchid",
    "osprey", "otter", "paddle", "pebble", "pelican", "pepper", "pewter", "pigeon", "pinecone",
    "plum", "pretzel", "quartz", "quill", "rampart", "raven", "ribbon", "ridge", "rosemary",
    "rudder",
];

/// A human-typable rendezvous code: `<channel-id>-<word>-<word>-...`.
pub type Code = String;

/// Draw `num_words` words from the even/odd columns, alternating, and
/// prepend the channel-id and separator.
///
/// `channel_id` is rendered as a decimal integer with no leading zeros.
pub fn make_code(channel_id: u32, num_words: usize) -> Code {
    let mut rng = rand::thread_rng();
    let mut out = channel_id.to_string();
    for i in 0..num_words {
        let column = if i % 2 == 0 { EVEN_WORDS } else { ODD_WORDS };
        let word = column[rng.gen_range(0..column.len())];
        out.push(SEPARATOR);
        out.push_str(word);
    }
    out
}

/// Parse the decimal channel-id prefix of a code.
///
/// Leading/trailing whitespace is stripped before parsing. Fails with
/// [`RendezvousError::MalformedCode`] if the code has no separator or the
/// prefix isn't a valid `u32`.
pub fn extract_channel_id(code: &str) -> Result<u32> {
    let trimmed = code.trim();
    let prefix = trimmed
        .split_once(SEPARATOR)
        .map(|(head, _)| head)
        .unwrap_or(trimmed);

    prefix
        .parse::<u32>()
        .map_err(|_| RendezvousError::MalformedCode(code.to_string()))
}

/// Validate that `code` has the full `channel-id "-" word *( "-" word )`
/// shape (at least one word after the channel-id), canonicalizing word case
/// to lowercase. Returns the canonicalized code.
pub fn canonicalize(code: &str) -> Result<Code> {
    let trimmed = code.trim();
    let mut parts = trimmed.split(SEPARATOR);

    let channel_id = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RendezvousError::MalformedCode(code.to_string()))?;
    channel_id
        .parse::<u32>()
        .map_err(|_| RendezvousError::MalformedCode(code.to_string()))?;

    let words: Vec<String> = parts
        .map(|w| {
            if w.is_empty() || !w.chars().all(|c| c.is_ascii_alphabetic()) {
                Err(RendezvousError::MalformedCode(code.to_string()))
            } else {
                Ok(w.to_ascii_lowercase())
            }
        })
        .collect::<Result<_>>()?;

    if words.is_empty() {
        return Err(RendezvousError::MalformedCode(code.to_string()));
    }

    let mut out = channel_id.to_string();
    for w in words {
        out.push(SEPARATOR);
        out.push_str(&w);
    }
    Ok(out)
}

/// Tab-completion candidates for a partially-typed code.
///
/// `prefix` is whatever the user has typed so far. `known_channel_ids` is
/// the set of currently-active channel-ids the relay advertises via `GET
/// /list` — the terminal UI (out of scope for this core) is expected to
/// fetch that list and pass it in here on every keystroke.
///
/// Behavior:
/// - If `prefix` has no separator yet, candidates are `"<id>-"` for every
///   known channel-id whose decimal string starts with `prefix`.
/// - If `prefix` has a separator, the channel-id portion must match a known
///   id exactly; candidates are `prefix` with the final (partial) word
///   completed against whichever wordlist column applies to that word's
///   position.
pub fn completion_candidates(prefix: &str, known_channel_ids: &[u32]) -> Vec<String> {
    match prefix.split_once(SEPARATOR) {
        None => known_channel_ids
            .iter()
            .map(|id| id.to_string())
            .filter(|s| s.starts_with(prefix))
            .map(|s| format!("{s}{SEPARATOR}"))
            .collect(),
        Some((id_part, rest)) => {
            let Ok(id) = id_part.parse::<u32>() else {
                return Vec::new();
            };
            if !known_channel_ids.contains(&id) {
                return Vec::new();
            }

            let words: Vec<&str> = rest.split(SEPARATOR).collect();
            let position = words.len() - 1;
            let typed = words[position];
            let column = if position % 2 == 0 { EVEN_WORDS } else { ODD_WORDS };

            let head: String = words[..position]
                .iter()
                .map(|w| format!("{w}{SEPARATOR}"))
                .collect();

            column
                .iter()
                .filter(|w| w.starts_with(&typed.to_ascii_lowercase()))
                .map(|w| format!("{id}{SEPARATOR}{head}{w}"))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_code_round_trips_channel_id() {
        let code = make_code(42, 2);
        assert_eq!(extract_channel_id(&code).unwrap(), 42);
        assert_eq!(code.matches(SEPARATOR).count(), 2);
    }

    #[test]
    fn extract_channel_id_rejects_missing_prefix() {
        assert!(extract_channel_id("not-a-number-here").is_err());
        assert!(extract_channel_id("").is_err());
    }

    #[test]
    fn extract_channel_id_strips_whitespace() {
        assert_eq!(extract_channel_id("  7-crooked-spatula  ").unwrap(), 7);
    }

    #[test]
    fn canonicalize_lowercases_words() {
        let canon = canonicalize("7-CrOoKeD-Spatula").unwrap();
        assert_eq!(canon, "7-crooked-spatula");
    }

    #[test]
    fn canonicalize_rejects_code_with_no_words() {
        assert!(canonicalize("7").is_err());
        assert!(canonicalize("7-").is_err());
    }

    #[test]
    fn canonicalize_rejects_non_alphabetic_word() {
        assert!(canonicalize("7-abc123").is_err());
    }

    #[test]
    fn completion_candidates_match_channel_id_prefix() {
        let ids = [7, 71, 8];
        let candidates = completion_candidates("7", &ids);
        assert!(candidates.contains(&"7-".to_string()));
        assert!(candidates.contains(&"71-".to_string()));
        assert!(!candidates.contains(&"8-".to_string()));
    }

    #[test]
    fn completion_candidates_complete_first_word_from_even_column() {
        let ids = [7];
        let candidates = completion_candidates("7-anc", &ids);
        assert!(candidates.iter().any(|c| c == "7-anchor"));
    }

    #[test]
    fn completion_candidates_reject_unknown_channel_id() {
        let ids = [7];
        assert!(completion_candidates("9-anc", &ids).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn make_code_always_parses_back(channel_id in 0u32..(1 << 31), num_words in 1usize..6) {
            let code = make_code(channel_id, num_words);
            prop_assert_eq!(extract_channel_id(&code).unwrap(), channel_id);
            prop_assert!(canonicalize(&code).is_ok());
        }
    }
}
