/// Which side of an entry a pair was derived from.
///
/// Tag text is primary and counts at full weight; body/description text
/// is secondary and counts at half weight (see the scoring parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightClass {
    Primary,
    Secondary,
}

/// An ordered pair of adjacent tokens.
///
/// A single-token sequence yields one degenerate pair with an empty
/// second slot, so one-word tags and one-word queries still match.
/// Tokens are never empty, so the empty second slot is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub first: String,
    pub second: String,
}

impl Pair {
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// The degenerate single-token pair.
    pub fn single(token: &str) -> Self {
        Self {
            first: token.to_string(),
            second: String::new(),
        }
    }

    pub fn is_single(&self) -> bool {
        self.second.is_empty()
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single() {
            write!(f, "({})", self.first)
        } else {
            write!(f, "({} {})", self.first, self.second)
        }
    }
}

/// A pair tagged with the weight class of its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bigram {
    pub pair: Pair,
    pub class: WeightClass,
}

/// Build the ordered pair sequence for a token sequence.
///
/// Matching happens over adjacent pairs rather than single words, so a
/// multi-word phrase carries more signal than its words do alone.
/// `n >= 2` tokens yield `n - 1` overlapping pairs in original order;
/// one token yields the degenerate pair; zero tokens yield nothing.
pub fn pairs(tokens: &[String]) -> Vec<Pair> {
    match tokens {
        [] => Vec::new(),
        [only] => vec![Pair::single(only)],
        _ => tokens
            .windows(2)
            .map(|w| Pair::new(&w[0], &w[1]))
            .collect(),
    }
}

/// Build the ordered pair sequence tagged with a weight class.
///
/// Used for entry text; queries use [`pairs`] directly since the weight
/// credited by a match is decided by the entry side.
pub fn bigrams(tokens: &[String], class: WeightClass) -> Vec<Bigram> {
    pairs(tokens)
        .into_iter()
        .map(|pair| Bigram { pair, class })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn overlapping_pairs_preserve_order() {
        let p = pairs(&toks(&["how", "do", "i", "install"]));
        assert_eq!(
            p,
            vec![
                Pair::new("how", "do"),
                Pair::new("do", "i"),
                Pair::new("i", "install"),
            ]
        );
    }

    #[test]
    fn single_token_gives_degenerate_pair() {
        let p = pairs(&toks(&["install"]));
        assert_eq!(p, vec![Pair::single("install")]);
        assert!(p[0].is_single());
    }

    #[test]
    fn empty_tokens_give_no_pairs() {
        assert!(pairs(&[]).is_empty());
    }

    #[test]
    fn bigrams_carry_the_class() {
        let b = bigrams(&toks(&["install", "knowledge"]), WeightClass::Primary);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].pair, Pair::new("install", "knowledge"));
        assert_eq!(b[0].class, WeightClass::Primary);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Pair::new("a", "b").to_string(), "(a b)");
        assert_eq!(Pair::single("a").to_string(), "(a)");
    }
}
