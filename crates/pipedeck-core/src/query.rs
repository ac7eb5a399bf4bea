//! Search text eligibility and transport encoding.

/// Minimum number of non-whitespace characters before a query is issued.
pub const MIN_QUERY_CHARS: usize = 3;

/// Whether `text` carries enough significant characters to be queried.
///
/// Whitespace is ignored for the length test only.
#[must_use]
pub fn is_eligible(text: &str) -> bool {
    text.chars().filter(|ch| !ch.is_whitespace()).count() >= MIN_QUERY_CHARS
}

/// Eligible search text as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    text: String,
}

impl Query {
    /// Accept `text` when it is eligible, keeping it verbatim.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        is_eligible(text).then(|| Self {
            text: text.to_string(),
        })
    }

    /// Text exactly as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Transport form: words split on single spaces, percent-encoded, and
    /// joined with `+`.
    ///
    /// Consecutive spaces keep their empty segments so the backend sees the
    /// original word boundaries.
    #[must_use]
    pub fn joined(&self) -> String {
        self.text
            .split(' ')
            .map(|word| urlencoding::encode(word).into_owned())
            .collect::<Vec<_>>()
            .join("+")
    }
}
