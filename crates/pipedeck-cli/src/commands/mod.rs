//! Command handlers, one module per subcommand.

pub(crate) mod search;
pub(crate) mod stream;
pub(crate) mod suggest;
pub(crate) mod trending;

/// Join positional words into search text.
pub(crate) fn search_text(words: &[String]) -> String {
    words.join(" ")
}
