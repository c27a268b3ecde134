/// Lexical content filter applied to post text at read time.
///
/// Matching is an exact, case-sensitive substring test with no
/// normalization, so `"Fuck"` does not match a `"fuck"` entry.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    blocklist: Vec<String>,
}

impl ContentFilter {
    /// Empty entries are dropped; an empty term would match every message.
    pub fn new<I, S>(blocklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocklist: blocklist
                .into_iter()
                .map(Into::into)
                .filter(|term: &String| !term.is_empty())
                .collect(),
        }
    }

    pub fn is_filtered(&self, message: &str) -> bool {
        self.blocklist.iter().any(|term| message.contains(term.as_str()))
    }

    pub fn terms(&self) -> &[String] {
        &self.blocklist
    }
}
