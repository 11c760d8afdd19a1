use std::collections::BTreeSet;

/// Set of base assets (or tickers) a connector is allowed to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolWhitelist {
    symbols: BTreeSet<String>,
}

impl SymbolWhitelist {
    /// Parse a newline-separated list. Blank lines and surrounding whitespace are ignored.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Whether `symbol` is allowed.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Allowed symbols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Number of allowed symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolWhitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(Into::into).collect(),
        }
    }
}
