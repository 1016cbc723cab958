//! RPL_ISUPPORT (005) helpers.

/// Split an ISUPPORT token into an uppercased key and its value.
///
/// Tokens without `=` get an empty value.
///
/// ```
/// use slirc_wire::split_token;
///
/// assert_eq!(split_token("network=Libera"), ("NETWORK".to_string(), "Libera"));
/// assert_eq!(split_token("WHOX"), ("WHOX".to_string(), ""));
/// ```
pub fn split_token(token: &str) -> (String, &str) {
    let (key, value) = token.split_once('=').unwrap_or((token, ""));
    (key.to_ascii_uppercase(), value)
}

/// Channel membership prefixes advertised by `PREFIX=(modes)symbols`.
///
/// The i-th mode char pairs with the i-th symbol. Defaults to `(ov)@+`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixTable {
    pairs: Vec<(char, char)>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            pairs: vec![('@', 'o'), ('+', 'v')],
        }
    }
}

impl PrefixTable {
    /// Parse a `PREFIX` value like `(qaohv)~&@%+`.
    ///
    /// Pairs beyond the shorter of the two lists are ignored. Returns `None`
    /// when the value is malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let inner = value.strip_prefix('(')?;
        let (modes, symbols) = inner.split_once(')')?;
        let pairs: Vec<(char, char)> = symbols.chars().zip(modes.chars()).collect();
        if pairs.is_empty() {
            return None;
        }
        Some(Self { pairs })
    }

    /// Mode char for a prefix symbol.
    pub fn mode_for(&self, symbol: char) -> Option<char> {
        self.pairs
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, m)| *m)
    }

    /// Whether `c` is one of the advertised symbols.
    pub fn is_symbol(&self, c: char) -> bool {
        self.pairs.iter().any(|(s, _)| *s == c)
    }

    /// Number of advertised prefixes.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no prefixes are known.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Split a NAMES entry such as `@+alice` into mode chars and nick.
    ///
    /// ```
    /// use slirc_wire::PrefixTable;
    ///
    /// let table = PrefixTable::default();
    /// assert_eq!(table.split_nick("@+alice"), ("ov".to_string(), "alice"));
    /// assert_eq!(table.split_nick("bob"), (String::new(), "bob"));
    /// ```
    pub fn split_nick<'a>(&self, entry: &'a str) -> (String, &'a str) {
        let nick = entry.trim_start_matches(|c| self.is_symbol(c));
        let symbols = &entry[..entry.len() - nick.len()];
        let modes = symbols.chars().filter_map(|c| self.mode_for(c)).collect();
        (modes, nick)
    }
}
