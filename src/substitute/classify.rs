//! Token classification for placeholder matches inside a word
//!
//! All indices are byte offsets into the word and always sit on character
//! boundaries, since they come from `str::find`.

/// Whether the character can be part of an identifier
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphabetic() || c.is_numeric()
}

fn char_before(word: &str, index: usize) -> Option<char> {
    word[..index].chars().next_back()
}

fn char_after(word: &str, index: usize) -> Option<char> {
    word[index..].chars().next()
}

/// Whether a match of `len` bytes at `index` touches a word character on either side
///
/// An embedded match is part of a longer identifier (`NewItem`); anything
/// else is an exact match (`Item`, `*Item`, `[]Item{}`).
pub fn is_embedded(word: &str, index: usize, len: usize) -> bool {
    char_before(word, index).is_some_and(is_word_char)
        || char_after(word, index + len).is_some_and(is_word_char)
}

/// Whether the match at `index` is the native-interop form `<prefix><placeholder>`
///
/// The prefix must start its identifier and nothing may follow the
/// placeholder, so `CItem` qualifies while `ABCItem` and `CItemList` do not.
pub fn is_native_match(word: &str, placeholder: &str, index: usize, prefix: char) -> bool {
    let mut before = word[..index].chars().rev();
    if before.next() != Some(prefix) {
        return false;
    }
    if char_after(word, index + placeholder.len()).is_some_and(is_word_char) {
        return false;
    }
    !before.next().is_some_and(is_word_char)
}

/// Whether the word names an exported identifier
///
/// Looks at the first character after the last `.`, skipping pointer,
/// reference and call sigils. A word without a qualifying dot, or with an
/// empty trailing segment, is not exported.
///
/// Unqualified words never count as exported, even when they start
/// uppercase: `FooBar` with `int` must give `intBar`, not `IntBar`.
pub fn is_exported(word: &str) -> bool {
    let Some(dot) = word.rfind('.') else {
        return false;
    };
    word[dot + 1..]
        .trim_start_matches(['*', '&', '('])
        .chars()
        .next()
        .is_some_and(char::is_uppercase)
}

/// Turn a concrete type into something that can sit inside an identifier
///
/// `*bytes.Buffer` becomes `bytesBuffer`, or `BytesBuffer` when exported.
pub fn wordify(concrete: &str, exported: bool) -> String {
    let trimmed = concrete
        .trim_end_matches(['{', '}'])
        .trim_start_matches(['*', '&']);
    let joined: String = trimmed.chars().filter(|c| *c != '.').collect();
    if !exported {
        return joined;
    }
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('Z'));
        assert!(is_word_char('7'));
        assert!(is_word_char('_'));
        assert!(is_word_char('é'));
        assert!(!is_word_char('.'));
        assert!(!is_word_char('*'));
        assert!(!is_word_char('('));
    }

    #[test]
    fn test_exact_matches() {
        assert!(!is_embedded("Item", 0, 4));
        assert!(!is_embedded("*Item", 1, 4));
        assert!(!is_embedded("[]Item{}", 2, 4));
        assert!(!is_embedded("pkg.Item", 4, 4));
    }

    #[test]
    fn test_embedded_matches() {
        assert!(is_embedded("NewItem", 3, 4));
        assert!(is_embedded("ItemList", 0, 4));
        assert!(is_embedded("_Item", 1, 4));
    }

    #[test]
    fn test_native_match() {
        assert!(is_native_match("CItem", "Item", 1, 'C'));
        assert!(is_native_match("(CItem)", "Item", 2, 'C'));
        assert!(is_native_match("*CItem", "Item", 2, 'C'));
    }

    #[test]
    fn test_native_match_rejects_longer_identifiers() {
        // prefix letter is the tail of another identifier
        assert!(!is_native_match("ABCItem", "Item", 3, 'C'));
        // placeholder continues into another word
        assert!(!is_native_match("CItemList", "Item", 1, 'C'));
        // no prefix at all
        assert!(!is_native_match("NewItem", "Item", 3, 'C'));
        assert!(!is_native_match("Item", "Item", 0, 'C'));
    }

    #[test]
    fn test_exported() {
        assert!(is_exported("pkg.Item"));
        assert!(is_exported("pkg.*Item"));
        assert!(is_exported("a.b.(&Item"));
        assert!(!is_exported("pkg.newItem"));
        assert!(!is_exported("Pkg.item"));
    }

    #[test]
    fn test_unqualified_words_not_exported() {
        assert!(!is_exported("NewItem"));
        assert!(!is_exported("*Item"));
        assert!(!is_exported("newItem"));
    }

    #[test]
    fn test_exported_empty_trailing_segment() {
        assert!(!is_exported("pkg."));
        assert!(!is_exported(""));
        assert!(!is_exported("*"));
    }

    #[test]
    fn test_wordify() {
        assert_eq!(wordify("int", false), "int");
        assert_eq!(wordify("int", true), "Int");
        assert_eq!(wordify("*bytes.Buffer", false), "bytesBuffer");
        assert_eq!(wordify("*bytes.Buffer", true), "BytesBuffer");
        assert_eq!(wordify("struct{}", true), "Struct");
        assert_eq!(wordify("", true), "");
    }
}
