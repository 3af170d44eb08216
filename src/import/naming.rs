//! Turning PascalCase element names into readable labels

use once_cell::sync::Lazy;
use regex::Regex;

/// A capital followed by more capitals or by lowercase letters, ending where the next
/// capital starts or at the end of the name. The trailing capital is consumed by the
/// match but is not part of the word.
static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][A-Z]+)(?:[A-Z]|$)|([A-Z][a-z]*)(?:[A-Z]|$)").unwrap()
});

/// Split an element name like `UniqueName` into `Unique Name`.
///
/// Characters that belong to no word are dropped. That covers digits and a lowercase
/// prefix, and also the word directly in front of a digit: `Version2` gives an empty
/// string and `ABC1` gives `AB`, losing only the `C`.
pub fn split_node_name(name: &str) -> String {
    let mut words = Vec::new();
    let mut start = 0;

    while start < name.len() {
        let Some(caps) = WORD.captures_at(name, start) else {
            break;
        };
        let Some(word) = caps.get(1).or_else(|| caps.get(2)) else {
            break;
        };

        words.push(word.as_str());
        start = word.end();
    }

    words.join(" ")
}
