pub trait Capitalize {
    fn capitalize(&self) -> String;
}

impl Capitalize for String {
    /// Upper-cases the first character only; names further in stay intact.
    fn capitalize(&self) -> String {
        let mut chars = self.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl Capitalize for &str {
    fn capitalize(&self) -> String {
        self.to_string().capitalize()
    }
}

pub fn pluralize(noun: &str) -> String {
    let lower = noun.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        format!("{}es", noun)
    } else if lower.ends_with('y')
        && !lower
            .chars()
            .rev()
            .nth(1)
            .map(is_vowel)
            .unwrap_or(false)
    {
        format!("{}ies", &noun[..noun.len() - 1])
    } else {
        format!("{}s", noun)
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// "a" or "an" for the given noun.
pub fn article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some(c) if is_vowel(c) => "an",
        _ => "a",
    }
}

pub fn number_word(n: usize) -> String {
    const WORDS: [&str; 13] = [
        "no", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}
