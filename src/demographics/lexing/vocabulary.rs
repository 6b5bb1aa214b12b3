//! Closed word lists shared by the locators and the grammars

/// Words naming a group of participants. A snippet always ends on one of them.
pub const PARTICIPANTS_NAMES: &[&str] = &[
    "participants",
    "subjects",
    "controls",
    "hcs",
    "patients",
    "volunteers",
    "individuals",
    "adults",
    "children",
    "adolescents",
    "girls",
    "boys",
    "men",
    "women",
    "males",
    "male",
    "females",
    "female",
    "students",
];

/// Heading vocabulary of the sections worth examining.
pub const PARTICIPANTS_SECTIONS: &str =
    r"(?:participants?|subjects?|patients|population|abstract)";

pub const UNIT_NAMES: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

pub const TEEN_NAMES: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

/// Tens, indexed so that `DOZEN_NAMES[i]` is worth `10 * i`.
pub const DOZEN_NAMES: [&str; 10] = [
    "zero", "ten", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Words that never qualify a participants name.
pub const FUNCTION_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "among", "an", "and", "approximately", "are", "around",
    "as", "at", "be", "been", "before", "being", "between", "both", "but", "by", "comprised",
    "comprising", "consisted", "consisting", "did", "do", "each", "enrolled", "examined", "for",
    "from", "had", "has", "have", "he", "her", "his", "in", "included", "including", "into",
    "involved", "involving", "is", "it", "its", "n", "nearly", "no", "nor", "not", "of", "on",
    "only", "or", "our", "over", "participated", "per", "recruited", "scanned", "she", "studied",
    "tested", "than", "that", "the", "their", "them", "these", "they", "this", "those", "to",
    "total", "under", "us", "versus", "vs", "was", "we", "were", "which", "while", "who", "whom",
    "with", "within", "without",
];

/// Words that open an age statement inside a parenthetical.
pub const AGE_KEYWORDS: &[&str] = &["age", "aged", "ages", "mean", "years", "yrs", "year", "old"];

pub fn is_participants_name(word: &str) -> bool {
    PARTICIPANTS_NAMES.contains(&word)
}

pub fn is_number_word(word: &str) -> bool {
    word == "hundred"
        || UNIT_NAMES.contains(&word)
        || TEEN_NAMES.contains(&word)
        || DOZEN_NAMES.contains(&word)
}

pub fn is_function_word(word: &str) -> bool {
    FUNCTION_WORDS.contains(&word)
}

/// `\b(?:participants|subjects|...)\b`, the alternation used by the snippet splitter.
pub fn participants_name_pattern() -> String {
    format!(r"\b(?:{})\b", PARTICIPANTS_NAMES.join("|"))
}
