//! Regex pattern sets for the structured label fields.
//!
//! Accepted patterns are parameterized by the expected value; the general
//! patterns only exist to locate *something resembling* the right kind of
//! value once every accepted form has failed, so a failure can be explained.

use once_cell::sync::Lazy;
use regex::Regex;

/// Any percentage mention, optionally tagged `alc/vol` or `by vol`.
pub static ALCOHOL_GENERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s*%(?:\s*alc\.?\s*/\s*vol\.?|\s*by\s*vol\.?)?")
        .expect("fixed pattern compiles")
});

/// Any volume mention in mL or fluid ounces.
pub static VOLUME_GENERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s*(?:ml|mL|oz|fl\.?\s*oz)").expect("fixed pattern compiles")
});

/// Shape of an expected net-contents value: leading digits then a unit.
pub static NET_CONTENTS_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*([a-zA-Z]+)").expect("fixed pattern compiles"));

/// Accepted surface forms for an alcohol percentage, e.g. `45%`,
/// `45 % alc./vol.`, `alc 45% by vol`.
///
/// `content` is the rendered percentage and is escaped before interpolation;
/// a stray metacharacter in the caller's value must match literally.
pub fn alcohol_content_patterns(content: &str) -> Result<Vec<Regex>, regex::Error> {
    let c = regex::escape(content);
    Ok(vec![
        Regex::new(&format!(r"{c}\s*%"))?,
        Regex::new(&format!(r"{c}\s*%\s*alc\.?\s*/\s*vol\.?"))?,
        Regex::new(&format!(r"alc\.?\s*{c}\s*%\s*by\s*vol\.?"))?,
    ])
}

/// Accepted surface forms for a net-contents amount and unit, in the three
/// casings labels actually use: `750ml`, `750mL`, `750ML`. Internal
/// whitespace is optional in all of them.
pub fn net_contents_patterns(amount: &str, unit: &str) -> Result<Vec<Regex>, regex::Error> {
    let n = regex::escape(amount);
    let lower = unit.to_lowercase();

    let mut chars = lower.chars();
    let mixed = match chars.next() {
        Some(first) => format!("{}{}", first, chars.as_str().to_uppercase()),
        None => String::new(),
    };

    Ok(vec![
        Regex::new(&format!(r"{n}\s*{}", regex::escape(&lower)))?,
        Regex::new(&format!(r"{n}\s*{}", regex::escape(&mixed)))?,
        Regex::new(&format!(r"{n}\s*{}", regex::escape(&lower.to_uppercase())))?,
    ])
}
