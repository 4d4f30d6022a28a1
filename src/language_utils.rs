use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for caption language tags
///
/// Caption tracks are labelled with BCP 47 style tags (`en`, `en-GB`,
/// `pt-BR`, `zh-Hans`). Matching is done on the normalized tag for exact
/// matches and on the primary subtag, resolved through ISO 639, for
/// language-family matches.

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Deprecated two-letter codes YouTube still emits
fn legacy_part1(code: &str) -> &str {
    match code {
        "iw" => "he",
        "in" => "id",
        "ji" => "yi",
        other => other,
    }
}

/// Lowercase a tag and use `-` as the subtag separator
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// The primary language subtag of a tag (`en-GB` -> `en`)
pub fn primary_subtag(tag: &str) -> String {
    let normalized = normalize_tag(tag);
    normalized
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();
    let normalized_code = legacy_part1(&normalized_code);

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(normalized_code).is_some() {
                return Ok(normalized_code.to_string());
            }
            if let Some(part2t) = part2b_to_part2t(normalized_code) {
                return Ok(part2t.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check that a tag has a valid ISO 639 primary subtag
pub fn validate_language_tag(tag: &str) -> Result<()> {
    normalize_to_part2t(&primary_subtag(tag)).map(|_| ())
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Exact tag equality, ignoring case and separator style
pub fn tags_equal(tag1: &str, tag2: &str) -> bool {
    normalize_tag(tag1) == normalize_tag(tag2)
}

/// Whether two tags belong to the same language family (`en`, `en-US`, `eng`)
pub fn same_family(tag1: &str, tag2: &str) -> bool {
    let primary1 = primary_subtag(tag1);
    let primary2 = primary_subtag(tag2);
    primary1 == primary2 || language_codes_match(&primary1, &primary2)
}

/// Get the English language name for a tag
pub fn get_language_name(tag: &str) -> Result<String> {
    let normalized = normalize_to_part2t(&primary_subtag(tag))?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
