//! Country-of-origin normalisation
//!
//! Origins arrive as ISO codes or free text ("China", "U.S.A.", "Made in
//! Vietnam"). Everything is reduced to an upper-case two-letter code where
//! the name is recognised; placeholders mean "origin unknown".

/// Values that state nothing about origin
const UNKNOWN_PLACEHOLDERS: &[&str] = &["", "UNKNOWN", "N/A", "NA", "NONE", "TBD", "-", "?"];

/// Normalise a free-text origin. Returns `None` for empty or placeholder
/// values; unrecognised text is returned upper-cased and trimmed.
pub fn normalize_country(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    let stripped = upper
        .strip_prefix("MADE IN ")
        .unwrap_or(&upper)
        .trim()
        .trim_end_matches('.');

    if UNKNOWN_PLACEHOLDERS.contains(&stripped) {
        return None;
    }

    let code = match stripped {
        "US" | "USA" | "U.S" | "U.S.A" | "UNITED STATES" | "UNITED STATES OF AMERICA"
        | "AMERICA" => "US",
        "CN" | "CHN" | "CHINA" | "PRC" | "P.R.C" | "PEOPLE'S REPUBLIC OF CHINA" => "CN",
        "RU" | "RUS" | "RUSSIA" | "RUSSIAN FEDERATION" => "RU",
        "KP" | "PRK" | "NORTH KOREA" | "DPRK" => "KP",
        "IR" | "IRN" | "IRAN" => "IR",
        "KR" | "KOR" | "SOUTH KOREA" | "KOREA" | "REPUBLIC OF KOREA" => "KR",
        "CA" | "CAN" | "CANADA" => "CA",
        "MX" | "MEX" | "MEXICO" => "MX",
        "VN" | "VNM" | "VIETNAM" | "VIET NAM" => "VN",
        "MY" | "MYS" | "MALAYSIA" => "MY",
        "TH" | "THA" | "THAILAND" => "TH",
        "KH" | "KHM" | "CAMBODIA" => "KH",
        "ID" | "IDN" | "INDONESIA" => "ID",
        "IN" | "IND" | "INDIA" => "IN",
        "JP" | "JPN" | "JAPAN" => "JP",
        "TW" | "TWN" | "TAIWAN" => "TW",
        "DE" | "DEU" | "GERMANY" => "DE",
        other => return Some(other.to_string()),
    };

    Some(code.to_string())
}
