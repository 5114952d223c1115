//! Backend version strings

/// Strip a development suffix: `1.17.0.dev0+abc` and `1.17.0-dev` both
/// become `1.17.0`. Release versions are returned trimmed.
pub fn normalize_version(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.find("dev") {
        Some(idx) => {
            let release = trimmed[..idx].trim_end_matches(|c| matches!(c, '.' | '-' | '+' | '_'));
            if release.is_empty() {
                trimmed.to_string()
            } else {
                release.to_string()
            }
        }
        None => trimmed.to_string(),
    }
}

/// Leading `major.minor` of a version; a missing minor counts as 0
fn major_minor(version: &str) -> Option<(u64, u64)> {
    fn leading_digits(part: &str) -> Option<u64> {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    let mut parts = version.trim().split('.');
    let major = leading_digits(parts.next()?)?;
    let minor = match parts.next() {
        Some(part) => leading_digits(part)?,
        None => 0,
    };
    Some((major, minor))
}

/// True when `version` is at least `major.minor`. Unparseable versions are not.
pub fn version_at_least(version: &str, major: u64, minor: u64) -> bool {
    major_minor(version).map_or(false, |found| found >= (major, minor))
}
