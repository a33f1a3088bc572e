//! Actor naming helpers: `Prefix_NN` splitting, number formatting and
//! wildcard matching.

/// Split a name into `(prefix, number)`.
///
/// Scans from the end: an underscore splits into the text before it and the
/// text after it; the first non-digit ends the numeric suffix (the prefix
/// keeps that character); a name made only of digits has an empty prefix.
///
/// ```
/// use delta_core::naming::split_proxy_name;
/// assert_eq!(split_proxy_name("Tank_07"), ("Tank".to_string(), "07".to_string()));
/// assert_eq!(split_proxy_name("Tank7"), ("Tank".to_string(), "7".to_string()));
/// assert_eq!(split_proxy_name("Tank"), ("Tank".to_string(), String::new()));
/// assert_eq!(split_proxy_name("42"), (String::new(), "42".to_string()));
/// ```
#[must_use]
pub fn split_proxy_name(full_name: &str) -> (String, String) {
    let bytes = full_name.as_bytes();
    for i in (0..bytes.len()).rev() {
        if bytes[i] == b'_' {
            return (full_name[..i].to_string(), full_name[i + 1..].to_string());
        }
        if !bytes[i].is_ascii_digit() {
            // Everything after `i` is ASCII digits, so `i + 1` is a char boundary.
            return (full_name[..=i].to_string(), full_name[i + 1..].to_string());
        }
    }
    (String::new(), full_name.to_string())
}

/// Format a name number: no leading zeros, zero-padded to two digits.
///
/// ```
/// use delta_core::naming::number_to_string;
/// assert_eq!(number_to_string(2), "02");
/// assert_eq!(number_to_string(123), "123");
/// assert_eq!(number_to_string(0), "00");
/// ```
#[must_use]
pub fn number_to_string(number: i32) -> String {
    let raw = number.to_string();
    let trimmed = match raw.find(|c: char| c != '0') {
        Some(start) => &raw[start..],
        None => raw.as_str(),
    };
    format!("{trimmed:0>2}")
}

/// Leading integer of `s`, `atoi`-style: optional whitespace and sign, then
/// digits up to the first non-digit. Returns 0 when there are no digits and
/// saturates on overflow.
#[must_use]
pub fn leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    i32::try_from(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or_default()
}

/// Case-sensitive glob match supporting `*` (any run) and `?` (one char).
#[must_use]
pub fn wild_match(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = candidate.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_text = 0usize;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}
