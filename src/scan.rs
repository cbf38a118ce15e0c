//! Leading-number scanning for directive arguments.
//!
//! Shader files in the wild carry trailing comments after numeric
//! arguments (`//!OFFSET 0.5 0.5 // px`), so values are read the way a
//! `%f`/`%d` scan reads them: the longest numeric prefix wins and whatever
//! follows is left unread.

/// Length of the decimal float at the start of `s` (sign, digits, fraction,
/// exponent), or 0 if there is none.
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        i += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    i
}

/// Length of the decimal integer at the start of `s`, or 0 if there is none.
fn int_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    match count_digits(&bytes[sign..]) {
        0 => 0,
        digits => sign + digits,
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Float at the start of `s` plus the unread rest.
pub(crate) fn leading_f32(s: &str) -> Option<(f32, &str)> {
    let len = float_prefix_len(s);
    let value = s[..len].parse().ok()?;
    Some((value, &s[len..]))
}

/// Scan up to `count` whitespace-separated floats from the front of `text`.
/// Stops at the first position that does not start a number.
pub(crate) fn leading_f32s(text: &str, count: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(count);
    let mut rest = text;
    while out.len() < count {
        let Some((value, after)) = leading_f32(rest.trim_start()) else {
            break;
        };
        out.push(value);
        rest = after;
    }
    out
}

/// Integer at the start of `text` (after leading whitespace).
pub(crate) fn leading_i32(text: &str) -> Option<i32> {
    let text = text.trim_start();
    text[..int_prefix_len(text)].parse().ok()
}
