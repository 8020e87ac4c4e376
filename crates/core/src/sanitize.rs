/// Turns a folder name into an event label.
///
/// A leading `YYYY-MM-DD` token (plus one optional `-`/`_`) is dropped, runs of
/// whitespace and `-` become a single `_`, anything that is not alphanumeric or
/// `_` is removed and surrounding `_` are trimmed. The result may be empty.
pub fn sanitize_event_label(folder_name: &str) -> String {
    let without_date = strip_date_prefix(folder_name);

    let mut collapsed = String::with_capacity(without_date.len());
    let mut in_separator_run = false;
    for ch in without_date.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !in_separator_run {
                collapsed.push('_');
            }
            in_separator_run = true;
        } else {
            in_separator_run = false;
            collapsed.push(ch);
        }
    }

    collapsed
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Sanitizes a free-form device string (camera make/model, artist).
///
/// Every character outside `[A-Za-z0-9_.-]` becomes `_` and doubled
/// underscores are collapsed. Blank input yields `None`.
pub fn sanitize_descriptor(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let ch = if is_descriptor_char(ch) { ch } else { '_' };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }

    Some(out)
}

fn strip_date_prefix(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() < 10 {
        return value;
    }

    let shape_ok = bytes[..10].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return value;
    }

    let rest = &value[10..];
    rest.strip_prefix(['-', '_']).unwrap_or(rest)
}

fn is_descriptor_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
}
