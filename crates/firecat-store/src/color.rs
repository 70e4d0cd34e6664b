//! Colour normalisation

/// Convert a colour string to canonical lowercase `#rrggbb`.
///
/// Accepts `#rrggbb` in any case or the functional `rgb(r, g, b)` form.
/// Anything else is returned unchanged.
pub fn rgb_to_hex(color: &str) -> String {
    if color.len() == 7 && color.starts_with('#') {
        return color.to_ascii_lowercase();
    }

    match parse_rgb_function(color) {
        Some((r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        None => color.to_string(),
    }
}

fn parse_rgb_function(color: &str) -> Option<(u8, u8, u8)> {
    let trimmed = color.trim();
    let prefix = trimmed.get(..3)?;
    if !prefix.eq_ignore_ascii_case("rgb") {
        return None;
    }

    let args = trimmed[3..]
        .trim_start()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')?;

    let mut parts = args.split(',').map(|part| part.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}
