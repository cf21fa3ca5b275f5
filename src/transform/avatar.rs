//! Avatar initials and colors shared by the support and users views.

/// Background colors for generated avatars.
///
/// Order matters: the color of a user is an index into this table, and both
/// list views must agree on it.
pub const AVATAR_PALETTE: [&str; 8] = [
    "#3B82F6", // blue
    "#10B981", // emerald
    "#8B5CF6", // violet
    "#F59E0B", // amber
    "#EF4444", // red
    "#EC4899", // pink
    "#6366F1", // indigo
    "#14B8A6", // teal
];

/// Deterministic palette entry for a user id.
///
/// The id is folded with the 31-multiplier string hash over its UTF-16 code
/// units in 32-bit wrapping arithmetic, then reduced modulo the palette size.
pub fn avatar_color(user_id: &str) -> &'static str {
    let hash = user_id.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add((hash << 5).wrapping_sub(hash))
    });
    AVATAR_PALETTE[hash.unsigned_abs() as usize % AVATAR_PALETTE.len()]
}

/// Up to two uppercase initials from a display name.
///
/// Words are split on whitespace, dots, dashes and underscores; a name with a
/// single word yields its first letter. Empty input yields `"?"`.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split(|c: char| c.is_whitespace() || matches!(c, '.' | '-' | '_'))
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}
