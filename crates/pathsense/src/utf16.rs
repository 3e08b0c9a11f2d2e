/// Convert a UTF-16 column offset (from LSP Position.character) to a char
/// column within the given line. Offsets past the end clamp to the line length.
pub fn utf16_column_to_char_column(line: &str, utf16_col: u32) -> usize {
    let mut utf16_count = 0;
    for (char_idx, ch) in line.chars().enumerate() {
        if utf16_count >= utf16_col as usize {
            return char_idx;
        }
        utf16_count += ch.len_utf16();
    }
    line.chars().count()
}

/// Convert a char column back to UTF-16 code units for LSP positions
pub fn char_column_to_utf16_column(line: &str, char_col: usize) -> u32 {
    line.chars().take(char_col).map(char::len_utf16).sum::<usize>() as u32
}
