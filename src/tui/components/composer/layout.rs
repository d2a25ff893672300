//! Row layout for the composer buffer.
//!
//! The buffer is hard-wrapped by display width (no word wrapping) so that a
//! byte offset maps to exactly one screen cell. Rendering and cursor
//! placement both go through [`rows`], which keeps them in agreement.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Maximum number of text rows shown before the composer scrolls.
pub(super) const MAX_VISIBLE_LINES: u16 = 5;
/// Top and bottom border.
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Left and right border.
const HORIZONTAL_OVERHEAD: u16 = 2;

/// One screen row, as a byte range into the buffer. Never includes `'\n'`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

pub(super) fn inner_width(box_width: u16) -> u16 {
    box_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Splits `text` into rows no wider than `width` cells. Always returns at
/// least one row.
pub(super) fn rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut start = line_start;
        let mut used = 0;
        for (i, ch) in line.char_indices() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && used > 0 {
                rows.push(Row {
                    start,
                    end: line_start + i,
                });
                start = line_start + i;
                used = 0;
            }
            used += w;
        }
        rows.push(Row {
            start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }

    rows
}

/// Row index and display column of byte offset `pos`.
///
/// At a soft wrap boundary the cursor belongs to the following row.
pub(super) fn locate(text: &str, rows: &[Row], pos: usize) -> (usize, u16) {
    let row = rows.iter().rposition(|r| r.start <= pos).unwrap_or(0);
    let start = rows.get(row).map_or(0, |r| r.start);
    let col = text.get(start..pos).map_or(0, |s| s.width());
    (row, col as u16)
}

/// Byte offset in `row` closest to display column `col` without passing it.
pub(super) fn offset_at(text: &str, row: Row, col: u16) -> usize {
    let mut used = 0;
    for (i, ch) in text[row.start..row.end].char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > usize::from(col) {
            return row.start + i;
        }
        used += w;
    }
    row.end
}

/// New cursor offset after moving `delta` rows, or `None` at the edge.
pub(super) fn move_vertically(text: &str, pos: usize, delta: isize, width: u16) -> Option<usize> {
    let rows = rows(text, width);
    let (row, col) = locate(text, &rows, pos);
    let target = row.checked_add_signed(delta).filter(|&r| r < rows.len())?;
    Some(offset_at(text, rows[target], col))
}

/// Keeps `cursor_row` inside the visible window starting at `scroll`.
pub(super) fn scroll_for(cursor_row: usize, scroll: u16) -> u16 {
    let row = cursor_row as u16;
    if row < scroll {
        row
    } else if row >= scroll + MAX_VISIBLE_LINES {
        row + 1 - MAX_VISIBLE_LINES
    } else {
        scroll
    }
}

pub(super) fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}
