//! Single-pass tokenizer over fenced code blocks.
//!
//! The pipeline needs to locate every fenced block exactly once, before any
//! inline pass runs, so code content is never mistaken for strikethrough or
//! URL syntax. Fences use backticks or tildes (three or more); the closing
//! fence must use the same character and be at least as long as the opening
//! fence. An unclosed fence runs to end of input.

/// One fenced code block found in the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FencedBlock {
    /// Info string from the opening fence line (trimmed, may be empty).
    pub(crate) info: String,
    /// Raw content between the fence lines, newline-terminated per line.
    pub(crate) content: String,
    /// Byte offset of the opening fence line in the input.
    pub(crate) start: usize,
    /// Byte offset one past the closing fence line (or end of input).
    pub(crate) end: usize,
}

/// Scan `input` and return all fenced blocks in document order.
pub(crate) fn scan_fences(input: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(char, usize, usize, String, String)> = None;
    let mut offset = 0;

    for line in input.split_inclusive('\n') {
        let line_end = offset + line.len();
        let trimmed = line.trim_start();

        match &mut open {
            Some((fence_char, fence_len, start, info, content)) => {
                if is_closing_fence(trimmed, *fence_char, *fence_len) {
                    blocks.push(FencedBlock {
                        info: std::mem::take(info),
                        content: std::mem::take(content),
                        start: *start,
                        end: line_end,
                    });
                    open = None;
                } else {
                    content.push_str(line);
                }
            }
            None => {
                if let Some((ch, len)) = detect_fence(trimmed) {
                    let info = trimmed[len..].trim().to_owned();
                    open = Some((ch, len, offset, info, String::new()));
                }
            }
        }

        offset = line_end;
    }

    // Unclosed fence: treat the remainder as the block.
    if let Some((_, _, start, info, content)) = open {
        blocks.push(FencedBlock {
            info,
            content,
            start,
            end: input.len(),
        });
    }

    blocks
}

/// Detect an opening fence, returning its character and length.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count >= 3 { Some((first, count)) } else { None }
}

/// Check whether a line closes the current fence.
///
/// The closing fence must use the same character, be at least as long as the
/// opening fence, and carry nothing but whitespace after the fence run.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
