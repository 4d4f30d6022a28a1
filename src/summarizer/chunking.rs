/*!
 * Splitting transcripts into provider-sized chunks.
 *
 * Chunks are always cut at item boundaries (transcript lines, or partial
 * summaries during consolidation). An item longer than the limit is never
 * split; it becomes a chunk of its own.
 */

/// Length of a text in characters
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Greedily pack `items` into groups whose joined length stays within
/// `max_chars`. Order is preserved and every item lands in exactly one group.
pub fn pack<S: AsRef<str>>(items: &[S], max_chars: usize, separator: &str) -> Vec<Vec<String>> {
    let separator_len = char_len(separator);
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for item in items {
        let item = item.as_ref();
        let item_len = char_len(item);
        let added_len = if current.is_empty() { item_len } else { separator_len + item_len };

        if !current.is_empty() && current_len + added_len > max_chars {
            groups.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current_len += if current.is_empty() { item_len } else { separator_len + item_len };
        current.push(item.to_string());
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Split transcript lines into chunks, each chunk being the lines joined by `\n`
pub fn chunk_lines<S: AsRef<str>>(lines: &[S], max_chars: usize) -> Vec<String> {
    pack(lines, max_chars, "\n")
        .into_iter()
        .map(|group| group.join("\n"))
        .collect()
}
