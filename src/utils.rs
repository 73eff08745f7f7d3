const SIZE_SUFFIXES: [&str; 8] = ["B", "K", "M", "G", "T", "P", "E", "Z"];

/// Formats a byte count with 1024-based suffixes and one decimal, e.g.
/// `1536` becomes `1.5K`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;

    for suffix in &SIZE_SUFFIXES[..SIZE_SUFFIXES.len() - 1] {
        if size < 1024.0 {
            return format!("{size:3.1}{suffix}");
        }
        size /= 1024.0;
    }

    format!("{size:3.1}{}", SIZE_SUFFIXES[SIZE_SUFFIXES.len() - 1])
}
