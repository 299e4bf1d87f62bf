use humansize::{format_size, DECIMAL};

/// Human-readable "X / Y transferred" text for a byte-progress tick. The
/// transport cannot always supply a total; the text degrades to the running
/// count alone in that case.
pub fn transfer_text(bytes_loaded: u64, total_bytes: Option<u64>) -> String {
    match total_bytes {
        Some(total) => {
            format!("{} / {} transferred", format_size(bytes_loaded, DECIMAL), format_size(total, DECIMAL))
        },
        None => format!("{} transferred", format_size(bytes_loaded, DECIMAL)),
    }
}
