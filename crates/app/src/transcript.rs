//! Transcript rendering
//!
//! Plain-text channel transcripts delivered as file attachments when a
//! ticket is closed.

use usher_net::HistoryEntry;

/// Render history entries as a transcript, one line per message,
/// oldest-first as fetched
pub fn render(entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.author,
            entry.content
        ));
    }
    out
}

/// Attachment filename for a ticket transcript
pub fn filename(ticket_id: i64) -> String {
    format!("ticket-{}.txt", ticket_id)
}
