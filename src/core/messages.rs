//! User-facing texts (Indonesian).

pub const START: &str = "Halo! Saya bot downloader YouTube.";

pub const DOWNLOADING: &str = "🔽 Mengunduh lagu dari YouTube...";

pub const SEND_YOUTUBE_LINK: &str = "⚠️ Kirimkan link lagu dari YouTube.";

pub const NOT_FOUND: &str = "❌ File yang diunduh tidak ditemukan!";

/// Text for a reportable error. `message` is expected lower-cased and trimmed.
pub fn error_text(message: &str) -> String {
    format!("❌ Terjadi kesalahan: {}", message)
}
