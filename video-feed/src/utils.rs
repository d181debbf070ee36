/// Count formatting for views and subscribers
pub mod count {
    /// Compact a count to one decimal with a K/M/B suffix: `999`, `1.5K`,
    /// `2.0M`, `3.1B`.
    pub fn format_views(views: u64) -> String {
        if views >= 1_000_000_000 {
            format!("{:.1}B", views as f64 / 1_000_000_000.0)
        } else if views >= 1_000_000 {
            format!("{:.1}M", views as f64 / 1_000_000.0)
        } else if views >= 1_000 {
            format!("{:.1}K", views as f64 / 1_000.0)
        } else {
            views.to_string()
        }
    }
}

/// Text processing utilities
pub mod text {
    pub const DEFAULT_TITLE_WORDS: usize = 8;

    /// Keep the first `word_limit` words, appending `...` if anything was cut.
    pub fn truncate_title(title: &str, word_limit: usize) -> String {
        let words: Vec<&str> = title.split_whitespace().collect();
        if words.len() > word_limit {
            format!("{}...", words[..word_limit].join(" "))
        } else {
            words.join(" ")
        }
    }
}

/// URL utilities
pub mod url {
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    pub fn embed_url(video_id: &str) -> String {
        format!("https://www.youtube.com/embed/{}", video_id)
    }

    pub fn channel_url(channel_id: &str) -> String {
        format!("https://www.youtube.com/channel/{}", channel_id)
    }
}
