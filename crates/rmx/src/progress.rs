// AI
//! 📊 progress.rs — "Are we there yet?" — every migration, every time, forever.
//!
//! 🚀 One bar, one tick per route handed to the sink. Under it, a small table
//! with the rate, the elapsed time and a guess at the rest.
//!
//! ⚠️  Watching this progress bar will not make the route manager answer faster.
//! We've tried. Science says no.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

/// 🔢 "1000000 routes" → "1,000,000 routes". Nobody has that many routes. Yet.
pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ MM:SS, or HH:MM:SS if the change window is going very badly.
pub(crate) fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 📊 Progress of the submission phase. `&self` everywhere, so concurrent submitters can share it.
pub(crate) struct SubmitProgress {
    /// 🏷️ who's receiving the routes
    sink_name: String,
    total: u64,
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for SubmitProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar doesn't derive Debug. it's a diva.
        f.debug_struct("SubmitProgress")
            .field("sink_name", &self.sink_name)
            .field("total", &self.total)
            .field("position", &self.progress_bar.position())
            .finish()
    }
}

impl SubmitProgress {
    pub(crate) fn new(sink_name: String, total: u64) -> Self {
        let progress_bar = ProgressBar::new(total);
        // -- 🐛 template is a literal; the fallback is there so a typo costs us colors, not the run
        let style = ProgressStyle::with_template("{msg}\n| [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        progress_bar.set_style(style);

        let progress = Self {
            sink_name,
            total,
            progress_bar,
            start_time: Instant::now(),
        };
        progress.render();
        progress
    }

    /// 🔄 One more route dealt with.
    pub(crate) fn tick(&self) {
        self.progress_bar.inc(1);
        self.render();
    }

    pub(crate) fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    /// ✅ Done. Ring the bell.
    pub(crate) fn finish(&self) {
        self.render();
        self.progress_bar.finish();
    }

    // -- 🎨 two rows, two columns, no borders. rate + count, elapsed + remaining.
    fn render(&self) {
        let done = self.progress_bar.position();
        let elapsed = self.start_time.elapsed();
        let elapsed_secs = elapsed.as_secs_f64();
        let per_sec = if elapsed_secs > 0.0 { done as f64 / elapsed_secs } else { 0.0 };
        let remaining = if done > 0 && done < self.total {
            // 🔮 linear extrapolation. assumes the route manager stays in the mood.
            let left = (self.total - done) as f64 * (elapsed_secs / done as f64);
            format_duration(Duration::from_secs_f64(left))
        } else {
            "--:--".to_string()
        };

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{:.1} Routes/s", per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} Routes", format_number(done))).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{} elapsed", format_duration(elapsed))).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} remaining", remaining)).set_alignment(CellAlignment::Right),
        ]);

        self.progress_bar
            .set_message(format!("sink: {}\n{}", self.sink_name, table));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_big_numbers_get_commas() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn the_one_where_long_change_windows_grow_an_hours_column() {
        assert_eq!(format_duration(Duration::from_secs(65)), "01:05");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 2)), "03:00:02");
    }

    #[test]
    fn the_one_where_every_tick_counts() {
        let the_progress = SubmitProgress::new("in-memory".to_string(), 3);
        the_progress.tick();
        the_progress.tick();
        assert_eq!(the_progress.position(), 2);
        the_progress.finish();
    }
}
