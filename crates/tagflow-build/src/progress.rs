use indicatif::{ProgressBar, ProgressStyle};

/// ビルド中のスピナー
pub struct BuildProgress {
    progress_bar: ProgressBar,
}

impl BuildProgress {
    pub fn new(reference: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Building {}...", reference));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));

        Self { progress_bar: pb }
    }

    /// スピナーを崩さずに1行出力
    pub fn println(&self, line: &str) {
        self.progress_bar.println(line);
    }

    pub fn finish_success(&self) {
        self.progress_bar.finish_with_message("Build completed ✓");
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("Build failed: {}", error));
    }
}
