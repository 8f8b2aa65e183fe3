//! コンソール出力

use colored::Colorize;

/// ユーザー向けのメッセージ出力
///
/// デバッグ出力の有無はプロセス全体の状態ではなく、この値が持つ。
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    debug: bool,
}

impl Reporter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn info(&self, message: impl AsRef<str>) {
        println!("{}", format_line(message.as_ref(), Level::Info));
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        println!("{}", format_line(message.as_ref(), Level::Warn));
    }

    pub fn error(&self, message: impl AsRef<str>) {
        eprintln!("{}", format_line(message.as_ref(), Level::Error));
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if self.debug {
            println!("{}", format_line(message.as_ref(), Level::Debug));
        }
    }
}

#[derive(Clone, Copy)]
enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

fn format_line(message: &str, level: Level) -> String {
    let prefix = "TAGFLOW".bold();
    let (open, close) = match level {
        Level::Info => ("[".blue(), "]".blue()),
        Level::Warn => ("[".yellow(), "]".yellow()),
        Level::Error => ("[".red(), "]".red()),
        Level::Debug => ("[".dimmed(), "]".dimmed()),
    };
    let message = match level {
        Level::Info => message.normal(),
        Level::Warn => message.yellow(),
        Level::Error => message.red(),
        Level::Debug => message.dimmed(),
    };
    format!("{}{}{} {}", open, prefix, close, message)
}
