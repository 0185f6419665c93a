use std::path::Path;
use tracing_subscriber::EnvFilter;

use imgbed_processing::{Notice, NoticeLevel, Notifier};

/// Markdown embed for an uploaded image.
pub fn markdown_image(name: &str, url: &str) -> String {
    format!("![{}]({})", name, url)
}

/// Writes notices to stderr so stdout only carries results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn format(notice: &Notice) -> String {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        format!("[{}] {}", tag, notice.message)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", Self::format(&notice));
    }
}

/// Load `env_file` (or `.env` from the working directory), then build the log
/// filter so `RUST_LOG` set in that file takes effect.
pub fn load_env(env_file: Option<&Path>) -> EnvFilter {
    // A missing file is fine; variables may come from the real environment.
    match env_file {
        Some(path) => dotenvy::from_path(path).ok(),
        None => dotenvy::dotenv().ok().map(drop),
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for the CLI. Logs go to stderr.
pub fn init_tracing(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
