//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::{Config, VERSION};

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# polis configuration (v{version})

# Backend base URL (POLIS_API_URL overrides)
api_url = "{api_url}"

# Per-request timeout in seconds (POLIS_TIMEOUT_SECS overrides)
request_timeout_secs = {timeout}

# Rows per page in the list tabs
page_size = {page_size}

# Rows fetched at once when picking a teacher, course or student
picker_page_size = {picker_page_size}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            version = VERSION,
            api_url = self.api_url,
            timeout = self.request_timeout_secs,
            page_size = self.page_size,
            picker_page_size = self.picker_page_size,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
