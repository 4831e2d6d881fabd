use std::io::Write;
use std::path::Path;

use crate::cli::output;
use loggable::core::errors::{LoggableError, Result};

const DEFAULT_CONFIG: &str = r#"[loggable]
version = "1.0.0"
format_version = 1
# Non-interactive mode: causer is whatever identity the event carries.
testing = false

[defaults]
max_text_length = 1000
log_metadata = false
log_only_dirty = true

[metadata.collect]
ip_address = true
user_agent = true
session_id = false
request_url = false

[cleanup]
enabled = false
older_than_days = 90
batch_size = 1000

[audit]
enabled = true
log_file = "audit.log"

# One section per subject type, for example:
#
# [entities.Product]
# log_name = "Product"
# log_metadata = true
# exclude = ["updated_at"]
# json_fields = ["settings"]
#
# [entities.Product.attributes]
# name = "Product Name"
# price = "Price"
# status = "Status"
#
# [entities.Product.additional_data]
# sku = "SKU"
#
# [entities.Product.relationships]
# category = ["name"]
"#;

/// Execute the `loggable init` command.
///
/// Creates the `.loggable/` directory with a commented default
/// `config.toml` and keeps the activity log out of version control.
pub fn execute(loggable_dir: &Path) -> Result<()> {
    if loggable_dir.exists() {
        return Err(LoggableError::InvalidConfig {
            detail: format!(
                "Loggable is already initialized in this project ({} exists)",
                loggable_dir.display()
            ),
        });
    }

    output::header("Loggable: initializing project");

    std::fs::create_dir_all(loggable_dir)?;
    output::success(&format!("Created {}/", loggable_dir.display()));

    std::fs::write(loggable_dir.join("config.toml"), DEFAULT_CONFIG)?;
    output::success("Generated config.toml with defaults");

    let log_entry = format!("{}/audit.log", loggable_dir.display());
    add_to_gitignore(&log_entry)?;

    output::success("Project ready.\n");
    println!("  Next steps:");
    println!(
        "    → Describe your entities in {}/config.toml",
        loggable_dir.display()
    );
    println!("    → Record an event: loggable tap event.json");
    println!("    → Review activity: loggable log");

    Ok(())
}

/// Add an entry to .gitignore if not already present.
fn add_to_gitignore(entry: &str) -> Result<()> {
    let gitignore = Path::new(".gitignore");

    if gitignore.exists() {
        let content = std::fs::read_to_string(gitignore)?;
        if content.lines().any(|l| l.trim() == entry) {
            output::success(&format!("{entry} already in .gitignore"));
            return Ok(());
        }
        let mut file = std::fs::OpenOptions::new().append(true).open(gitignore)?;
        writeln!(file, "\n# Loggable: activity log\n{entry}")?;
    } else {
        std::fs::write(gitignore, format!("# Loggable: activity log\n{entry}\n"))?;
    }
    output::success(&format!("Added {entry} to .gitignore"));
    Ok(())
}
