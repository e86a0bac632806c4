use crate::config::KEYS;
use crate::{Config, Result};
use super::ConfigAction;

/// Handles the config command execution
pub fn config_command(mut config: Config, action: Option<ConfigAction>) -> Result<()> {
    match action {
        Some(ConfigAction::Get { key: Some(key) }) => {
            println!("{}: {}", key, config.get(&key)?);
        }
        Some(ConfigAction::Get { key: None }) => {
            println!("Current configuration:");
            for key in KEYS {
                println!("  {}: {}", key, config.get(key)?);
            }
        }
        Some(ConfigAction::Set { key, value }) => {
            config.set(&key, &value)?;
            println!("Updated {} to {}", key, config.get(&key)?);
            config.save()?;
            println!("Configuration saved successfully");
        }
        Some(ConfigAction::Reset) => {
            config = Config::default();
            config.save()?;
            println!("Configuration reset to defaults");
        }
        Some(ConfigAction::Path) => {
            println!("{}", Config::default_path().display());
        }
        None => {
            println!("Config command usage:");
            println!("  media-dl config get [--key KEY]  - Show all config or a specific value");
            println!("  media-dl config set --key KEY --value VALUE  - Set a config value");
            println!("  media-dl config reset  - Reset configuration to defaults");
            println!("  media-dl config path  - Show where the config file lives");
            println!("\nAvailable config keys:");
            println!("  ytdlp_path        - Path to yt-dlp executable, or 'none' to use system PATH");
            println!("  download_dir      - Directory downloads go to, or 'none' for the current directory");
            println!("  default_format    - Default format (mp4, mp3)");
            println!("  default_quality   - Default quality (high, medium, low)");
            println!("  subtitle_langs    - Subtitle languages, comma separated (en, en,de, all)");
            println!("  filename_template - yt-dlp output template (%(title)s.%(ext)s)");
            println!("  show_progress     - Whether to show progress bars (true/false)");
            println!("  open_folder       - Whether to open the folder after downloading (true/false)");
            println!("  auto_install      - Whether to pip install yt-dlp when missing (true/false)");
            println!("  log_file          - File failed downloads are logged to");
        }
    }

    Ok(())
}
