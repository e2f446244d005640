use std::path::Path;

use anyhow::Result;
use explorer_core::config::Config;
use owo_colors::OwoColorize;

pub fn run(config: &Config, config_path: &Path) -> Result<()> {
    println!("{}", "Paths".bold());
    println!("  Config:         {}", config_path.display());
    println!("  Reminders:      {}", config.reminders_path().display());
    println!("  Notifications:  {}", config.notifications_path().display());
    println!("  Pending sync:   {}", config.pending_sync_path().display());

    println!();
    println!("{}", "Mirror".bold());
    match &config.mirror {
        Some(mirror) => {
            println!(
                "  Provider:       {}",
                mirror.remote.provider.binary_name()
            );
            println!(
                "  List:           {}",
                mirror.list.as_deref().unwrap_or("(chosen per reminder)")
            );
        }
        None => println!("  {}", "None (reminders stay local)".dimmed()),
    }

    println!();
    println!("{}", "Notifications".bold());
    println!("  Title:          {}", config.notification_title);

    Ok(())
}
