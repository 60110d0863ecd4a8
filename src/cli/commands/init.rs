use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml");
        println!("Set NOTION_API_KEY and the NOTION_*_DB_ID variables, or edit the file.");
    } else {
        println!("config.toml already exists");
    }
    Ok(())
}
