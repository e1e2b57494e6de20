use crate::categorizer::AbbreviationMap;
use crate::error::Result;
use crate::settings::{
    config_dir, default_abbreviations_path, load_settings, save_settings, settings_path,
};

pub fn run(force: bool) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;

    let abbr_path = default_abbreviations_path();
    if force || !abbr_path.exists() {
        let json = AbbreviationMap::builtin().to_json()?;
        std::fs::write(&abbr_path, format!("{json}\n"))?;
        println!("Wrote {}", abbr_path.display());
    } else {
        println!("Keeping existing {}", abbr_path.display());
    }

    let mut settings = if force { Default::default() } else { load_settings() };
    if settings.abbreviations.is_none() {
        settings.abbreviations = Some(abbr_path.to_string_lossy().to_string());
    }
    save_settings(&settings)?;
    println!("Wrote {}", settings_path().display());
    Ok(())
}
