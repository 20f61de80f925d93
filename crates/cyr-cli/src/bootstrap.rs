use anyhow::Context;
use cyr_config::CyriskConfig;

use crate::cli::GlobalFlags;

/// Load `.env` and the layered config, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CyriskConfig> {
    let mut config = CyriskConfig::load_with_dotenv(flags.config.as_deref())
        .context("failed to load configuration")?;
    apply_overrides(&mut config, flags);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut CyriskConfig, flags: &GlobalFlags) {
    if let Some(dir) = &flags.output_dir {
        config.output.dir.clone_from(dir);
    }
    if let Some(days) = flags.days {
        config.search.recency_days = days;
    }
}
