use std::fs::OpenOptions;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use log::{debug, error, info};

use crate::conf::{Settings, SettingsSer};
use crate::db::StateStore;
use crate::parsing::DurationTemplate;
use crate::util::{DefaultTimeline, StaticTimeline, Timeline};

mod cmd;
mod conf;
mod data;
mod db;
mod parsing;
mod util;

fn main() {
    env_logger::init();
    if let Err(e) = main_inner() {
        error!("{:?}", e);
        process::exit(1);
    }
}

fn main_inner() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
    let (settings, args_ref) = parse_settings(&args_ref)?;

    debug!("{:?}", settings);
    debug!("{:?}", args_ref);

    // one "now" for the whole command
    let now = settings.timeline.now();
    let store = StateStore::new(&settings.state_file);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args_ref {
        ["time", text @ ..] => cmd::print_time(&mut out, &text.join(" "), now)?,
        ["duration", text @ ..] => {
            cmd::print_duration(&mut out, &settings.duration_template, &text.join(" "))?
        }
        ["done", text @ ..] => {
            let mut schedule = store.load();
            schedule.refresh(now);
            cmd::set_all_done(&mut schedule, &text.join(" "), now)?;
            store.save(&schedule)?;
        }
        ["product", name, time @ ..] => {
            let mut schedule = store.load();
            schedule.refresh(now);
            cmd::set_product(&mut schedule, name, &time.join(" "), now)?;
            store.save(&schedule)?;
        }
        ["step", product, name, duration @ ..] => {
            let mut schedule = store.load();
            schedule.refresh(now);
            cmd::add_step(
                &mut schedule,
                &settings.duration_template,
                product,
                name,
                &duration.join(" "),
                now,
            )?;
            store.save(&schedule)?;
        }
        ["unstep", product, name @ ..] => {
            let mut schedule = store.load();
            schedule.refresh(now);
            let removed = cmd::remove_step(&mut schedule, product, &name.join(" "))?;
            info!("Removed step '{}' from '{}'", removed.name, product);
            store.save(&schedule)?;
        }
        ["show"] | [] => {
            let mut schedule = store.load();
            schedule.refresh(now);
            cmd::print_schedule(&mut out, &schedule, &settings.duration_template)?;
        }
        unexpected => bail!("Unexpected arguments: {}", unexpected.join(" ")),
    }

    do_write_settings(&settings)
}

fn do_write_settings(settings: &Settings) -> anyhow::Result<()> {
    if settings.write_settings {
        let location = settings
            .settings_location
            .as_ref()
            .context("Missing settings location")?;

        info!("Writing settings to {}", location.display());

        if let Some(dir) = location.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create settings directory: {}", dir.display())
                })?;
            }
        }

        let to_write = SettingsSer::from_settings(settings);
        let buffer =
            serde_json::to_vec_pretty(&to_write).context("Failed to serialize settings")?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(location)
            .context("Cannot open settings for writing")?;
        file.write_all(&buffer)
            .context("Failed to write settings")?;
    }

    Ok(())
}

fn parse_settings<'a>(args: &'a [&'a str]) -> anyhow::Result<(Settings, &'a [&'a str])> {
    let mut remaining_args = args.get(1..).unwrap_or_default();

    #[derive(Default, Debug)]
    struct SettingsBuilder {
        explicit_config_file: bool,
        config_file: Option<PathBuf>,
        state_file: Option<PathBuf>,
        duration_template: Option<String>,
        now: Option<String>,
        write_settings: bool,
    }

    let mut b: SettingsBuilder = SettingsBuilder::default();
    loop {
        match remaining_args {
            ["-C" | "--config-file", config_file, rest @ ..] => {
                b.explicit_config_file = true;
                b.config_file = Some(PathBuf::from(config_file));
                remaining_args = rest;
            }
            ["-S" | "--state-file", state_file, rest @ ..] => {
                b.state_file = Some(PathBuf::from(state_file));
                remaining_args = rest;
            }
            ["-T" | "--duration-template", template, rest @ ..] => {
                b.duration_template = Some(template.to_string());
                remaining_args = rest;
            }
            ["-N" | "--now", now, rest @ ..] => {
                b.now = Some(now.to_string());
                remaining_args = rest;
            }
            ["-W" | "--write-settings", rest @ ..] => {
                b.write_settings = true;
                remaining_args = rest;
            }
            _ => {
                break;
            }
        }
    }

    b.config_file = Some(settings_location(b.config_file)?);

    let from_file = if let Some(ref file) = b.config_file {
        let exists = file.is_file();
        if b.explicit_config_file && !b.write_settings && !exists {
            bail!(
                "Settings file {} does not exist and is not configured to be written",
                file.display()
            );
        }
        if exists {
            let file = std::fs::File::open(file).context("Failed to open settings file")?;
            let reader = BufReader::new(file);
            let explicit: SettingsSer =
                serde_json::from_reader(reader).context("Failed to read settings")?;
            Some(explicit)
        } else {
            None
        }
    } else {
        None
    };

    Ok((
        Settings {
            settings_location: b.config_file,
            state_file: state_location(b.state_file, from_file.as_ref())?,
            duration_template: duration_template(b.duration_template, from_file.as_ref())?,
            write_settings: b.write_settings,
            timeline: timeline(b.now)?,
        },
        remaining_args,
    ))
}

const SETTINGS_FILE_NAME: &str = "prepclock_settings.json";
const STATE_FILE_NAME: &str = "state.json";

fn home_dir() -> anyhow::Result<Option<PathBuf>> {
    if let Ok(home_env) = std::env::var("PREPCLOCK_HOME") {
        let home = PathBuf::from(&home_env);
        if home.is_absolute() || home.exists() {
            Ok(Some(home))
        } else {
            bail!(
                "Invalid environment value for 'PREPCLOCK_HOME': '{}'",
                home_env
            );
        }
    } else {
        Ok(dirs::data_dir().map(|d| d.join("prepclock")))
    }
}

fn settings_location(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(explicit) = explicit {
        Ok(explicit)
    } else if let Some(home) = home_dir()? {
        Ok(home.join(SETTINGS_FILE_NAME))
    } else {
        bail!("Settings location not defined")
    }
}

fn state_location(explicit: Option<PathBuf>, loaded: Option<&SettingsSer>) -> anyhow::Result<PathBuf> {
    if let Some(explicit) = explicit {
        Ok(explicit)
    } else if let Some(SettingsSer { state_file, .. }) = loaded {
        Ok(state_file.to_owned())
    } else if let Some(home) = home_dir()? {
        Ok(home.join(STATE_FILE_NAME))
    } else {
        bail!("State location not defined")
    }
}

fn duration_template(
    explicit: Option<String>,
    loaded: Option<&SettingsSer>,
) -> anyhow::Result<DurationTemplate> {
    if let Some(explicit) = explicit {
        DurationTemplate::parse(&explicit).context("Cannot parse explicitly provided template")
    } else if let Some(SettingsSer {
        duration_template, ..
    }) = loaded
    {
        Ok(duration_template.clone())
    } else {
        Ok(DurationTemplate::default())
    }
}

fn timeline(explicit: Option<String>) -> anyhow::Result<Timeline> {
    if let Some(explicit) = explicit {
        let fixed = StaticTimeline::parse(&explicit).with_context(|| {
            format!("Cannot parse '{}', expected {}", explicit, StaticTimeline::FORMAT)
        })?;
        Ok(fixed.into())
    } else {
        Ok(Arc::new(DefaultTimeline))
    }
}
