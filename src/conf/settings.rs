use crate::parsing::DurationTemplate;
use crate::util::Timeline;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Settings {
    pub settings_location: Option<PathBuf>,
    pub state_file: PathBuf,
    pub duration_template: DurationTemplate,
    pub write_settings: bool,
    pub timeline: Timeline,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct SettingsSer {
    pub state_file: PathBuf,
    #[serde(default)]
    pub duration_template: DurationTemplate,
}

impl SettingsSer {
    pub fn from_settings(settings: &Settings) -> SettingsSer {
        SettingsSer {
            state_file: settings.state_file.clone(),
            duration_template: settings.duration_template.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::conf::SettingsSer;
    use crate::parsing::DurationTemplate;

    #[test]
    fn template_defaults_when_missing() {
        let ser: SettingsSer = serde_json::from_str(r#"{"state_file": "s.json"}"#).unwrap();
        assert_eq!(ser.duration_template, DurationTemplate::default());
        assert_eq!(ser.state_file.to_str(), Some("s.json"));
    }

    #[test]
    fn invalid_template_is_rejected() {
        let parsed = serde_json::from_str::<SettingsSer>(
            r#"{"state_file": "s.json", "duration_template": "{hours}"}"#,
        );
        assert!(parsed.is_err());
    }
}
