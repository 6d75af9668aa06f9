pub use settings::{Settings, SettingsSer};

mod settings;
