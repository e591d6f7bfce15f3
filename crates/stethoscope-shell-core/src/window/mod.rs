pub(crate) mod badge;
mod content;
mod manager;
mod prefs;

pub use {
    badge::{NO_VIOLATIONS_DESCRIPTION, decode_data_url, violations_description},
    content::{ContentSource, START_URL_ENV},
    manager::WindowLifecycleManager,
    prefs::{
        BUILD_MODE_ENV, BuildMode, DOWNLOAD_WINDOW_HEIGHT, WINDOW_HEIGHT, WINDOW_WIDTH,
        WindowPreferences,
    },
};
