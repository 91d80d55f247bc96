use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use log::{
    debug,
    warn,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::FlashcardError;

const APP_NAME: &str = "baby-flashcard";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), FlashcardError> {
    save_json_in(&get_app_data_dir(), data, filename)
}

pub fn save_json_in<T: Serialize>(
    dir: &Path,
    data: &T,
    filename: &str,
) -> Result<(), FlashcardError> {
    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&file_path, json)?;
    debug!("[Persistence] Data saved to: {}", file_path.display());
    Ok(())
}

pub fn load_json_in<T: for<'de> Deserialize<'de> + Default>(
    dir: &Path,
    filename: &str,
) -> Result<T, FlashcardError> {
    let file_path = dir.join(filename);

    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(&file_path)?;
    let data: T = serde_json::from_str(&json)?;
    debug!("[Persistence] Data loaded from: {}", file_path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(filename: &str) -> T {
    load_json_or_default_in(&get_app_data_dir(), filename)
}

pub fn load_json_or_default_in<T: for<'de> Deserialize<'de> + Default>(
    dir: &Path,
    filename: &str,
) -> T {
    match load_json_in::<T>(dir, filename) {
        Ok(data) => data,
        Err(e) => {
            warn!("[Persistence] Failed to load {}: {}. Using defaults.", filename, e);
            T::default()
        }
    }
}
