use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

const GUARDED_VARS: [&str; 5] = [
    "SAVEPASS_USERNAME",
    "SAVEPASS_PASSWORD",
    "SAVEPASS_GAME_ID",
    "SAVEPASS_CHANNEL",
    "SAVEPASS_REMOTE__BASE_DIR",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

struct EnvRestore {
    saved: Vec<(&'static str, Option<std::ffi::OsString>)>,
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn write_config(temp_dir: &TempDir, contents: &str) {
    let app_config_dir = temp_dir.path().join("savepass");
    std::fs::create_dir_all(&app_config_dir).expect("create config dir");
    std::fs::write(app_config_dir.join("config.toml"), contents).expect("write config");
}

/// Runs `f` with the config file set to `config_toml` in an isolated
/// XDG_CONFIG_HOME and all SAVEPASS_ env vars cleared.
pub fn with_config_env<T>(config_toml: &str, f: impl FnOnce() -> T) -> T {
    let _guard = env_lock().lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().expect("temp dir");

    write_config(&temp_dir, config_toml);

    let mut saved = vec![("XDG_CONFIG_HOME", std::env::var_os("XDG_CONFIG_HOME"))];
    for key in GUARDED_VARS {
        saved.push((key, std::env::var_os(key)));
    }
    let restore = EnvRestore { saved };

    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    for key in GUARDED_VARS {
        std::env::remove_var(key);
    }

    let result = f();
    drop(restore);
    result
}
