/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (with `#[serde(default = ...)]` for
/// optional settings) and call `Config::from_env()` once at startup. A `.env`
/// file in the working directory is loaded first when present; variables that
/// are already set in the process environment win.
///
/// # Panics
///
/// Panics if any required env var is missing or cannot be deserialized.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("ignoring unreadable .env file: {e}");
            }
        }
        Self::from_iter(std::env::vars())
    }

    /// Deserialize from an explicit set of `(KEY, value)` pairs.
    fn from_iter<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).expect("failed to load config from environment")
    }
}
