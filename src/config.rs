//! Configuración de la aplicación.
//! Carga variables de entorno (.env una sola vez) y las traduce a la
//! configuración del worker HTTP y del invoker.

use std::env;
use std::fmt;
use std::time::Duration;

use comm_adapters::ChatEndpoint;
use comm_core::Strictness;
use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::errors::AppError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

pub const DEFAULT_API_BASE: &str = comm_adapters::workers::chat_completions::DEFAULT_API_BASE;
pub const DEFAULT_MODEL: &str = comm_adapters::workers::chat_completions::DEFAULT_MODEL;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Timeout por llamada HTTP.
    pub timeout: Duration,
    /// Límite total por invocación (opcional).
    pub deadline: Option<Duration>,
    /// El contract de entrada rechaza campos no declarados.
    pub strict_contracts: bool,
    /// Usa workers deterministas en lugar del endpoint HTTP.
    pub offline: bool,
}

impl fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerConfig")
         .field("api_base", &self.api_base)
         .field("api_key", &self.api_key.as_ref().map(|_| "***"))
         .field("model", &self.model)
         .field("timeout", &self.timeout)
         .field("deadline", &self.deadline)
         .field("strict_contracts", &self.strict_contracts)
         .field("offline", &self.offline)
         .finish()
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_API_BASE.to_string(),
               api_key: None,
               model: DEFAULT_MODEL.to_string(),
               timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
               deadline: None,
               strict_contracts: false,
               offline: false }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // asegura que .env se haya cargado
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de una función arbitraria (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout = match read("COMMFLOW_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("COMMFLOW_TIMEOUT_SECS", &v)?),
            None => defaults.timeout,
        };
        let deadline = read("COMMFLOW_DEADLINE_SECS").map(|v| parse_secs("COMMFLOW_DEADLINE_SECS", &v))
                                                     .transpose()?
                                                     .map(Duration::from_secs);

        Ok(Self { api_base: read("COMMFLOW_API_BASE").unwrap_or(defaults.api_base),
                  api_key: read("COMMFLOW_API_KEY").or_else(|| read("OPENAI_API_KEY")),
                  model: read("COMMFLOW_MODEL").unwrap_or(defaults.model),
                  timeout,
                  deadline,
                  strict_contracts: read("COMMFLOW_STRICT_CONTRACTS").map(|v| parse_flag(&v))
                                                                    .unwrap_or(false),
                  offline: read("COMMFLOW_OFFLINE").map(|v| parse_flag(&v)).unwrap_or(false) })
    }

    pub fn endpoint(&self) -> ChatEndpoint {
        ChatEndpoint { base_url: self.api_base.clone(),
                       api_key: self.api_key.clone(),
                       model: self.model.clone(),
                       timeout: self.timeout }
    }

    pub fn strictness(&self) -> Strictness {
        if self.strict_contracts {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }

    /// Sin API key y sin modo offline no hay forma de llamar al endpoint.
    pub fn ensure_usable(&self) -> Result<(), AppError> {
        if self.offline || self.api_key.is_some() {
            Ok(())
        } else {
            Err(AppError::Config("COMMFLOW_API_KEY (or OPENAI_API_KEY) is not set; set COMMFLOW_OFFLINE=1 to run without a model".into()))
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, AppError> {
    value.parse::<u64>()
         .map_err(|_| AppError::Config(format!("{key} must be a whole number of seconds, got `{value}`")))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
