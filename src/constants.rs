/// Source name constants to ensure consistency across the codebase.
/// These names are the top-level keys of the integration document.

// INUMET hourly observation feeds (semicolon-delimited)
pub const TEMPERATURE_SOURCE: &str = "Temperatura_Observaciones";
pub const HUMIDITY_SOURCE: &str = "Humedad_Observaciones";
pub const PRECIPITATION_SOURCE: &str = "Precipitacion_Acumulada";

// Spreadsheet export
pub const APPLE_PRODUCTION_SOURCE: &str = "Produccion_Manzanas";

// Station locations, scraped from an HTML page
pub const STATIONS_SOURCE: &str = "Ubicacion_Estaciones_Scraping";

pub const TEMPERATURE_URL: &str = "https://catalogodatos.gub.uy/dataset/accd0e24-76be-4101-904b-81bb7d41ee88/resource/f800fc53-556b-4d1c-8bd6-28b41f9cf146/download/inumet_temperatura_del_aire.csv";
pub const HUMIDITY_URL: &str = "https://catalogodatos.gub.uy/dataset/5f4f50ac-2d11-4863-8ef2-b500d5f3aa90/resource/97ee0df8-3407-433f-b9f7-6e5a2d95ad25/download/inumet_humedad_relativa.csv";
pub const PRECIPITATION_URL: &str = "https://catalogodatos.gub.uy/dataset/fd896b11-4c04-4807-bae4-5373d65beea2/resource/ca987721-6052-4bb8-8596-2a5ad9630639/download/inumet_precipitacion_acumulada_horaria.csv";
pub const APPLE_PRODUCTION_URL: &str =
    "https://docs.google.com/spreadsheets/d/1AzJs_mNWoFXHN81HO0iT2u-WoZmoMz1K/export?format=csv";
pub const STATIONS_URL: &str =
    "https://www.inumet.gub.uy/tiempo/estaciones-meteorologicas-automaticas";

/// Field injected into every normalized record.
pub const ORIGIN_FIELD: &str = "origin_source";

/// Variable name of the embedded literal on the stations page, and the
/// array field expected inside it.
pub const STATIONS_ARRAY_FIELD: &str = "estaciones";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
