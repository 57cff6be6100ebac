use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_vector::{
    EmbeddingConfig, IndexConfig, IngestConfig, MilvusConfig, OpenAIConfig, SearchConfig,
};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub milvus: MilvusConfig,
    pub openai: OpenAIConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub ingest: IngestConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Fails fast on any missing or malformed variable, including an
    /// unreadable CSV_FILE_PATH.
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let milvus = MilvusConfig::from_env()?; // MILVUS_HOST and MILVUS_PORT are required
        let openai = OpenAIConfig::from_env()?; // OPENAI_API_KEY is required
        let embedding = EmbeddingConfig::from_env()?;
        let index = IndexConfig::from_env()?;
        let ingest = IngestConfig::from_env()?;
        let search = SearchConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            milvus,
            openai,
            embedding,
            index,
            ingest,
            search,
        })
    }
}
