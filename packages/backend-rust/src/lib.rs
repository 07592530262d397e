pub mod catalog;
pub mod config;
pub mod content;
pub mod engine;
pub mod logging;
pub mod response;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::{CatalogError, QuizCatalog};
use crate::config::Config;
use crate::content::{ContentStore, NoContent};
use crate::engine::{EngineConfig, LearningEngine};
use crate::state::AppState;
use crate::store::{
    FileMasteryStore, FileProfileStore, InMemoryMasteryStore, InMemoryProfileStore, MasteryStore,
    ProfileStore, StoreError,
};

/// Subdirectory of the mastery store directory holding profiles and history.
const PROFILE_SUBDIR: &str = "profiles";

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("mastery store: {0}")]
    Store(#[from] StoreError),
}

/// Load catalog, quizzes, content and the stores described by `config`.
pub fn build_engine(
    config: &Config,
    engine_config: EngineConfig,
) -> Result<LearningEngine, StartupError> {
    let graph = catalog::load_graph(config.catalog_path.as_deref())?;
    let quizzes = QuizCatalog::load_dir(&config.quiz_dir, &graph)?;

    let content: Arc<dyn ContentStore> = match config.content_path.as_deref() {
        Some(path) => Arc::new(catalog::load_content(path)?),
        None => Arc::new(NoContent),
    };

    let (store, profiles): (Arc<dyn MasteryStore>, Arc<dyn ProfileStore>) =
        match config.mastery_store_path.as_deref() {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using file mastery and profile stores");
                (
                    Arc::new(FileMasteryStore::open(dir)?),
                    Arc::new(FileProfileStore::open(dir.join(PROFILE_SUBDIR))?),
                )
            }
            None => {
                tracing::info!("using in-memory mastery and profile stores");
                (
                    Arc::new(InMemoryMasteryStore::new()),
                    Arc::new(InMemoryProfileStore::new()),
                )
            }
        };

    Ok(LearningEngine::new(
        graph,
        quizzes,
        store,
        profiles,
        content,
        engine_config,
    ))
}

pub fn build_router(engine: LearningEngine) -> axum::Router {
    routes::router(AppState::new(engine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn create_app(config: &Config) -> Result<axum::Router, StartupError> {
    let engine = build_engine(config, EngineConfig::from_env())?;
    Ok(build_router(engine))
}
