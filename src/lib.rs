pub mod catalog;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::database::local_store::LocalStore;
use crate::services::{
    attempt_service::AttemptService, audit_service::AuditService,
    generator_service::GeneratorService, matching_service::MatchingService,
    profile_service::ProfileService, quiz_service::QuizService,
    result_service::{PgResultStore, ResultService},
    reward_service::RewardService, session_service::SessionService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub profile_service: ProfileService,
    pub matching_service: MatchingService,
    pub quiz_service: QuizService,
    pub generator_service: GeneratorService,
    pub attempt_service: AttemptService,
    pub result_service: ResultService,
    pub reward_service: RewardService,
    pub session_service: SessionService,
    pub audit_service: AuditService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let local = LocalStore::new(&config.fallback_store_dir);
        let audit_service = AuditService::new(pool.clone());
        let result_service = ResultService::new(
            Arc::new(PgResultStore::new(pool.clone())),
            local.clone(),
        );
        let profile_service = ProfileService::new(pool.clone(), local);
        let matching_service = MatchingService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone());
        let generator_service =
            GeneratorService::new(config.openai_api_key.clone(), http_client);
        let attempt_service =
            AttemptService::new(pool.clone(), result_service.clone(), audit_service.clone());
        let reward_service = RewardService::new(result_service.clone(), audit_service.clone());
        let session_service = SessionService::new(pool.clone());

        Self {
            pool,
            profile_service,
            matching_service,
            quiz_service,
            generator_service,
            attempt_service,
            result_service,
            reward_service,
            session_service,
            audit_service,
        }
    }
}
