//! Server Implementation
//!
//! HTTP 服务器启动和管理

use anyhow::Context;

use crate::core::{BackgroundTasks, Config, ServerState, TaskKind};
use crate::db::DbService;
use crate::ratings::RatingScheduler;
use crate::routes;

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 初始化数据库和共享状态
    pub async fn initialize(&self) -> anyhow::Result<ServerState> {
        let db = DbService::new(&self.config.database_path)
            .await
            .context("Failed to initialize database")?;
        Ok(ServerState::new(self.config.clone(), db.pool))
    }

    /// 启动后台任务
    pub fn start_background_tasks(&self, state: &ServerState) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let scheduler = RatingScheduler::new(
            state.pool.clone(),
            self.config.rating_interval_hours,
            tasks.shutdown_token(),
        );
        tasks.spawn("rating-scheduler", TaskKind::Periodic, scheduler.run());

        tasks
    }

    /// 运行服务器直到收到 Ctrl-C
    pub async fn run(&self) -> anyhow::Result<()> {
        let state = self.initialize().await?;
        let tasks = self.start_background_tasks(&state);

        let app = routes::build_app(&state).with_state(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!("Delivery server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .context("HTTP server error")?;

        tasks.shutdown().await;
        Ok(())
    }
}
