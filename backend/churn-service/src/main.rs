use actix_web::{dev::Service, web, App, HttpServer};
use anyhow::Context;
use std::time::Instant;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa_swagger_ui::SwaggerUi;

use churn_service::config::{Config, LogConfig};
use churn_service::handlers::{self, PredictionHandlerState};
use churn_service::services::{load_classifier, Scorer};
use churn_service::{metrics, openapi};

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    if log.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log);

    tracing::info!("Starting churn-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Model must be usable before we accept traffic
    let classifier = load_classifier(&config.model.path)
        .map_err(|e| {
            tracing::error!("Model loading failed: {}", e);
            e
        })
        .context("Failed to load model artifact")?;

    let prediction_state = web::Data::new(PredictionHandlerState::new(Scorer::new(classifier)));
    let openapi_doc = openapi::doc();
    let max_body_bytes = config.http.max_body_bytes;

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(prediction_state.clone())
            .app_data(handlers::json_config(max_body_bytes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api/v1/openapi.json", openapi_doc.clone()),
            )
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::routes)
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                let path = req
                    .match_pattern()
                    .unwrap_or_else(|| req.path().to_string());
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    match fut.await {
                        Ok(res) => {
                            metrics::observe_http_request(
                                &method,
                                &path,
                                res.status().as_u16(),
                                start.elapsed(),
                            );
                            Ok(res)
                        }
                        Err(err) => {
                            metrics::observe_http_request(&method, &path, 500, start.elapsed());
                            Err(err)
                        }
                    }
                }
            })
            .wrap(TracingLogger::default())
    });

    if config.app.workers > 0 {
        server = server.workers(config.app.workers);
    }

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("churn-service listening on {}:{}", bind_addr.0, bind_addr.1);

    server
        .bind(bind_addr)
        .context("Failed to bind HTTP listener")?
        .run()
        .await
        .context("HTTP server terminated with an error")
}
