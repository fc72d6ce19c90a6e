use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gibberish_core::config::DEFAULT_MODEL_FILE;
use gibberish_core::model::scorer::is_degenerate;
use gibberish_core::{persistence, GibberishModel};

/// Read-only HTTP API over a trained gibberish model
#[derive(Parser, Debug)]
#[command(name = "gibberish-server", version)]
struct Args {
	/// Trained model file
	#[arg(long, short = 'm', env = "GIBBERISH_MODEL", default_value = DEFAULT_MODEL_FILE)]
	model: PathBuf,

	/// Address to bind
	#[arg(long, env = "GIBBERISH_HOST", default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(long, env = "GIBBERISH_PORT", default_value_t = 5000)]
	port: u16,

	/// Log level (error, warn, info, debug, trace)
	#[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
	log_level: String,
}

/// Query parameters of `GET /v1/classify`
#[derive(Deserialize)]
struct ClassifyQuery {
	text: Option<String>,
}

/// Body of `POST /v1/classify`
#[derive(Deserialize)]
struct ClassifyBatch {
	texts: Vec<String>,
}

/// Classification of one string.
///
/// `score` is `null` when the text has no accepted digraph.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Classification {
	text: String,
	score: Option<f64>,
	gibberish: bool,
}

#[derive(Serialize, Deserialize, Debug)]
struct ModelSummary {
	alphabet: String,
	size: usize,
	threshold: f64,
}

impl Classification {
	fn new(model: &GibberishModel, text: &str) -> Self {
		let text = text.trim();
		let score = model.score(text);
		Self {
			text: text.to_owned(),
			score: (!is_degenerate(score)).then_some(score),
			gibberish: model.is_gibberish(text),
		}
	}
}

/// HTTP GET endpoint `/v1/classify?text=...`
#[get("/v1/classify")]
async fn get_classify(model: web::Data<GibberishModel>, query: web::Query<ClassifyQuery>) -> impl Responder {
	match &query.text {
		Some(text) => HttpResponse::Ok().json(Classification::new(&model, text)),
		None => HttpResponse::BadRequest().body("Missing 'text' parameter"),
	}
}

/// HTTP POST endpoint `/v1/classify` with `{ "texts": [...] }`
#[post("/v1/classify")]
async fn post_classify(model: web::Data<GibberishModel>, batch: web::Json<ClassifyBatch>) -> impl Responder {
	let results: Vec<Classification> = batch.texts.iter().map(|text| Classification::new(&model, text)).collect();
	HttpResponse::Ok().json(results)
}

#[get("/v1/model")]
async fn get_model(model: web::Data<GibberishModel>) -> impl Responder {
	HttpResponse::Ok().json(ModelSummary {
		alphabet: model.index().as_string(),
		size: model.matrix().size(),
		threshold: model.threshold(),
	})
}

/// Main entry point for the server.
///
/// Loads the model once and shares it with every worker. The model is
/// immutable, so no lock is needed.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let args = Args::parse();

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

	let model = persistence::load(&args.model).map_err(std::io::Error::other)?;
	info!(model = %args.model.display(), threshold = model.threshold(), "model loaded");
	let shared_model = web::Data::new(model);

	info!(host = %args.host, port = args.port, "starting server");
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_classify)
			.service(post_classify)
			.service(get_model)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::{http::StatusCode, test};
	use gibberish_core::{Trainer, TrainingConfig};

	fn model() -> GibberishModel {
		let corpus = vec!["ab ab ab ab ba ba"; 20];
		let trainer = Trainer::new(TrainingConfig::default().with_alphabet("ab ").with_workers(1)).unwrap();
		trainer.train(&corpus, &["ab ba", "ab ab"], &["aaaa", "bbbb"]).unwrap().model
	}

	macro_rules! app {
		() => {
			test::init_service(
				App::new()
					.app_data(web::Data::new(model()))
					.service(get_classify)
					.service(post_classify)
					.service(get_model),
			)
			.await
		};
	}

	#[actix_web::test]
	async fn test_get_classify() {
		let app = app!();
		let request = test::TestRequest::get().uri("/v1/classify?text=ab%20ab").to_request();
		let result: Classification = test::call_and_read_body_json(&app, request).await;
		assert_eq!(result.text, "ab ab");
		assert!(!result.gibberish);
		assert!(result.score.is_some());
	}

	#[actix_web::test]
	async fn test_get_classify_degenerate() {
		let app = app!();
		let request = test::TestRequest::get().uri("/v1/classify?text=a").to_request();
		let result: Classification = test::call_and_read_body_json(&app, request).await;
		assert!(result.gibberish);
		assert_eq!(result.score, None);
	}

	#[actix_web::test]
	async fn test_get_classify_missing_text() {
		let app = app!();
		let request = test::TestRequest::get().uri("/v1/classify").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_post_classify_batch() {
		let app = app!();
		let request = test::TestRequest::post()
			.uri("/v1/classify")
			.set_json(Batch { texts: &["ab ba", "bbbbbb"] })
			.to_request();
		let results: Vec<Classification> = test::call_and_read_body_json(&app, request).await;
		assert_eq!(results.len(), 2);
		assert!(!results[0].gibberish);
		assert!(results[1].gibberish);
	}

	#[actix_web::test]
	async fn test_get_model() {
		let app = app!();
		let request = test::TestRequest::get().uri("/v1/model").to_request();
		let summary: ModelSummary = test::call_and_read_body_json(&app, request).await;
		assert_eq!(summary.alphabet, "ab ");
		assert_eq!(summary.size, 3);
		assert!(summary.threshold < 0.0);
	}

	#[derive(Serialize)]
	struct Batch<'a> {
		texts: &'a [&'a str],
	}
}
