//! Signup endpoint validated with `ValidatedParams`
//!
//! Run with `RUST_LOG=debug cargo run --example signup`, then:
//!
//! ```text
//! curl -X POST 'localhost:3000/signup?age=30' \
//!      -H 'content-type: application/json' \
//!      -d '{"email":"ana@example.com","password":"correct horse","confirm":"correct horse"}'
//! ```

use std::sync::OnceLock;

use axum::routing::post;
use axum::{Json, Router};
use this_params::prelude::*;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const SCHEMAS: &str = r#"
schemas:
  credentials:
    fields:
      password:
        - { name: isLength, message: "must be at least 8 characters", params: [{ min: 8 }] }
  signup:
    extends: credentials
    fields:
      email:
        - { name: isEmail, message: "is not an email" }
      age:
        - { name: isOptional, params: [18] }
        - { name: isInt, message: "must be a number", params: [{ min: 13 }] }
      newsletter:
        - { name: isOptional, params: [false] }
        - { name: isBoolean }
"#;

struct SignupParams;

impl ParamSchema for SignupParams {
    fn validator() -> Validator {
        static VALIDATOR: OnceLock<Validator> = OnceLock::new();
        VALIDATOR.get_or_init(build_validator).clone()
    }
}

fn build_validator() -> Validator {
    let schema = SchemaConfig::from_yaml_str(SCHEMAS)
        .and_then(|config| {
            config
                .builder("signup")?
                .custom_fn("validatePasswords", |bag| async move {
                    Ok(if bag.get("body.password") == bag.get("body.confirm") {
                        Verdict::Pass
                    } else {
                        Verdict::fail("passwords do not match")
                    })
                })
                .build()
        })
        .expect("signup schema is valid");
    Validator::new(schema)
}

async fn signup(params: ValidatedParams<SignupParams>) -> Json<Value> {
    let age = params
        .get("age")
        .or_else(|| params.get("query.age"))
        .or_else(|| params.get("body.age"))
        .cloned();
    Json(json!({
        "email": params.get("body.email"),
        "age": age,
        "newsletter": params.get("newsletter").or_else(|| params.get("body.newsletter")),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = Router::new()
        .route("/signup", post(signup))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
