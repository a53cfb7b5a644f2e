use {
    super::error::Error,
    crate::{context::Context, graphql::{AppSchema, build_schema}, routes},
    actix_cors::Cors,
    actix_web::{
        App, HttpResponse, HttpServer, http,
        middleware::Compress,
        web::{self, ServiceConfig},
    },
    std::fmt::Display,
    tracing_actix_web::TracingLogger,
};

/// Run the HTTP server serving GraphQL queries and subscriptions over the
/// context's entity source.
pub async fn run_server<I>(
    ip: I,
    port: u16,
    cors_allowed_origin: Option<String>,
    context: Context,
) -> Result<(), Error>
where
    I: ToString + Display,
{
    let graphql_schema = build_schema(context.clone())?;

    #[cfg(feature = "tracing")]
    tracing::info!(%ip, port, deployment = context.source.deployment(), "Starting httpd server");

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["POST", "GET", "OPTIONS"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        if let Some(origin) = cors_allowed_origin.as_deref() {
            for origin in origin.split(',') {
                cors = cors.allowed_origin(origin.trim());
            }
        } else {
            cors = cors.allow_any_origin();
        }

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .configure(config_app(context.clone(), graphql_schema.clone()))
    })
    .bind((ip.to_string(), port))?
    .run()
    .await?;

    Ok(())
}

pub fn config_app(app_ctx: Context, graphql_schema: AppSchema) -> Box<dyn Fn(&mut ServiceConfig)> {
    Box::new(move |cfg: &mut ServiceConfig| {
        cfg.service(routes::index::index)
            .service(routes::index::up)
            .service(routes::graphql::graphql_route())
            .default_service(web::to(HttpResponse::NotFound))
            .app_data(web::Data::new(app_ctx.clone()))
            .app_data(web::Data::new(graphql_schema.clone()));
    })
}
