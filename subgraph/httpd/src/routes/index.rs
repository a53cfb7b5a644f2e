use {
    crate::context::Context,
    actix_web::{HttpResponse, Responder, get, web},
    serde::Serialize,
};

#[get("/")]
pub async fn index() -> impl Responder {
    "OK"
}

#[derive(Serialize)]
struct UpResponse<'a> {
    deployment: &'a str,
    indexed_block_height: Option<i32>,
    has_indexing_errors: bool,
}

#[get("/up")]
pub async fn up(app_ctx: web::Data<Context>) -> impl Responder {
    let source = app_ctx.source.as_ref();

    HttpResponse::Ok().json(UpResponse {
        deployment: source.deployment(),
        indexed_block_height: source.latest_block().await.map(|block| block.number),
        has_indexing_errors: source.has_indexing_errors().await,
    })
}
