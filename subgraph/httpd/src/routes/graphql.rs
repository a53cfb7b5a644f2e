use {
    crate::graphql::AppSchema,
    actix_web::{HttpRequest, HttpResponse, Resource, web},
    async_graphql::http::GraphiQLSource,
    async_graphql_actix_web::{GraphQLRequest, GraphQLResponse, GraphQLSubscription},
};

pub fn graphql_route() -> Resource {
    web::resource("/graphql")
        .route(web::post().to(graphql_index))
        .route(
            web::get()
                .guard(actix_web::guard::Header("upgrade", "websocket"))
                .to(graphql_ws),
        )
        .route(web::get().to(graphiql_playground))
}

pub(crate) async fn graphql_index(
    schema: web::Data<AppSchema>,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(gql_request.into_inner()).await.into()
}

pub async fn graphiql_playground() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql")
                .finish(),
        )
}

pub(crate) async fn graphql_ws(
    schema: web::Data<AppSchema>,
    req: HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    GraphQLSubscription::new(AppSchema::clone(&*schema)).start(&req, payload)
}
