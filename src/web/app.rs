use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Error, ErrorExtensions, Schema, SimpleObject,
    http::GraphiQLSource,
};
use async_graphql_poem::GraphQL;
use poem::{Route, Server, get, handler, listener::TcpListener, web::Html};
use tracing::info;

use crate::{
    routing::routing::{RouteQuery, route},
    structures::{Graph, LatLng, RoutingConfig, plan::RoutePlan},
};

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

#[derive(Debug, SimpleObject)]
pub struct Health {
    pub nodes: usize,
    /// Directed edges.
    pub edges: usize,
    /// Street segments with barriers, both directions counted once.
    pub edges_with_barriers: usize,
}

pub struct QueryRoot;

#[async_graphql::Object]
impl QueryRoot {
    async fn ping(&self) -> &str {
        "pong"
    }

    async fn health(&self, ctx: &Context<'_>) -> Result<Health, Error> {
        let graph = ctx.data::<Arc<Graph>>()?;

        Ok(Health {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            edges_with_barriers: graph.edges_with_barriers(),
        })
    }

    /// Standard and barrier-avoiding walking routes between two points.
    async fn route(
        &self,
        ctx: &Context<'_>,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
        barrier_weight: Option<f64>,
        tolerance: Option<f64>,
    ) -> Result<RoutePlan, Error> {
        let graph = ctx.data::<Arc<Graph>>()?;
        let config = ctx.data::<RoutingConfig>()?;

        let query = RouteQuery {
            start: LatLng::new(start_lat, start_lng),
            end: LatLng::new(end_lat, end_lng),
            barrier_weight,
            tolerance,
        };

        route(graph.as_ref(), &query, config)
            .map(|dual| RoutePlan::from(&dual))
            .map_err(|e| e.extend())
    }
}

impl ErrorExtensions for crate::Error {
    fn extend(&self) -> Error {
        let code = match self {
            crate::Error::NoPathFound { .. } => "NO_PATH_FOUND",
            crate::Error::InvalidInput(_) => "INVALID_INPUT",
            crate::Error::SnapFailure(_) => "SNAP_FAILURE",
            _ => "INTERNAL",
        };
        Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

#[handler]
async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn schema(graph: Arc<Graph>, routing: RoutingConfig) -> AppSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(graph)
        .data(routing)
        .finish()
}

pub fn app(graph: Arc<Graph>, routing: RoutingConfig) -> Route {
    Route::new()
        .at("/graphql", GraphQL::new(schema(graph, routing)))
        .at("/graphiql", get(graphiql))
}

pub async fn server(graph: Arc<Graph>, routing: RoutingConfig, bind: &str) -> std::io::Result<()> {
    let app = app(graph, routing);

    info!("Serving on {bind}");
    Server::new(TcpListener::bind(bind)).run(app).await
}
