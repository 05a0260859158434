//! REST API endpoints for the PricingGateway
//!
//! - `GET /price?hotelId&roomType&checkIn&userSegment[&nights]`
//! - `POST /feeds/occupancy?hotelId&value`
//! - `POST /feeds/competitor?hotelId&roomType&value`
//! - `POST /feeds/baseRate?hotelId&roomType&value`
//! - `GET /health`, `GET /metrics`
//!
//! Handlers never reject: every failure is answered with a status code and an
//! [`ErrorResponse`](crate::error::ErrorResponse) body. Requests no route accepts are
//! recovered into the same body. The pricing core is synchronous and bounded, so it runs
//! directly on the request task.

use crate::error::{ErrorResponse, GatewayError, GatewayResult};
use chrono::Utc;
use pricing_engine::{InMemoryCatalog, PricingOrchestrator, QuoteParams};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

type Query = HashMap<String, String>;

/// Occupancy feed acknowledgement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyAck {
    pub ok: bool,
    pub hotel_id: String,
    pub occupancy: f64,
}

/// Competitor price feed acknowledgement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorAck {
    pub ok: bool,
    pub hotel_id: String,
    pub room_type: String,
    pub competitor_price: f64,
}

/// Base rate feed acknowledgement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRateAck {
    pub ok: bool,
    pub hotel_id: String,
    pub room_type: String,
    pub base_rate: f64,
}

fn ok_json<T: Serialize>(body: &T) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

fn error_reply(err: GatewayError) -> WithStatus<Json> {
    let status = err.status();
    if status.is_server_error() {
        warn!("Request failed: {}", err);
    } else {
        debug!("Request rejected ({}): {}", status, err);
    }
    warp::reply::with_status(warp::reply::json(&err.to_response()), status)
}

fn reply<T: Serialize>(result: GatewayResult<T>) -> WithStatus<Json> {
    match result {
        Ok(body) => ok_json(&body),
        Err(err) => error_reply(err),
    }
}

fn required<'a>(query: &'a Query, name: &str) -> GatewayResult<&'a str> {
    query
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::MissingParam(name.to_string()))
}

fn required_f64(query: &Query, name: &str) -> GatewayResult<f64> {
    let raw = required(query, name)?;
    raw.parse::<f64>()
        .map_err(|_| GatewayError::InvalidParam { name: name.to_string(), value: raw.to_string() })
}

/// Quote a price
pub async fn get_price(
    query: Query,
    orchestrator: Arc<PricingOrchestrator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let params = QuoteParams {
        hotel_id: query.get("hotelId").cloned(),
        room_type: query.get("roomType").cloned(),
        check_in: query.get("checkIn").cloned(),
        user_segment: query.get("userSegment").cloned(),
        nights: query.get("nights").cloned(),
    };

    Ok(reply(orchestrator.quote(&params).map_err(GatewayError::from)))
}

/// Record the latest occupancy for a hotel
pub async fn post_occupancy(
    query: Query,
    orchestrator: Arc<PricingOrchestrator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(ingest_occupancy(&query, &orchestrator)))
}

fn ingest_occupancy(query: &Query, orchestrator: &PricingOrchestrator) -> GatewayResult<OccupancyAck> {
    let hotel_id = required(query, "hotelId")?;
    let value = required_f64(query, "value")?;
    orchestrator.ingest_occupancy(hotel_id, value, Utc::now())?;
    info!("Occupancy for hotel {} set to {}", hotel_id, value);
    Ok(OccupancyAck { ok: true, hotel_id: hotel_id.to_string(), occupancy: value })
}

/// Record a competitor price for a room type
pub async fn post_competitor(
    query: Query,
    catalog: Arc<InMemoryCatalog>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(update_competitor(&query, &catalog)))
}

fn update_competitor(query: &Query, catalog: &InMemoryCatalog) -> GatewayResult<CompetitorAck> {
    let hotel_id = required(query, "hotelId")?;
    let room_type = required(query, "roomType")?;
    let value = required_f64(query, "value")?;
    catalog.set_competitor_price(hotel_id, room_type, value)?;
    info!("Competitor price for {}/{} set to {}", hotel_id, room_type, value);
    Ok(CompetitorAck {
        ok: true,
        hotel_id: hotel_id.to_string(),
        room_type: room_type.to_string(),
        competitor_price: value,
    })
}

/// Record a base rate for a room type; the hotel becomes known to the signal store
pub async fn post_base_rate(
    query: Query,
    catalog: Arc<InMemoryCatalog>,
    orchestrator: Arc<PricingOrchestrator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(update_base_rate(&query, &catalog, &orchestrator)))
}

fn update_base_rate(
    query: &Query,
    catalog: &InMemoryCatalog,
    orchestrator: &PricingOrchestrator,
) -> GatewayResult<BaseRateAck> {
    let hotel_id = required(query, "hotelId")?;
    let room_type = required(query, "roomType")?;
    let value = required_f64(query, "value")?;
    catalog.set_base_rate(hotel_id, room_type, value)?;
    orchestrator.signals().register_hotel(hotel_id);
    info!("Base rate for {}/{} set to {}", hotel_id, room_type, value);
    Ok(BaseRateAck {
        ok: true,
        hotel_id: hotel_id.to_string(),
        room_type: room_type.to_string(),
        base_rate: value,
    })
}

/// Render route-level rejections (unknown path, wrong method, malformed query) as JSON
async fn handle_rejection(err: warp::Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, code, message) = if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Method Not Allowed".to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "INVALID_QUERY", e.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND", "Not Found".to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal Server Error".to_string())
    };

    debug!("Request rejected with {}", status);
    Ok(warp::reply::with_status(warp::reply::json(&ErrorResponse::new(code, message)), status))
}

/// Create all REST API routes
pub fn create_routes(
    orchestrator: Arc<PricingOrchestrator>,
    catalog: Arc<InMemoryCatalog>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let orchestrator_filter = warp::any().map(move || orchestrator.clone());
    let catalog_filter = warp::any().map(move || catalog.clone());

    // Price quote endpoint
    let price = warp::path("price")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<Query>())
        .and(orchestrator_filter.clone())
        .and_then(get_price);

    // Occupancy feed
    let occupancy = warp::path("feeds")
        .and(warp::path("occupancy"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::query::<Query>())
        .and(orchestrator_filter.clone())
        .and_then(post_occupancy);

    // Competitor price feed
    let competitor = warp::path("feeds")
        .and(warp::path("competitor"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::query::<Query>())
        .and(catalog_filter.clone())
        .and_then(post_competitor);

    // Base rate feed
    let base_rate = warp::path("feeds")
        .and(warp::path("baseRate"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::query::<Query>())
        .and(catalog_filter)
        .and(orchestrator_filter.clone())
        .and_then(post_base_rate);

    // Metrics endpoint
    let metrics = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(orchestrator_filter)
        .map(|orchestrator: Arc<PricingOrchestrator>| {
            warp::reply::json(&orchestrator.metrics().snapshot())
        });

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "UP",
            "version": crate::VERSION,
            "timestamp": Utc::now().to_rfc3339()
        }))
    });

    // Combine all routes
    price
        .or(occupancy)
        .or(competitor)
        .or(base_rate)
        .or(metrics)
        .or(health)
        .recover(handle_rejection)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        )
}
