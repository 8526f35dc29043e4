// src/proxy.rs
//! Single quote endpoint, `GET /stock/:symbol`, open to any origin.

use crate::clients::EquityFeed;
use crate::error::ProxyError;
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub const UPSTREAM_FAILURE: &str = "Symbol not found or API issue.";

#[derive(Debug, Serialize)]
struct StockReply {
    price: f64,
    change: f64,
    percent: f64,
    volume: Option<u64>,
}

pub fn routes(
    feed: Arc<dyn EquityFeed>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET"]);

    warp::path!("stock" / String)
        .and(warp::get())
        .and(with_feed(feed))
        .and_then(stock_handler)
        .recover(handle_rejection)
        .with(cors)
}

fn with_feed(
    feed: Arc<dyn EquityFeed>,
) -> impl Filter<Extract = (Arc<dyn EquityFeed>,), Error = Infallible> + Clone {
    warp::any().map(move || feed.clone())
}

async fn stock_handler(symbol: String, feed: Arc<dyn EquityFeed>) -> Result<impl Reply, Rejection> {
    let symbol = symbol.trim().to_uppercase();
    match feed.fetch_quote(&symbol).await {
        Ok(quote) => {
            info!("Proxy served {} at {}", quote.symbol, quote.price);
            Ok(warp::reply::json(&StockReply {
                price: quote.price,
                change: quote.change,
                percent: quote.change_percent,
                volume: quote.volume,
            }))
        }
        Err(e) => {
            error!("Proxy quote for {} failed: {}", symbol, e);
            Err(warp::reject::custom(ProxyError {
                message: e.to_string(),
            }))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if err.is_not_found() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&json!({ "error": "Not found" })),
            StatusCode::NOT_FOUND,
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&json!({ "error": "Method not allowed" })),
            StatusCode::METHOD_NOT_ALLOWED,
        ));
    }
    if let Some(e) = err.find::<ProxyError>() {
        error!("Upstream failure: {}", e);
    } else {
        error!("Unhandled rejection: {:?}", err);
    }
    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": UPSTREAM_FAILURE })),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
