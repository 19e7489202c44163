//! HTTP layer: routing, unit-preference cookie, response caching, and
//! template rendering.
//!
//! Handlers fetch upstream data, run it through the pure transformation in
//! `forecast`, cache the resulting records by `{city}_{unit}`, and render
//! askama templates. When the upstream fails, the last successfully built
//! page is re-rendered with an error banner instead of returning a blank
//! error page.

use std::sync::{Arc, Mutex};

use askama::Template;
use axum::{
    Json, Router,
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::cache;
use crate::config::SkycastConfig;
use crate::error::SkycastError;
use crate::forecast;
use crate::models::{CurrentConditions, DailySummary, DayDetail, HourlySlot, PageData};
use crate::openweather::{OpenWeatherClient, dto::ForecastResponse};
use crate::units::UnitSystem;

/// Shared handler state: config, upstream client, and the last-good
/// snapshots used when a fetch fails.
struct AppState {
    config: SkycastConfig,
    client: OpenWeatherClient,
    last_home: Mutex<Option<PageData>>,
    last_details: Mutex<Option<Vec<DayDetail>>>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    /// Empty string means no banner.
    error: String,
    /// At most one record; a vec so the template loops uniformly.
    current: Vec<CurrentConditions>,
    hours: Vec<HourlySlot>,
    daily: Vec<DailySummary>,
    selected_unit: String,
}

#[derive(Template)]
#[template(path = "details.html")]
struct DetailsTemplate {
    error: String,
    city: String,
    date: String,
    day: String,
    rows: Vec<DayDetail>,
}

pub async fn run(config: SkycastConfig) -> anyhow::Result<()> {
    let client = OpenWeatherClient::new(config.api_key.clone())?;
    let port = config.port;
    let state = Arc::new(AppState {
        config,
        client,
        last_home: Mutex::new(None),
        last_details: Mutex::new(None),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(home))
        .route("/unit", post(set_unit))
        .route("/search", post(search_city))
        .route("/details/{city}/{date}", get(day_details))
        .nest_service("/static", ServeDir::new("static"))
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server running at http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let unit = unit_from_cookies(&headers);
    render_home(&state, None, unit).await
}

#[derive(Deserialize)]
struct SearchForm {
    #[serde(default)]
    city_name: String,
}

async fn search_city(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let unit = unit_from_cookies(&headers);
    let city = clean_city(&form.city_name);
    let city = if city.is_empty() { None } else { Some(city) };
    render_home(&state, city, unit).await
}

#[derive(Deserialize)]
struct UnitPayload {
    unit: Option<String>,
}

/// Store the unit selection in a cookie and acknowledge with JSON. Anything
/// unrecognized is normalized to metric here, so the core never sees an
/// invalid selector.
async fn set_unit(Json(payload): Json<UnitPayload>) -> Response {
    let unit = UnitSystem::from_selector(payload.unit.as_deref());
    let cookie = format!(
        "unit={}; Path=/; HttpOnly; SameSite=Lax",
        unit.as_query()
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({"message": "Unit updated successfully"})),
    )
        .into_response()
}

async fn day_details(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((city, date)): Path<(String, String)>,
) -> Response {
    let unit = unit_from_cookies(&headers);
    let city = clean_city(&city);

    let Ok(parsed_date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        return render_details_error(&state, &city, &date, "No data found for this date.");
    };

    let cache_key = cache::details_key(&city, unit);
    let mut forecast_data: Option<ForecastResponse> = match cache::get(&cache_key).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!("cache read failed for {cache_key}: {e}");
            None
        }
    };

    if forecast_data.is_none() {
        match state.client.fetch_forecast(&city, unit).await {
            Ok(fresh) => {
                if let Err(e) = cache::put(&cache_key, &fresh).await {
                    warn!("cache write failed for {cache_key}: {e}");
                }
                forecast_data = Some(fresh);
            }
            Err(e) => {
                return render_details_error(&state, &city, &date, &e.user_message());
            }
        }
    }

    // Guarded above; forecast_data is always present here.
    let Some(forecast_data) = forecast_data else {
        return render_details_error(&state, &city, &date, "Weather service not responding");
    };

    let observations = forecast_data.observations();
    let rows = forecast::day_details(&observations, parsed_date, unit);
    if rows.is_empty() {
        return render_details_error(&state, &city, &date, "No data found for this date.");
    }

    *state.last_details.lock().unwrap_or_else(|e| e.into_inner()) = Some(rows.clone());

    let day = rows[0].day.clone();
    render_template(DetailsTemplate {
        error: String::new(),
        city,
        date,
        day,
        rows,
    })
}

/// Build (or re-use) the home page for a city. `city_override` comes from
/// the search form; otherwise the visitor's city is detected via GeoIP with
/// the configured default as a fallback.
async fn render_home(state: &AppState, city_override: Option<String>, unit: UnitSystem) -> Response {
    let city = match city_override {
        Some(city) => city,
        None => state
            .client
            .detect_city()
            .await
            .unwrap_or_else(|| state.config.default_city.clone()),
    };

    let cache_key = cache::page_key(&city, unit);
    match cache::get::<PageData>(&cache_key).await {
        Ok(Some(page)) => return render_index(page, String::new(), unit),
        Ok(None) => {}
        Err(e) => warn!("cache read failed for {cache_key}: {e}"),
    }

    let page = match build_page(state, &city, unit).await {
        Ok(page) => page,
        Err(e) => {
            warn!("home page build failed for {city}: {e}");
            return render_home_fallback(state, &e, unit);
        }
    };

    *state.last_home.lock().unwrap_or_else(|e| e.into_inner()) = Some(page.clone());

    if let Err(e) = cache::put(&cache_key, &page).await {
        warn!("cache write failed for {cache_key}: {e}");
    }

    render_index(page, String::new(), unit)
}

/// Fetch current + forecast and run the transformation pipeline.
async fn build_page(
    state: &AppState,
    city: &str,
    unit: UnitSystem,
) -> Result<PageData, SkycastError> {
    let current = state.client.fetch_current(city, unit).await?;
    let forecast_data = state.client.fetch_forecast(city, unit).await?;

    let observations = forecast_data.observations();
    let today = Local::now().date_naive();

    let daily: Vec<DailySummary> = forecast::group_by_date(&observations)
        .into_iter()
        .filter_map(|(date, entries)| {
            forecast::aggregate(&forecast_data.city.name, date, &entries, unit, today)
        })
        .collect();

    Ok(PageData {
        current: forecast::current_conditions(&current, unit),
        hours: forecast::hourly_slots(&observations, unit),
        daily,
    })
}

/// Upstream failed: re-render the last good page with an error banner, or an
/// empty page when there is nothing to fall back to.
fn render_home_fallback(state: &AppState, error: &SkycastError, unit: UnitSystem) -> Response {
    let snapshot = state
        .last_home
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    match snapshot {
        Some(page) => render_index(page, error.user_message(), unit),
        None => render_template(IndexTemplate {
            error: error.user_message(),
            current: Vec::new(),
            hours: Vec::new(),
            daily: Vec::new(),
            selected_unit: unit.as_query().to_string(),
        }),
    }
}

fn render_details_error(state: &AppState, city: &str, date: &str, message: &str) -> Response {
    let rows = state
        .last_details
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .unwrap_or_default();
    let day = rows.first().map(|r| r.day.clone()).unwrap_or_default();
    render_template(DetailsTemplate {
        error: message.to_string(),
        city: city.to_string(),
        date: date.to_string(),
        day,
        rows,
    })
}

fn render_index(page: PageData, error: String, unit: UnitSystem) -> Response {
    render_template(IndexTemplate {
        error,
        current: vec![page.current],
        hours: page.hours,
        daily: page.daily,
        selected_unit: unit.as_query().to_string(),
    })
}

fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!("template rendering failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Read the unit selector from the `unit` cookie; absent or unrecognized
/// values default to metric before any core code runs.
fn unit_from_cookies(headers: &HeaderMap) -> UnitSystem {
    let selector = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let pair = pair.trim();
                pair.strip_prefix("unit=")
            })
        });
    UnitSystem::from_selector(selector)
}

/// Strip a searched city down to letters and whitespace, as the search form
/// promises the upstream API.
fn clean_city(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_city_strips_non_letters() {
        assert_eq!(clean_city("  London!23 "), "London");
        assert_eq!(clean_city("New York"), "New York");
        assert_eq!(clean_city("<script>"), "script");
        assert_eq!(clean_city("123"), "");
    }

    #[test]
    fn test_unit_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; unit=imperial".parse().unwrap(),
        );
        assert_eq!(unit_from_cookies(&headers), UnitSystem::Imperial);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "unit=bogus".parse().unwrap());
        assert_eq!(unit_from_cookies(&headers), UnitSystem::Metric);

        assert_eq!(unit_from_cookies(&HeaderMap::new()), UnitSystem::Metric);
    }
}
