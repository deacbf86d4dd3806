use actix_web::{HttpResponse, get, http::StatusCode, web};
use serde::Deserialize;
use tracing::{error, info};
use weather_core::{
    UpstreamReply, WeatherError, WeatherQuery, WeatherUpstream,
    provider::openweather::parse_current,
};

use crate::{
    AppState,
    error::{ApiError, Route},
};

const DIRECT_LIMIT: u8 = 5;
const REVERSE_LIMIT: u8 = 1;

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    city: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

impl WeatherParams {
    fn query(&self) -> Result<WeatherQuery, WeatherError> {
        WeatherQuery::from_params(self.city.as_deref(), self.lat.as_deref(), self.lon.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    q: Option<String>,
    limit: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    lat: Option<String>,
    lon: Option<String>,
    limit: Option<u8>,
}

fn relay(reply: UpstreamReply) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    HttpResponse::build(status).json(reply.body)
}

fn fail(route: Route, err: WeatherError) -> ApiError {
    if err.is_bad_request() {
        info!(error = %err, "rejected request");
    } else {
        error!(error = %err, "upstream call failed");
    }
    ApiError::new(route, err)
}

/// Upstream body and status, verbatim.
#[get("/weather")]
pub async fn weather(
    params: web::Query<WeatherParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = params.query().map_err(|e| fail(Route::Passthrough, e))?;
    info!(%query, "weather request");

    let reply = data.upstream.current(&query).await.map_err(|e| fail(Route::Passthrough, e))?;
    Ok(relay(reply))
}

/// The flattened [`weather_core::WeatherSnapshot`] instead of the raw body.
#[get("/weather/snapshot")]
pub async fn weather_snapshot(
    params: web::Query<WeatherParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = params.query().map_err(|e| fail(Route::Snapshot, e))?;
    info!(%query, "snapshot request");

    let reply = data.upstream.current(&query).await.map_err(|e| fail(Route::Snapshot, e))?;
    if !reply.is_success() {
        return Err(fail(
            Route::Snapshot,
            WeatherError::Status { endpoint: "OpenWeather current weather", status: reply.status },
        ));
    }

    let snapshot = parse_current(reply.body).map_err(|e| fail(Route::Snapshot, e))?;
    info!(
        city = %snapshot.city,
        country = %snapshot.country,
        condition = %snapshot.condition,
        temp = ?snapshot.temp,
        "snapshot ready"
    );
    Ok(HttpResponse::Ok().json(snapshot))
}

#[get("/geocode")]
pub async fn geocode(
    params: web::Query<GeocodeParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let text = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| fail(Route::Geocode, WeatherError::MissingQuery))?;
    let limit = params.limit.unwrap_or(DIRECT_LIMIT).clamp(1, DIRECT_LIMIT);

    let reply = data
        .upstream
        .geocode_direct(text, limit)
        .await
        .map_err(|e| fail(Route::Geocode, e))?;
    Ok(relay(reply))
}

#[get("/geocode/reverse")]
pub async fn geocode_reverse(
    params: web::Query<ReverseParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = WeatherQuery::from_params(None, params.lat.as_deref(), params.lon.as_deref())
        .map_err(|e| fail(Route::Geocode, e))?;
    let WeatherQuery::Coordinates { lat, lon } = query else {
        return Err(fail(Route::Geocode, WeatherError::MissingQuery));
    };
    let limit = params.limit.unwrap_or(REVERSE_LIMIT).clamp(1, DIRECT_LIMIT);

    let reply = data
        .upstream
        .geocode_reverse(lat, lon, limit)
        .await
        .map_err(|e| fail(Route::Geocode, e))?;
    Ok(relay(reply))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(weather)
        .service(weather_snapshot)
        .service(geocode)
        .service(geocode_reverse);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use weather_core::provider::openweather::OpenWeatherProvider;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london_body() -> Value {
        json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "main": {"temp": 14.2, "feels_like": 13.5, "temp_min": 12.9, "temp_max": 15.3,
                     "pressure": 1019, "humidity": 71},
            "visibility": 10000,
            "wind": {"speed": 3.6, "deg": 240},
            "clouds": {"all": 75},
            "sys": {"country": "GB", "sunrise": 1_760_595_000, "sunset": 1_760_633_000},
            "timezone": 3600,
            "name": "London",
            "cod": 200
        })
    }

    fn state_for(server: &MockServer) -> web::Data<AppState> {
        web::Data::new(AppState {
            upstream: Arc::new(OpenWeatherProvider::with_base_url("KEY".into(), &server.uri())),
        })
    }

    #[actix_web::test]
    async fn missing_params_rejected_before_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        for uri in ["/weather", "/weather?city=", "/weather?lat=51.5", "/weather/snapshot"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({"error": "City or coordinates required"}));
        }
    }

    #[actix_web::test]
    async fn non_numeric_coordinates_rejected() {
        let server = MockServer::start().await;
        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather?lat=abc&lon=1").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid coordinates");
    }

    #[actix_web::test]
    async fn city_is_forwarded_and_reply_relayed_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather?city=London").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, london_body());
    }

    #[actix_web::test]
    async fn upstream_error_status_is_mirrored() {
        let server = MockServer::start().await;
        let not_found = json!({"cod": "404", "message": "city not found"});
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found.clone()))
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather?city=Atlantis").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, not_found);
    }

    #[actix_web::test]
    async fn coordinates_take_precedence_over_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param_is_missing("q"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req =
            test::TestRequest::get().uri("/weather?city=Paris&lat=51.5&lon=-0.12").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn non_json_upstream_is_a_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather?city=London").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Backend error"}));
    }

    #[actix_web::test]
    async fn snapshot_flattens_upstream_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather/snapshot?city=London").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["city"], "London");
        assert_eq!(body["country"], "GB");
        assert_eq!(body["condition"], "Clouds");
        assert_eq!(body["icon"], "https://openweathermap.org/img/wn/04d@2x.png");
        assert_eq!(body["timezone"], 3600);
    }

    #[actix_web::test]
    async fn snapshot_upstream_failure_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401})))
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/weather/snapshot?city=London").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "City not found or API error"}));
    }

    #[actix_web::test]
    async fn geocode_clamps_limit_and_relays() {
        let server = MockServer::start().await;
        let found = json!([{"name": "London", "lat": 51.5, "lon": -0.12, "country": "GB"}]);
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lon"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(found.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/geocode?q=Lon&limit=50").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, found);
    }

    #[actix_web::test]
    async fn geocode_without_text_is_rejected() {
        let server = MockServer::start().await;
        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/geocode?q=%20").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Query or coordinates required");
    }

    #[actix_web::test]
    async fn reverse_geocode_defaults_to_one_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("lat", "48.85"))
            .and(query_param("lon", "2.35"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let app =
            test::init_service(App::new().app_data(state_for(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/geocode/reverse?lat=48.85&lon=2.35").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
