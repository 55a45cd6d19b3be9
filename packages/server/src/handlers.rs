//! HTTP handler functions for the accident hotspots page and API.

use std::sync::PoisonError;

use accident_hotspots_hotspot::HotspotReport;
use accident_hotspots_loader::empty_input_warning;
use accident_hotspots_server_models::{ApiError, ApiHealth, ApiReport, ReportQueryParams};
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::StreamExt as _;

use crate::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn api_error(status: StatusCode, error: String, kind: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiError {
        error,
        kind: kind.to_string(),
    })
}

/// Rejects malformed query strings with an [`ApiError`] body.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected query string: {err}");
    let response = api_error(
        StatusCode::BAD_REQUEST,
        format!("invalid query string: {err}"),
        "query",
    );
    InternalError::from_response(err, response).into()
}

/// Reads the request body, stopping as soon as it exceeds `limit` bytes.
async fn read_upload(payload: &mut web::Payload, limit: usize) -> Result<web::Bytes, HttpResponse> {
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            log::warn!("Failed to read upload: {e}");
            api_error(StatusCode::BAD_REQUEST, format!("failed to read upload: {e}"), "payload")
        })?;

        if body.len() + chunk.len() > limit {
            log::warn!("Rejected upload larger than {limit} bytes");
            return Err(api_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("upload exceeds the {limit}-byte limit"),
                "too_large",
            ));
        }

        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

/// `POST /api/report`
///
/// The request body is the raw CSV upload. Responds with every derived view
/// for the upload, `400` with an [`ApiError`] if it fails validation, or
/// `413` if it is larger than the configured upload limit.
pub async fn report(
    state: web::Data<AppState>,
    params: web::Query<ReportQueryParams>,
    mut payload: web::Payload,
) -> HttpResponse {
    let limit = params.limit.unwrap_or(state.default_limit);

    let body = match read_upload(&mut payload, state.max_upload_bytes).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let loaded = state
        .cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_load(&body);

    match loaded {
        Ok(records) => {
            let warnings = empty_input_warning(&records)
                .map(|w| w.to_string())
                .into_iter()
                .collect();
            let report = HotspotReport::build(&records, limit);
            HttpResponse::Ok().json(ApiReport::new(report, warnings))
        }
        Err(e) => {
            log::warn!("Rejected upload of {} bytes: {e}", body.len());
            api_error(StatusCode::BAD_REQUEST, e.to_string(), e.kind().as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};

    use super::*;
    use crate::{ServerConfig, configure};

    const SAMPLE: &str = "latitude,longitude,street_name,is_drunk_driving\n\
        1.0,10.0,A,true\n\
        2.0,20.0,B,false\n\
        3.0,30.0,A,true\n\
        4.0,40.0,C,true\n\
        5.0,50.0,C,true\n\
        6.0,60.0,C,true\n";

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(&ServerConfig::default()))
    }

    #[actix_web::test]
    async fn serves_index_page() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("Drunk Driving Accident Hotspots"));
    }

    #[actix_web::test]
    async fn page_draws_red_markers_and_tolerates_plain_text_errors() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let page = std::str::from_utf8(&body).unwrap();
        assert!(page.contains("L.circleMarker("));
        assert!(page.contains(r#"color: "red""#));
        assert!(page.contains("resp.text()"));
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let health: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(health.healthy);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn report_ranks_uploaded_streets() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report?limit=1")
            .set_payload(SAMPLE)
            .to_request();
        let report: ApiReport = test::call_and_read_body_json(&app, req).await;

        assert_eq!(report.total_records, 6);
        assert_eq!(report.qualifying_records, 5);
        assert_eq!(report.hotspots.len(), 1);
        assert_eq!(report.hotspots[0].street_name, "C");
        assert_eq!(report.hotspots[0].label, "C: 3 accidents");
        let ranking: Vec<(&str, usize)> = report
            .ranking
            .iter()
            .map(|r| (r.street_name.as_str(), r.count))
            .collect();
        assert_eq!(ranking, vec![("C", 3), ("A", 2)]);
        assert!(report.warnings.is_empty());
    }

    #[actix_web::test]
    async fn report_uses_default_limit() {
        let state = web::Data::new(AppState::new(&ServerConfig {
            hotspot_limit: 1,
            ..ServerConfig::default()
        }));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload(SAMPLE)
            .to_request();
        let report: ApiReport = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report.hotspots.len(), 1);
        assert_eq!(report.ranking.len(), 2);
    }

    #[actix_web::test]
    async fn header_only_upload_warns_instead_of_failing() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload("latitude,longitude,street_name,is_drunk_driving\n")
            .to_request();
        let report: ApiReport = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report.total_records, 0);
        assert!(report.center.is_none());
        assert_eq!(report.warnings.len(), 1);
    }

    #[actix_web::test]
    async fn missing_column_is_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload("latitude,longitude,is_drunk_driving\n1,2,true\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.kind, "format");
        assert!(error.error.contains("street_name"));
    }

    #[actix_web::test]
    async fn bad_cell_is_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload("latitude,longitude,street_name,is_drunk_driving\n1,2,A,perhaps\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.kind, "parse");
    }

    #[actix_web::test]
    async fn oversized_upload_gets_json_error() {
        let state = web::Data::new(AppState::new(&ServerConfig {
            max_upload_bytes: 64,
            ..ServerConfig::default()
        }));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload(SAMPLE)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.kind, "too_large");
        assert!(error.error.contains("64"));
    }

    #[actix_web::test]
    async fn upload_at_the_limit_is_accepted() {
        let state = web::Data::new(AppState::new(&ServerConfig {
            max_upload_bytes: SAMPLE.len(),
            ..ServerConfig::default()
        }));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_payload(SAMPLE)
            .to_request();
        let report: ApiReport = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report.total_records, 6);
    }

    #[actix_web::test]
    async fn malformed_limit_gets_json_error() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/report?limit=-1")
            .set_payload(SAMPLE)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.kind, "query");
    }
}
