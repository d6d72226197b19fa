use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use motomatch_core::{Error, ItemFilter, ItemId, DEFAULT_PAGE_SIZE};
use motomatch_intake::IntakeError;
use motomatch_similarity::{SimilarResponse, DEFAULT_PRICE_THRESHOLD, DEFAULT_TOP_K};
use motomatch_storage::CatalogManager;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Shown when the target listing is filtered out of the snapshot
pub const NO_RECOMMENDATIONS_MESSAGE: &str =
    "no recommendations found for the current filter; broaden your search";

/// Browse controls shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    keyword: Option<String>,
    /// Comma-separated brands
    brand: Option<String>,
    /// Comma-separated styles
    style: Option<String>,
    max_price: Option<f64>,
    location: Option<String>,
    abs: Option<bool>,
    page: Option<usize>,
    per_page: Option<usize>,
    k: Option<usize>,
}

impl ListingQuery {
    fn to_filter(&self) -> ItemFilter {
        let mut filter = ItemFilter::new()
            .with_brands(split_list(self.brand.as_deref()))
            .with_styles(split_list(self.style.as_deref()))
            .with_abs(self.abs.unwrap_or(false));
        if let Some(keyword) = &self.keyword {
            filter = filter.with_keyword(keyword.as_str());
        }
        if let Some(max_price) = self.max_price {
            filter = filter.with_max_price(max_price);
        }
        if let Some(location) = &self.location {
            filter = filter.with_location(location.as_str());
        }
        filter
    }

    fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    fn per_page(&self) -> usize {
        self.per_page.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct ReplyRequest {
    text: String,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(manager: Arc<CatalogManager>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(manager.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register every route; expects `web::Data<Arc<CatalogManager>>`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/health", web::get().to(health))
            .route("/items", web::get().to(list_items))
            .route("/items/{id}", web::get().to(get_item))
            .route("/items/{id}/similar", web::get().to(similar_items))
            .route("/facets", web::get().to(facets))
            .route("/catalog/reload", web::post().to(reload_catalog))
            .route("/sessions", web::post().to(create_session))
            .route("/sessions/{id}", web::get().to(get_session))
            .route("/sessions/{id}", web::delete().to(delete_session))
            .route("/sessions/{id}/reply", web::post().to(reply_session))
            .route("/sessions/{id}/likes/{item_id}", web::put().to(like_item))
            .route("/sessions/{id}/likes/{item_id}", web::delete().to(unlike_item))
            .route("/sessions/{id}/clicks/{item_id}", web::post().to(click_item))
            .route("/sessions/{id}/matches", web::get().to(session_matches));
    }
}

fn error_response(err: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        Error::ItemNotFound(_) => HttpResponse::NotFound().json(body),
        Error::InvalidWeights(_) | Error::InvalidConfig(_) => HttpResponse::BadRequest().json(body),
        _ => {
            warn!(error = %err, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn session_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Session not found"
    }))
}

fn item_not_found(id: ItemId) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("Item not found: {id}")
    }))
}

/// Similar listings for `id` within the snapshot selected by `filter`
fn similar_response(
    manager: &CatalogManager,
    id: ItemId,
    filter: &ItemFilter,
    k: usize,
) -> HttpResponse {
    let model = match manager.model_for(filter) {
        Ok(model) => model,
        Err(e) => return error_response(&e),
    };

    let target = match model.catalog().get(id) {
        Some(item) => item.clone(),
        None if manager.catalog().contains(id) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": NO_RECOMMENDATIONS_MESSAGE
            }));
        }
        None => return item_not_found(id),
    };

    match model.recommend(id, k) {
        Ok(recommendations) => {
            let candidates = model.catalog().len().saturating_sub(1);
            let response =
                SimilarResponse::new(target, recommendations, candidates, DEFAULT_PRICE_THRESHOLD);
            HttpResponse::Ok().json(response)
        }
        Err(e) => error_response(&e),
    }
}

async fn health(manager: web::Data<Arc<CatalogManager>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "items": manager.catalog().len(),
        "sessions": manager.sessions().len(),
        "cache": manager.models().stats(),
    })))
}

async fn list_items(
    manager: web::Data<Arc<CatalogManager>>,
    query: web::Query<ListingQuery>,
) -> ActixResult<HttpResponse> {
    let filter = query.to_filter();
    let filtered = manager.catalog().filter(&filter);
    let page = filtered.page(query.page(), query.per_page());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": page,
        "filter": filter,
    })))
}

async fn get_item(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let id = ItemId(path.into_inner());
    match manager.catalog().get(id) {
        Some(item) => Ok(HttpResponse::Ok().json(serde_json::json!({ "result": item }))),
        None => Ok(item_not_found(id)),
    }
}

async fn similar_items(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<u64>,
    query: web::Query<ListingQuery>,
) -> ActixResult<HttpResponse> {
    let id = ItemId(path.into_inner());
    let k = query.k.unwrap_or(DEFAULT_TOP_K);
    Ok(similar_response(&manager, id, &query.to_filter(), k))
}

async fn facets(manager: web::Data<Arc<CatalogManager>>) -> ActixResult<HttpResponse> {
    let catalog = manager.catalog();
    let max_price = catalog.iter().map(|item| item.price).fold(0.0, f64::max);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": {
            "items": catalog.len(),
            "brands": catalog.brands(),
            "styles": catalog.styles(),
            "max_price": max_price,
            "fingerprint": catalog.fingerprint(),
        }
    })))
}

async fn reload_catalog(manager: web::Data<Arc<CatalogManager>>) -> ActixResult<HttpResponse> {
    match manager.reload() {
        Ok(catalog) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": {
                "items": catalog.len(),
                "fingerprint": catalog.fingerprint(),
            }
        }))),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "catalog reload failed");
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("{e:#}")
            })))
        }
    }
}

async fn create_session(manager: web::Data<Arc<CatalogManager>>) -> ActixResult<HttpResponse> {
    let session = manager.sessions().create();
    Ok(HttpResponse::Created().json(serde_json::json!({
        "prompt": session.prompt(),
        "result": session,
    })))
}

async fn get_session(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    match manager.sessions().get(&path.into_inner()) {
        Some(session) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "prompt": session.prompt(),
            "result": session,
        }))),
        None => Ok(session_not_found()),
    }
}

async fn delete_session(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    match manager.sessions().remove(&path.into_inner()) {
        Some(_) => Ok(HttpResponse::Ok().json(serde_json::json!({ "result": true }))),
        None => Ok(session_not_found()),
    }
}

async fn reply_session(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<Uuid>,
    req: web::Json<ReplyRequest>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let outcome = manager
        .sessions()
        .update(&id, |session| session.reply(&req.text).map_err(|e| (e, session.stage)));

    match outcome {
        None => Ok(session_not_found()),
        Some(Ok(reply)) => Ok(HttpResponse::Ok().json(serde_json::json!({ "result": reply }))),
        Some(Err((IntakeError::AlreadyComplete, stage))) => {
            Ok(HttpResponse::Conflict().json(serde_json::json!({
                "error": IntakeError::AlreadyComplete.to_string(),
                "stage": stage,
            })))
        }
        Some(Err((err @ IntakeError::Parse(_), stage))) => {
            Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": err.to_string(),
                "stage": stage,
                "prompt": stage.prompt(),
            })))
        }
    }
}

async fn like_item(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<(Uuid, u64)>,
) -> ActixResult<HttpResponse> {
    let (session_id, item_id) = path.into_inner();
    let item_id = ItemId(item_id);
    if !manager.catalog().contains(item_id) {
        return Ok(item_not_found(item_id));
    }

    match manager
        .sessions()
        .update(&session_id, |s| (s.like(item_id), s.liked.clone()))
    {
        Some((added, liked)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": added,
            "liked": liked,
        }))),
        None => Ok(session_not_found()),
    }
}

async fn unlike_item(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<(Uuid, u64)>,
) -> ActixResult<HttpResponse> {
    let (session_id, item_id) = path.into_inner();
    match manager
        .sessions()
        .update(&session_id, |s| (s.unlike(ItemId(item_id)), s.liked.clone()))
    {
        Some((removed, liked)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": removed,
            "liked": liked,
        }))),
        None => Ok(session_not_found()),
    }
}

/// Record a click and answer with listings similar to the clicked one
async fn click_item(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<(Uuid, u64)>,
    query: web::Query<ListingQuery>,
) -> ActixResult<HttpResponse> {
    let (session_id, item_id) = path.into_inner();
    let item_id = ItemId(item_id);
    if !manager.catalog().contains(item_id) {
        return Ok(item_not_found(item_id));
    }

    let filter = match manager.sessions().update(&session_id, |s| {
        s.click(item_id);
        s.filter()
    }) {
        Some(filter) => filter.unwrap_or_default(),
        None => return Ok(session_not_found()),
    };

    let k = query.k.unwrap_or(DEFAULT_TOP_K);
    Ok(similar_response(&manager, item_id, &filter, k))
}

async fn session_matches(
    manager: web::Data<Arc<CatalogManager>>,
    path: web::Path<Uuid>,
    query: web::Query<ListingQuery>,
) -> ActixResult<HttpResponse> {
    let session = match manager.sessions().get(&path.into_inner()) {
        Some(session) => session,
        None => return Ok(session_not_found()),
    };

    let Some(filter) = session.filter() else {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": "Intake is not complete",
            "stage": session.stage,
            "prompt": session.prompt(),
        })));
    };

    let matches = manager.catalog().filter(&filter);
    let page = matches.page(query.page(), query.per_page());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": page,
        "filter": filter,
        "liked": session.liked,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use motomatch_core::{Catalog, Item};
    use motomatch_similarity::FeatureWeights;
    use serde_json::Value;

    fn create_test_manager() -> Arc<CatalogManager> {
        let catalog = Catalog::new(vec![
            Item::new(0, "JET SL ABS", 50000.0, "SYM", "通勤").with_store("台中店"),
            Item::new(1, "勁戰", 52000.0, "YAMAHA", "運動").with_store("台北店"),
            Item::new(2, "DRG", 98000.0, "SYM", "運動").with_store("台中店"),
            Item::new(3, "JET SR ABS", 51000.0, "SYM", "通勤").with_store("臺北店"),
        ])
        .unwrap();
        Arc::new(CatalogManager::new(catalog, FeatureWeights::default()).unwrap())
    }

    macro_rules! init_app {
        ($manager:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($manager))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["items"], 4);
    }

    #[actix_web::test]
    async fn test_list_items_with_filter_and_paging() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get()
            .uri("/items?brand=SYM&per_page=2&page=2")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["result"]["total_items"], 3);
        assert_eq!(body["result"]["total_pages"], 2);
        assert_eq!(body["result"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["result"]["items"][0]["id"], 3);
    }

    #[actix_web::test]
    async fn test_get_item() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get().uri("/items/1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["brand"], "YAMAHA");

        let req = test::TestRequest::get().uri("/items/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_similar_items() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get().uri("/items/0/similar?k=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let results = body["result"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], 3);
        assert_eq!(results[0]["reasons"][0], "same_brand");
        assert_eq!(body["stats"]["candidates_count"], 3);
    }

    #[actix_web::test]
    async fn test_similar_target_filtered_out() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get()
            .uri("/items/1/similar?location=%E5%8F%B0%E4%B8%AD")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], NO_RECOMMENDATIONS_MESSAGE);
    }

    #[actix_web::test]
    async fn test_facets() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get().uri("/facets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["brands"], serde_json::json!(["SYM", "YAMAHA"]));
        assert_eq!(body["result"]["max_price"], 98000.0);
    }

    #[actix_web::test]
    async fn test_reload_without_source_fails() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::post().uri("/catalog/reload").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_session_flow() {
        let manager = create_test_manager();
        let app = init_app!(manager.clone());

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["result"]["id"].as_str().unwrap().to_string();

        // Matches are unavailable until intake completes
        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{id}/matches"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{id}/reply"))
            .set_json(serde_json::json!({ "text": "月球" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["stage"], "await_location");

        for text in ["台中", "6萬", "通勤", "要", "不要"] {
            let req = test::TestRequest::post()
                .uri(&format!("/sessions/{id}/reply"))
                .set_json(serde_json::json!({ "text": text }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{id}/matches"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let items = body["result"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], 0);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{id}/reply"))
            .set_json(serde_json::json!({ "text": "台北" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_likes_and_clicks() {
        let manager = create_test_manager();
        let session = manager.sessions().create();
        let app = init_app!(manager.clone());

        let req = test::TestRequest::put()
            .uri(&format!("/sessions/{}/likes/2", session.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], true);
        assert_eq!(body["liked"], serde_json::json!([2]));

        let req = test::TestRequest::put()
            .uri(&format!("/sessions/{}/likes/42", session.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/sessions/{}/likes/2", session.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], true);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/clicks/0?k=1", session.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        assert_eq!(
            manager.sessions().get(&session.id).unwrap().last_clicked,
            Some(ItemId(0))
        );
    }

    #[actix_web::test]
    async fn test_unknown_session() {
        let app = init_app!(create_test_manager());
        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}", Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_session() {
        let manager = create_test_manager();
        let session = manager.sessions().create();
        let app = init_app!(manager.clone());

        let req = test::TestRequest::delete()
            .uri(&format!("/sessions/{}", session.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], true);
        assert!(manager.sessions().is_empty());

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}", session.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/sessions/{}", session.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
