use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::{ActionResult, Result};
use crate::middleware::auth::{ensure_owner, CurrentUser};
use crate::modules::clients::models::{Client, ClientFilter, ClientForm, ClientPatch};
use crate::modules::clients::services::ClientService;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

async fn owned_client(service: &ClientService, id: &str, user: &CurrentUser) -> Result<Client> {
    let client = service.get_by_id(id).await?;
    ensure_owner(&client.user_id, user)?;
    Ok(client)
}

/// POST /clients
pub async fn create_client(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    form: web::Json<ClientForm>,
) -> Result<HttpResponse> {
    let client = service.create(&user.user_id, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(ActionResult::success(client)))
}

/// GET /clients
pub async fn list_clients(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    query: web::Query<ClientFilter>,
) -> Result<HttpResponse> {
    let page = service.list(&user.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(page)))
}

/// GET /clients/search?q=
pub async fn search_clients(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let clients = service.search(&user.user_id, &query.q, query.limit).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(clients)))
}

/// GET /clients/{id}
pub async fn get_client(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let client = owned_client(&service, &path, &user).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(client)))
}

/// PATCH /clients/{id}
pub async fn update_client(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    path: web::Path<String>,
    patch: web::Json<ClientPatch>,
) -> Result<HttpResponse> {
    owned_client(&service, &path, &user).await?;
    let client = service.update(&path, patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(client)))
}

/// DELETE /clients/{id}
pub async fn delete_client(
    service: web::Data<Arc<ClientService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    owned_client(&service, &path, &user).await?;
    service.delete(&path).await?;
    Ok(HttpResponse::Ok().json(ActionResult::empty()))
}

/// Configure client routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clients")
            .route("", web::post().to(create_client))
            .route("", web::get().to(list_clients))
            .route("/search", web::get().to(search_clients))
            .route("/{id}", web::get().to(get_client))
            .route("/{id}", web::patch().to(update_client))
            .route("/{id}", web::delete().to(delete_client)),
    );
}
