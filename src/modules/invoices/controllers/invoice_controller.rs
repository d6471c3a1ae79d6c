use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::core::{ActionResult, AppError, Result};
use crate::middleware::auth::{ensure_owner, CurrentUser};
use crate::modules::invoices::models::{
    Invoice, InvoiceFilter, InvoiceForm, InvoicePatch, InvoiceStatus, InvoiceView,
};
use crate::modules::invoices::services::InvoiceService;

/// Query parameters for listing invoices
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    /// A persisted status, or `all`
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListInvoicesQuery {
    pub fn into_filter(self) -> Result<InvoiceFilter> {
        let status = match self.status.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<InvoiceStatus>().map_err(AppError::validation)?),
        };

        Ok(InvoiceFilter {
            status,
            search: self.search,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceView>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

async fn owned_invoice(service: &InvoiceService, id: &str, user: &CurrentUser) -> Result<Invoice> {
    let invoice = service.get_by_id(id).await?;
    ensure_owner(&invoice.user_id, user)?;
    Ok(invoice)
}

/// POST /invoices
pub async fn create_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    form: web::Json<InvoiceForm>,
) -> Result<HttpResponse> {
    let invoice = service.create_next(&user.user_id, form.into_inner()).await?;

    Ok(HttpResponse::Created().json(ActionResult::success(service.view(invoice))))
}

/// GET /invoices
pub async fn list_invoices(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse> {
    let filter = query.into_inner().into_filter()?;
    let page = service.list(&user.user_id, &filter).await?;

    let response = InvoiceListResponse {
        total: page.total,
        invoices: page
            .invoices
            .into_iter()
            .map(|invoice| service.view(invoice))
            .collect(),
    };

    Ok(HttpResponse::Ok().json(ActionResult::success(response)))
}

/// GET /invoices/{id}
pub async fn get_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let invoice = owned_invoice(&service, &path, &user).await?;

    Ok(HttpResponse::Ok().json(ActionResult::success(service.view(invoice))))
}

/// PATCH /invoices/{id}
pub async fn update_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
    patch: web::Json<InvoicePatch>,
) -> Result<HttpResponse> {
    owned_invoice(&service, &path, &user).await?;
    let invoice = service.update(&path, patch.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ActionResult::success(service.view(invoice))))
}

/// DELETE /invoices/{id}
pub async fn delete_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    owned_invoice(&service, &path, &user).await?;
    service.delete(&path).await?;

    Ok(HttpResponse::Ok().json(ActionResult::empty()))
}

async fn transition(
    service: &InvoiceService,
    user: &CurrentUser,
    id: &str,
    status: InvoiceStatus,
) -> Result<HttpResponse> {
    owned_invoice(service, id, user).await?;
    let invoice = service.update_status(id, status).await?;

    Ok(HttpResponse::Ok().json(ActionResult::success(service.view(invoice))))
}

/// POST /invoices/{id}/status
pub async fn update_status(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse> {
    let status = body
        .status
        .parse::<InvoiceStatus>()
        .map_err(AppError::validation)?;

    transition(&service, &user, &path, status).await
}

/// POST /invoices/{id}/send
///
/// Delivery itself happens elsewhere; this records the transition.
pub async fn send_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    transition(&service, &user, &path, InvoiceStatus::Sent).await
}

/// POST /invoices/{id}/mark-paid
pub async fn mark_paid(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    transition(&service, &user, &path, InvoiceStatus::Paid).await
}

/// POST /invoices/{id}/duplicate
pub async fn duplicate_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    owned_invoice(&service, &path, &user).await?;
    let invoice = service.duplicate_next(&path, &user.user_id).await?;

    Ok(HttpResponse::Created().json(ActionResult::success(service.view(invoice))))
}

/// GET /public/invoices/{public_id}
///
/// No authentication; opening the link records the client's first view.
pub async fn public_invoice(
    service: web::Data<Arc<InvoiceService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let view = service.view_public(&path).await?;

    Ok(HttpResponse::Ok().json(ActionResult::success(view)))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}", web::patch().to(update_invoice))
            .route("/{id}", web::delete().to(delete_invoice))
            .route("/{id}/status", web::post().to(update_status))
            .route("/{id}/send", web::post().to(send_invoice))
            .route("/{id}/mark-paid", web::post().to(mark_paid))
            .route("/{id}/duplicate", web::post().to(duplicate_invoice)),
    )
    .service(
        web::scope("/public/invoices").route("/{public_id}", web::get().to(public_invoice)),
    );
}
