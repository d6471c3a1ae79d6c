use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::{ActionResult, Result};
use crate::modules::guest::models::GuestInvoiceForm;
use crate::modules::guest::services::GuestService;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub invoice_id: Option<String>,
}

/// POST /guest/invoices/preview
pub async fn preview_invoice(
    service: web::Data<Arc<GuestService>>,
    query: web::Query<PreviewQuery>,
    form: web::Json<GuestInvoiceForm>,
) -> Result<HttpResponse> {
    let preview = service.preview(form.into_inner(), query.into_inner().invoice_id)?;
    Ok(HttpResponse::Ok().json(ActionResult::success(preview)))
}

/// Configure guest routes; these skip authentication
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/guest").route("/invoices/preview", web::post().to(preview_invoice)),
    );
}
