use actix_web::{Responder, web};
use common::{error::Res, http::Success};
use db::StoreHandle;

pub async fn get_health(store: web::Data<StoreHandle>) -> Res<impl Responder> {
    Success::ok(serde_json::json!({
        "status": "ok",
        "store": store.is_some(),
    }))
}
