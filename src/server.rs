use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::config::{MAX_BODY_BYTES, VERIFY_PATH};
use crate::dns::MailResolver;
use crate::error::RequestError;
use crate::verification::verify_email;

/// Body of `POST /verify`.
///
/// The `email` key is matched ignoring ASCII case and the last occurrence
/// wins. `null`, either as the whole body or as the value, leaves the address
/// empty; other keys are skipped.
#[derive(Debug, Default)]
pub struct EmailRequest {
    pub email: String,
}

impl<'de> Deserialize<'de> for EmailRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, IgnoredAny, MapAccess, Visitor};
        use std::fmt;

        struct EmailRequestVisitor;

        impl<'de> Visitor<'de> for EmailRequestVisitor {
            type Value = EmailRequest;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object with an email string")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(EmailRequest::default())
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut request = EmailRequest::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("email") {
                        if let Some(email) = map.next_value::<Option<String>>()? {
                            request.email = email;
                        }
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(request)
            }
        }

        deserializer.deserialize_any(EmailRequestVisitor)
    }
}

/// Decodes the first JSON value in `body`; anything after it is ignored
fn decode_request(body: &[u8]) -> Result<EmailRequest, RequestError> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<EmailRequest>()
        .next()
    {
        Some(req) => Ok(req?),
        None => Err(RequestError::EmptyBody),
    }
}

/// POST /verify
///
/// The body is decoded as JSON whatever the Content-Type says.
async fn verify(
    body: web::Bytes,
    dns: web::Data<dyn MailResolver>,
) -> Result<HttpResponse, RequestError> {
    let req = decode_request(&body)?;
    if req.email.is_empty() {
        return Err(RequestError::MissingEmail);
    }

    let result = verify_email(&req.email, dns.get_ref()).await;
    log::debug!(
        "verified {}: valid={} mx={} spf={} dmarc={}",
        req.email,
        result.valid,
        result.has_mx,
        result.has_spf,
        result.has_dmarc
    );

    Ok(HttpResponse::Ok().json(result))
}

async fn method_not_allowed() -> Result<HttpResponse, RequestError> {
    Err(RequestError::MethodNotAllowed)
}

/// Registers the `/verify` resource. The resolver is expected as
/// `web::Data<dyn MailResolver>` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(VERIFY_PATH)
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .route(web::post().to(verify))
            .default_service(web::to(method_not_allowed)),
    );
}
