use http::StatusCode;
use http_body_util::BodyExt;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use uniform_http::data::{CacheDirective, Tag};
use uniform_http::message::{Request, Response};
use uniform_http::representation::StringRepresentation;
use uniform_web::filter::{EncodeFilter, FilterResult, Validator, fn_filter};
use uniform_web::{Chain, Context, Handler, Uniform, current_context, handler_fn};

fn report(request: &mut Request, response: &mut Response) {
    if response.status().is_error() {
        return;
    }

    let id = request.attribute("id").and_then(|id| id.as_str()).unwrap_or_default().to_owned();
    let tag = Tag::strong(format!("report-{id}"));
    if let Some(status) = request.conditions().status(request.method(), Some(&tag)) {
        response.set_status(status);
        return;
    }

    let owner = current_context().and_then(|c| c.parameter("owner").map(ToOwned::to_owned)).unwrap_or_default();
    let body = format!("report {id} for {owner}\n").repeat(64);
    response.set_entity(Box::new(StringRepresentation::plain(body).with_tag(tag)));
    response.add_cache_directive(CacheDirective::max_age(60));
}

fn request(uri: &str, headers: &[(&str, &str)]) -> Request {
    let mut builder = http::Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    match builder.body(()) {
        Ok(request) => Request::from(request.into_parts().0),
        Err(e) => panic!("invalid demo request: {e}"),
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let context = Context::builder().name("reports").parameter("owner", "ops").build();
    let head = Chain::builder()
        .add_last(fn_filter(|request: &mut Request, _response: &mut Response| {
            let query = request.query();
            for parameter in query.iter() {
                if let Some(value) = parameter.value() {
                    request.set_attribute(parameter.name(), value);
                }
            }
            FilterResult::Continue
        }))
        .add_last(Validator::new().validate("id", true, Some("[0-9]+")))
        .add_first(EncodeFilter::default())
        .context(context.into())
        .build(handler_fn(report));

    head.start();

    let requests = [
        request("/report?id=7", &[("Accept-Encoding", "gzip, br;q=0.8")]),
        request("/report?id=seven", &[]),
        request("/report?id=7", &[("If-None-Match", "\"report-7\"")]),
    ];
    for mut request in requests {
        let mut response = Response::new();
        head.handle(&mut request, &mut response);

        if response.status().code() == StatusCode::BAD_REQUEST {
            info!(status = %response.status(), "rejected");
        }
        let http_response = response.into_http().expect("entity is readable");
        let (parts, body) = http_response.into_parts();
        let body = body.collect().await.expect("entity is readable").to_bytes();
        info!(status = %parts.status, headers = ?parts.headers, body_len = body.len(), "response");
    }

    head.stop();
}
