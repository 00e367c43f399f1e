//! Async render service

use rfsvg::{ComposeConfig, Error, Mode, RenderRequest, RenderResponse, RenderService};

fn legend_request(font_size: u32) -> RenderRequest {
    RenderRequest {
        root_id: Some("chart".into()),
        ..RenderRequest::new(format!(
            r#"<div id="chart" style="font-size: {font_size}px"><div style="height: 1em"><span><svg width="10" height="10"><rect></rect></svg>a</span></div></div>"#
        ))
    }
}

#[tokio::test]
async fn concurrent_requests_do_not_share_font_size() {
    let service = RenderService::new(4);
    let requests = (0..16).map(|i| legend_request(if i % 2 == 0 { 10 } else { 40 })).collect();
    let results = service.render_many(requests).await;

    for (i, res) in results.into_iter().enumerate() {
        let svg = res.unwrap();
        // span 20 tall plus a 1em height offset
        let expected = if i % 2 == 0 { r#"height="30""# } else { r#"height="60""# };
        assert!(svg.contains(expected), "request {} produced {}", i, svg);
    }
}

#[tokio::test]
async fn failures_stay_with_their_request() {
    let service = RenderService::new(2);
    let bad = RenderRequest {
        root_id: Some("chart".into()),
        ..RenderRequest::new(r#"<div id="chart"><span>missing swatch</span></div>"#)
    };
    let results = service.render_many(vec![legend_request(10), bad, legend_request(10)]).await;
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::StructuralMismatch(_))));
    assert!(results[2].is_ok());
}

#[tokio::test]
async fn grid_request_from_json() {
    let json = r#"{
        "markup": "<div id=\"g\"><div><svg width=\"30\" height=\"20\"></svg></div><div><svg width=\"30\" height=\"20\"></svg></div></div>",
        "root_id": "g",
        "config": { "mode": "grid", "columns": 2 }
    }"#;
    let request: RenderRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.config.mode, Mode::Grid);

    let svg = RenderService::default().render(request).await.unwrap();
    assert!(svg.contains(r#"viewBox="0 0 60 20""#));
}

#[tokio::test]
async fn invalid_config_is_reported() {
    let request = RenderRequest {
        config: ComposeConfig::grid(0),
        ..RenderRequest::new(r#"<div><div><svg width="1" height="1"></svg></div></div>"#)
    };
    let result = RenderService::new(1).render(request).await;
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn response_json_shape() {
    let res = RenderResponse::from_result(3, Ok("<svg/>".into()));
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["value"], "<svg/>");
    assert_eq!(json["is_error"], false);
}
