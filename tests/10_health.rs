mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let app = common::TestApp::new()?;
    let mut client = app.client();

    let res = client.get("/health").await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body, "unavailable");
    Ok(())
}

#[tokio::test]
async fn health_skips_sessions() -> Result<()> {
    let app = common::TestApp::new()?;
    let mut client = app.client();

    let res = client.get("/health").await?;

    assert!(res.set_cookies().is_empty());
    assert_eq!(app.sessions.saves(), 0);
    Ok(())
}

#[tokio::test]
async fn anonymous_traffic_stores_no_sessions() -> Result<()> {
    let app = common::TestApp::new()?;

    for _ in 0..20 {
        let mut client = app.client();
        client.get("/login").await?;
        client.get("/lists").await?;
        client.get("/no/such/page").await?;
        client.get("/static/application.css").await?;
        assert!(client.session_cookie().is_none());
    }

    assert_eq!(app.sessions.saves(), 0);
    assert_eq!(app.sessions.live(), 0);
    Ok(())
}

#[tokio::test]
async fn static_assets_are_served() -> Result<()> {
    let app = common::TestApp::new()?;
    let mut client = app.client();

    let res = client.get("/static/application.js").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("X-CSRF-Token"));

    let res = client.get("/static/favicon.svg").await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn responses_carry_security_headers() -> Result<()> {
    let app = common::TestApp::new()?;
    let mut client = app.client();

    let res = client.get("/login").await?;

    assert_eq!(res.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(res.header("x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(res.header("referrer-policy"), Some("no-referrer"));
    assert_eq!(res.header("cross-origin-opener-policy"), Some("same-origin"));
    Ok(())
}

#[tokio::test]
async fn unknown_routes_render_the_not_found_page() -> Result<()> {
    let app = common::TestApp::new()?;
    let mut client = app.client();

    let res = client.get("/no/such/page").await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.contains("<h1>Not found</h1>"));
    assert!(res.body.contains("Page not found"));
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    Ok(())
}
