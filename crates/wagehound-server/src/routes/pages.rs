use axum::response::Html;

/// The only unauthenticated page. The real UI is the separate frontend;
/// this is what the gate redirects to when no frontend is deployed.
pub async fn login() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>WageHound</title></head>\
         <body><h1>WageHound</h1>\
         <p>Sign in by POSTing your email to <code>/api/auth/login</code>.</p>\
         </body></html>",
    )
}

/// Fallback for authenticated page paths.
pub async fn app_shell() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>WageHound</title></head>\
         <body><h1>WageHound</h1>\
         <p>The API is mounted under <code>/api</code>.</p>\
         </body></html>",
    )
}
