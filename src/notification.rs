pub fn send(summary: &str, body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname("snapreport")
        .summary(summary)
        .body(&body)
        .show()
    {
        tracing::warn!(summary, "desktop notification failed: {err}");
    }
}
