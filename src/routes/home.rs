use axum::response::Html;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page HTML", content_type = "text/html")
    ),
    tag = "General"
)]
pub async fn root() -> Html<&'static str> {
    Html(r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>Memory Share</title>
            <style>
                body {
                    max-width: 40rem;
                    margin: 4rem auto;
                    font-family: system-ui, sans-serif;
                    color: #1e293b;
                    background-color: #f8fafc;
                }
                code {
                    background-color: #e2e8f0;
                    padding: 0 4px;
                    border-radius: 4px;
                }
                a {
                    color: #2563eb;
                    font-weight: bold;
                }
            </style>
        </head>
        <body>
            <h1>Memory Share</h1>
            <p>A shared gallery of photos and videos.</p>
            <ul>
                <li><code>GET /api/files</code> lists every memory, newest first</li>
                <li><code>POST /api/upload</code> adds one</li>
                <li><code>PUT /api/files/{id}</code> renames or replaces one</li>
                <li><code>DELETE /api/files/{id}</code> removes one</li>
            </ul>
            <p><a href="/swagger-ui/">Explore the API docs</a></p>
        </body>
        </html>
    "#)
}
